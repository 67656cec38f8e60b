//! PSID/RSID music files.

use std::fmt::{self, Display};

use tracing::debug;

use crate::constants::{
    PSID_MAGIC, RSID_MAGIC, SID_AUTHOR, SID_DATA_OFFSET, SID_HEADER_V1_LEN, SID_INIT_ADDR,
    SID_LOAD_ADDR, SID_NAME, SID_PLAY_ADDR, SID_RELEASED, SID_SONGS, SID_START_SONG, SID_TEXT_LEN,
    SID_VERSION,
};
use crate::{ImageError, ImageKind, LoadedImage, Result, read_be16, read_le16};

/// File flavour from the magic bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidMagic {
    Psid,
    Rsid,
}

impl Display for SidMagic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Psid => f.write_str("PSID"),
            Self::Rsid => f.write_str("RSID"),
        }
    }
}

/// Parsed header fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidHeader {
    pub magic: SidMagic,
    pub version: u16,
    pub data_offset: u16,
    /// Load address as stored in the header; zero means "from the data".
    pub header_load_addr: u16,
    pub init_addr: u16,
    pub play_addr: u16,
    pub songs: u16,
    pub start_song: u16,
    pub name: String,
    pub author: String,
    pub released: String,
}

/// A SID file split into header and loadable image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidFile {
    pub header: SidHeader,
    pub image: LoadedImage,
}

/// Decode a NUL-padded Latin-1 text field.
fn text_field(data: &[u8], offset: usize) -> String {
    data[offset..offset + SID_TEXT_LEN]
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}

impl SidFile {
    /// Parse a PSID or RSID file.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is truncated, the magic is unknown,
    /// the data offset points past the file, or the data does not fit
    /// below `$FFFF`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SID_HEADER_V1_LEN {
            return Err(ImageError::TooSmall {
                len: data.len(),
                need: SID_HEADER_V1_LEN,
            });
        }

        let raw_magic = [data[0], data[1], data[2], data[3]];
        let magic = match raw_magic {
            PSID_MAGIC => SidMagic::Psid,
            RSID_MAGIC => SidMagic::Rsid,
            other => return Err(ImageError::InvalidMagic(other)),
        };

        let header = SidHeader {
            magic,
            version: read_be16(data, SID_VERSION),
            data_offset: read_be16(data, SID_DATA_OFFSET),
            header_load_addr: read_be16(data, SID_LOAD_ADDR),
            init_addr: read_be16(data, SID_INIT_ADDR),
            play_addr: read_be16(data, SID_PLAY_ADDR),
            songs: read_be16(data, SID_SONGS),
            start_song: read_be16(data, SID_START_SONG),
            name: text_field(data, SID_NAME),
            author: text_field(data, SID_AUTHOR),
            released: text_field(data, SID_RELEASED),
        };

        let offset = usize::from(header.data_offset);
        if offset > data.len() {
            return Err(ImageError::DataOffsetOutOfBounds {
                offset,
                len: data.len(),
            });
        }

        let (load_addr, payload) = if header.header_load_addr == 0 {
            // Load address is the first two data bytes, little-endian.
            if data.len() < offset + 2 {
                return Err(ImageError::TooSmall {
                    len: data.len(),
                    need: offset + 2,
                });
            }
            (read_le16(data, offset), &data[offset + 2..])
        } else {
            (header.header_load_addr, &data[offset..])
        };

        let image = LoadedImage::new(ImageKind::Sid, load_addr, payload.to_vec())?;

        debug!(
            magic = %header.magic,
            version = header.version,
            load = format_args!("{load_addr:#06x}"),
            init = format_args!("{:#06x}", header.init_addr),
            play = format_args!("{:#06x}", header.play_addr),
            name = %header.name,
            author = %header.author,
            released = %header.released,
            "parsed SID header"
        );

        Ok(Self { header, image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_be16(file: &mut [u8], offset: usize, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        file[offset] = hi;
        file[offset + 1] = lo;
    }

    fn build_sid(magic: &[u8; 4], load: u16, data: &[u8]) -> Vec<u8> {
        let mut file = vec![0u8; 0x7C];
        file[0..4].copy_from_slice(magic);
        put_be16(&mut file, SID_VERSION, 2);
        put_be16(&mut file, SID_DATA_OFFSET, 0x7C);
        put_be16(&mut file, SID_LOAD_ADDR, load);
        put_be16(&mut file, SID_INIT_ADDR, 0x1000);
        put_be16(&mut file, SID_PLAY_ADDR, 0x1003);
        put_be16(&mut file, SID_SONGS, 3);
        put_be16(&mut file, SID_START_SONG, 1);
        file[SID_NAME..SID_NAME + 4].copy_from_slice(b"Tune");
        file[SID_AUTHOR..SID_AUTHOR + 2].copy_from_slice(b"Me");
        file[SID_RELEASED..SID_RELEASED + 4].copy_from_slice(b"1987");
        file.extend_from_slice(data);
        file
    }

    #[test]
    fn test_parse_header_load_addr() {
        let file = build_sid(b"PSID", 0x1000, &[0x4C, 0x00, 0x10]);
        let sid = SidFile::parse(&file).unwrap();
        assert_eq!(sid.header.magic, SidMagic::Psid);
        assert_eq!(sid.header.version, 2);
        assert_eq!(sid.header.init_addr, 0x1000);
        assert_eq!(sid.header.play_addr, 0x1003);
        assert_eq!(sid.header.songs, 3);
        assert_eq!(sid.header.name, "Tune");
        assert_eq!(sid.header.author, "Me");
        assert_eq!(sid.header.released, "1987");
        assert_eq!(sid.image.load_addr, 0x1000);
        assert_eq!(sid.image.data, vec![0x4C, 0x00, 0x10]);
    }

    #[test]
    fn test_parse_embedded_load_addr() {
        let file = build_sid(b"RSID", 0, &[0x00, 0x20, 0x60]);
        let sid = SidFile::parse(&file).unwrap();
        assert_eq!(sid.header.magic, SidMagic::Rsid);
        assert_eq!(sid.image.load_addr, 0x2000);
        assert_eq!(sid.image.data, vec![0x60]);
    }

    #[test]
    fn test_invalid_magic() {
        let file = build_sid(b"MUS!", 0x1000, &[]);
        assert_eq!(
            SidFile::parse(&file).unwrap_err(),
            ImageError::InvalidMagic(*b"MUS!")
        );
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            SidFile::parse(b"PSID"),
            Err(ImageError::TooSmall { len: 4, .. })
        ));
    }

    #[test]
    fn test_data_offset_past_end() {
        let mut file = build_sid(b"PSID", 0x1000, &[]);
        put_be16(&mut file, SID_DATA_OFFSET, 0x200);
        assert!(matches!(
            SidFile::parse(&file),
            Err(ImageError::DataOffsetOutOfBounds { offset: 0x200, .. })
        ));
    }
}
