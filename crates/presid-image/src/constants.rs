//! PSID/RSID and PRG format constants.

pub const PSID_MAGIC: [u8; 4] = *b"PSID";
pub const RSID_MAGIC: [u8; 4] = *b"RSID";

// Big-endian header field offsets
pub const SID_VERSION: usize = 0x04;
pub const SID_DATA_OFFSET: usize = 0x06;
pub const SID_LOAD_ADDR: usize = 0x08;
pub const SID_INIT_ADDR: usize = 0x0A;
pub const SID_PLAY_ADDR: usize = 0x0C;
pub const SID_SONGS: usize = 0x0E;
pub const SID_START_SONG: usize = 0x10;

// 32-byte NUL-padded text fields
pub const SID_NAME: usize = 0x16;
pub const SID_AUTHOR: usize = 0x36;
pub const SID_RELEASED: usize = 0x56;
pub const SID_TEXT_LEN: usize = 32;

/// Header size of version 1 files.
pub const SID_HEADER_V1_LEN: usize = 0x76;

/// PRG files start with a little-endian load address.
pub const PRG_HEADER_LEN: usize = 2;
