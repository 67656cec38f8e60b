//! Address usage histogram built from memory listings.
//!
//! Input is the `AAAA: VV count (label)` listing produced by `analyze
//! --print-memory`, typically concatenated over many tunes. Each line counts
//! one use of its address; the rendered map has one row per 256-byte page.

use std::io::{self, BufRead, Write};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use presid_cpu::ADDRESS_SPACE_SIZE;

/// Glyphs for 0..=9 uses; anything above is `#`.
const GLYPHS: &[u8; 11] = b".123456789#";

static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn line_pattern() -> &'static Regex {
    LINE_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([0-9A-Fa-f]{1,4}):\s*([0-9A-Fa-f]{1,2})\s+(\d+)")
            .expect("usage line pattern is valid")
    })
}

/// Parse one listing line into `(address, value, access count)`.
#[must_use]
pub fn parse_line(line: &str) -> Option<(u16, u8, u32)> {
    let caps = line_pattern().captures(line)?;
    let addr = u16::from_str_radix(&caps[1], 16).ok()?;
    let value = u8::from_str_radix(&caps[2], 16).ok()?;
    let count = caps[3].parse().ok()?;
    Some((addr, value, count))
}

/// Per-address occurrence counts.
pub struct UsageHistogram {
    uses: Box<[u32]>,
    lines: u64,
    skipped: u64,
}

impl Default for UsageHistogram {
    fn default() -> Self {
        Self {
            uses: vec![0; ADDRESS_SPACE_SIZE].into_boxed_slice(),
            lines: 0,
            skipped: 0,
        }
    }
}

impl UsageHistogram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every well-formed line of `reader`; other lines are skipped.
    ///
    /// # Errors
    ///
    /// Propagates read errors from `reader`.
    pub fn parse<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut histogram = Self::new();
        for line in reader.lines() {
            histogram.add_line(&line?);
        }
        debug!(
            lines = histogram.lines,
            skipped = histogram.skipped,
            "parsed usage listing"
        );
        Ok(histogram)
    }

    pub fn add_line(&mut self, line: &str) {
        match parse_line(line) {
            Some((addr, _, _)) => {
                self.record(addr);
                self.lines += 1;
            }
            None => self.skipped += 1,
        }
    }

    pub fn record(&mut self, addr: u16) {
        let slot = &mut self.uses[usize::from(addr)];
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub fn uses(&self, addr: u16) -> u32 {
        self.uses[usize::from(addr)]
    }

    /// Lines that contributed a use.
    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Write 256 rows of `PPPP: ` followed by one glyph per address.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut row = Vec::with_capacity(256 + 7);
        for (page, chunk) in self.uses.chunks(256).enumerate() {
            row.clear();
            write!(row, "{:04X}: ", page * 256)?;
            row.extend(chunk.iter().map(|&n| glyph(n)));
            row.push(b'\n');
            out.write_all(&row)?;
        }
        Ok(())
    }
}

fn glyph(uses: u32) -> u8 {
    let last = GLYPHS.len() - 1;
    let idx = usize::try_from(uses).map_or(last, |n| n.min(last));
    GLYPHS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line("D418: 0F 250 (written)"),
            Some((0xD418, 0x0F, 250))
        );
        assert_eq!(parse_line("0000: 00 0 (init)"), Some((0, 0, 0)));
        assert_eq!(parse_line("range: 0400-0401"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("10000: 00 1 (read)"), None);
    }

    #[test]
    fn test_glyphs_saturate() {
        assert_eq!(glyph(0), b'.');
        assert_eq!(glyph(1), b'1');
        assert_eq!(glyph(9), b'9');
        assert_eq!(glyph(10), b'#');
        assert_eq!(glyph(u32::MAX), b'#');
    }

    #[test]
    fn test_parse_counts_lines() {
        let listing = "\
0400: 2B 2 (written)
0400: 2C 1 (written)
0401: 00 1 (read)
garbage
FFFF: 01 3 (init/read)
";
        let histogram = UsageHistogram::parse(listing.as_bytes()).unwrap();
        assert_eq!(histogram.uses(0x0400), 2);
        assert_eq!(histogram.uses(0x0401), 1);
        assert_eq!(histogram.uses(0xFFFF), 1);
        assert_eq!(histogram.uses(0x0000), 0);
        assert_eq!(histogram.lines(), 4);
        assert_eq!(histogram.skipped(), 1);
    }

    #[test]
    fn test_render_rows() {
        let mut histogram = UsageHistogram::new();
        for _ in 0..12 {
            histogram.record(0x0402);
        }
        histogram.record(0x0400);

        let mut out = Vec::new();
        histogram.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows.len(), 256);
        assert_eq!(rows[0], format!("0000: {}", ".".repeat(256)));
        assert_eq!(rows[4], format!("0400: 1.#{}", ".".repeat(253)));
        assert!(rows[255].starts_with("FF00: "));
        assert!(rows.iter().all(|row| row.len() == 6 + 256));
    }
}
