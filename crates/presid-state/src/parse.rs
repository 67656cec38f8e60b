//! Region specification parsing (`"0x1000-0x10FF,$D418,53280"`).

use std::str::FromStr;

use crate::{Region, RegionError, Result};

/// Parse an address literal.
///
/// Accepts `0x`/`$` hex, `0b` binary, `0o` or leading-zero octal, otherwise
/// decimal.
///
/// # Errors
///
/// Returns an error if the literal is malformed or exceeds `0xFFFF`.
pub fn parse_address(token: &str) -> Result<u16> {
    let trimmed = token.trim();
    let lower = trimmed.to_ascii_lowercase();

    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix('$') {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };

    if digits.is_empty() {
        return Err(RegionError::InvalidAddress(trimmed.to_string()));
    }

    let value = u64::from_str_radix(digits, radix)
        .map_err(|_| RegionError::InvalidAddress(trimmed.to_string()))?;

    u16::try_from(value).map_err(|_| RegionError::OutOfRange {
        token: trimmed.to_string(),
        value,
    })
}

impl FromStr for Region {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        if token.is_empty() {
            return Err(RegionError::Empty);
        }
        match token.split_once('-') {
            Some((start, end)) => Ok(Self::new(parse_address(start)?, parse_address(end)?)),
            None => Ok(Self::single(parse_address(token)?)),
        }
    }
}

/// Parse a comma-separated list of addresses and `start-end` pairs.
///
/// Empty tokens (e.g. a trailing comma) are skipped.
///
/// # Errors
///
/// Returns an error if the list holds no regions or any token is malformed.
pub fn parse_regions(spec: &str) -> Result<Vec<Region>> {
    let regions = spec
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Region>>>()?;

    if regions.is_empty() {
        return Err(RegionError::Empty);
    }
    Ok(regions)
}
