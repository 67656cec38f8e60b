//! Textual reports over the instrumented address space and patch output.

use std::fs::OpenOptions;
use std::io::{self, ErrorKind, Write};
use std::path::Path;

use presid_patch::PatchProgram;
use presid_state::{AddressSpace, CellState};
use tracing::info;

use crate::{Error, Result};

/// Write `AAAA: VV count (label)` for every cell whose state intersects `mask`.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_memory_listing<W: Write>(
    space: &AddressSpace,
    mask: CellState,
    out: &mut W,
) -> io::Result<()> {
    for addr in space.changed(move |state| state.intersects(mask)) {
        writeln!(
            out,
            "{addr:04X}: {:02X} {} ({})",
            space.peek(addr),
            space.access_count(addr),
            space.state(addr).label()
        )?;
    }
    Ok(())
}

/// Write one `range: SSSS-EEEE` line per maximal run matching `mask`.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_ranges<W: Write>(
    space: &AddressSpace,
    mask: CellState,
    out: &mut W,
) -> io::Result<()> {
    for run in space.merge_to_ranges(mask) {
        writeln!(out, "range: {run}")?;
    }
    Ok(())
}

/// Write the assembly listing of a patch program, one instruction per line.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_patch_listing<W: Write>(program: &PatchProgram, out: &mut W) -> io::Result<()> {
    for instr in program.instructions() {
        writeln!(out, "{instr}")?;
    }
    Ok(())
}

/// Classic 16-bytes-per-row hex dump of the whole address space.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_hex_dump<W: Write>(space: &AddressSpace, out: &mut W) -> io::Result<()> {
    for (row, chunk) in space.values().chunks(16).enumerate() {
        write!(out, "{:04x} ", row * 16)?;
        for half in chunk.chunks(8) {
            write!(out, " ")?;
            for byte in half {
                write!(out, "{byte:02x} ")?;
            }
        }
        write!(out, " |")?;
        for (i, &byte) in chunk.iter().enumerate() {
            if i == 8 {
                write!(out, " ")?;
            }
            let c = if (32..=126).contains(&byte) {
                char::from(byte)
            } else {
                '.'
            };
            write!(out, "{c}")?;
        }
        writeln!(out, "|")?;
    }
    Ok(())
}

/// Write patch bytes to `path`.
///
/// Without `overwrite` an existing file is left alone and
/// [`Error::PatchExists`] is returned.
///
/// # Errors
///
/// Returns an error if the file exists (and `overwrite` is false) or cannot
/// be written.
pub fn save_patch(path: &Path, bytes: &[u8], overwrite: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => Error::PatchExists(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    file.write_all(bytes)?;

    info!(path = %path.display(), bytes = bytes.len(), "wrote patch");
    Ok(())
}
