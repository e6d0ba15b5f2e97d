//! Whole-file helpers that move file contents in and out of [`HeapBlock`]s.
//!
//! A file read lands in a byte block that any byte-compatible vector can
//! [`attach`](crate::FastVecData::attach) without copying:
//!
//! ```no_run
//! # use fast_vector::{fs, FastVec};
//! let mut bytes: FastVec<u8, 64> = FastVec::new();
//! bytes.attach(fs::read_file("input.bin")?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{fs, io, path::Path, string::String};

use crate::HeapBlock;

const BOM: char = '\u{FEFF}';

/// Reads the whole file at `path` into a byte block.
pub fn read_file(path: impl AsRef<Path>) -> io::Result<HeapBlock> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    log::trace!("read {} bytes from {}", bytes.len(), path.display());
    Ok(HeapBlock::from(bytes))
}

/// Reads a UTF-8 (or ASCII) text file. A leading byte order mark is skipped.
///
/// # Errors
/// [`io::ErrorKind::InvalidData`] if the contents are not valid UTF-8.
pub fn read_text_file(path: impl AsRef<Path>) -> io::Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let mut text = String::from_utf8(bytes).map_err(|err| {
        log::debug!("{} is not valid UTF-8: {err}", path.display());
        io::Error::new(io::ErrorKind::InvalidData, err)
    })?;
    if text.starts_with(BOM) {
        text.replace_range(..BOM.len_utf8(), "");
    }
    Ok(text)
}

/// Writes `bytes` to `path`, replacing any existing file.
pub fn write_file(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    fs::write(path, bytes)?;
    log::trace!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Writes `text` to `path` as UTF-8, without a byte order mark.
#[inline]
pub fn write_text_file(path: impl AsRef<Path>, text: &str) -> io::Result<()> {
    write_file(path, text.as_bytes())
}
