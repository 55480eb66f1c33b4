// Puppet Agent - State file readers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Bounded file loading.
//!
//! All state files are small and local. Reads are still capped so a
//! runaway or hostile file cannot stall a scrape or exhaust memory.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default read limit for state files (16 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Read a whole file with the default size limit.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    load_bounded(path, DEFAULT_MAX_FILE_SIZE)
}

/// Read a whole file, refusing anything larger than `max_bytes`.
///
/// A missing file is reported as [`Error::NotFound`] so callers can tell it
/// apart from permission or disk failures.
pub fn load_bounded(path: impl AsRef<Path>, max_bytes: u64) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::from_io(path, e))?;

    let size = file.metadata().map_err(|e| Error::from_io(path, e))?.len();
    if size > max_bytes {
        return Err(Error::TooLarge {
            path: path.to_path_buf(),
            size,
            max: max_bytes,
        });
    }

    // The file may grow between stat and read; read one byte past the
    // limit to detect that.
    let mut buf = Vec::with_capacity(size as usize);
    file.take(max_bytes.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|e| Error::from_io(path, e))?;

    if buf.len() as u64 > max_bytes {
        return Err(Error::TooLarge {
            path: path.to_path_buf(),
            size: buf.len() as u64,
            max: max_bytes,
        });
    }

    Ok(buf)
}
