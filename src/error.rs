// Puppet Agent - State file readers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the Puppet agent state readers
//!
//! Every reader returns [`Result`]. Callers decide per data family how to
//! react: a missing lock file is a normal state, everything else is a
//! scrape error for that family only.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for state file operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for state file operations
#[derive(Error, Debug)]
pub enum Error {
    /// The file does not exist
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Any other failure while opening or reading the file
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exceeds the configured read limit
    #[error("File too large: {} is {size} bytes (max: {max})", path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    /// puppet.conf is not valid INI
    #[error("Malformed puppet config: {0}")]
    Config(#[from] ini::ParseError),

    /// The run report is not valid YAML for the report schema
    #[error("Malformed run report: {0}")]
    Report(#[from] serde_yaml::Error),

    /// The disabled lock holds content that is not valid JSON
    #[error("Malformed disabled lock: {0}")]
    Lock(#[from] serde_json::Error),
}

impl Error {
    /// True when the underlying file is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Build an I/O error, folding `ErrorKind::NotFound` into [`Error::NotFound`].
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound { path }
        } else {
            Error::Io { path, source }
        }
    }
}
