// Puppet Agent Exporter - Error types
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the exporter process

use thiserror::Error;

/// Errors that stop the exporter or fail a single HTTP response.
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Metric registration or encoding failed
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// Encoded metrics were not valid UTF-8
    #[error("Invalid metrics encoding: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Binding or serving failed
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid command line arguments
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
