// Puppet Agent - State file readers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Agent configuration (`puppet.conf`)

use crate::error::Result;
use crate::loader;
use ini::{Ini, ParseOption};
use std::path::Path;

/// Section holding the agent settings we report.
pub const MAIN_SECTION: &str = "main";

/// Values extracted from the agent's `puppet.conf`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentConfig {
    /// `main.server`, empty when unset
    pub server: String,

    /// `main.environment`, empty when unset
    pub environment: String,
}

/// Parse `puppet.conf` content.
///
/// Missing keys (or a missing `[main]` section) yield empty strings.
pub fn parse_config(bytes: &[u8]) -> Result<AgentConfig> {
    let text = String::from_utf8_lossy(bytes);

    // Windows paths are common in puppet.conf; backslashes are literal.
    let opt = ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(&text, opt)?;

    let lookup = |key: &str| {
        ini.section(Some(MAIN_SECTION))
            .and_then(|section| section.get(key))
            .unwrap_or_default()
            .to_string()
    };

    Ok(AgentConfig {
        server: lookup("server"),
        environment: lookup("environment"),
    })
}

/// Load and parse `puppet.conf` from disk.
pub fn load_config(path: impl AsRef<Path>, max_bytes: u64) -> Result<AgentConfig> {
    let bytes = loader::load_bounded(path, max_bytes)?;
    parse_config(&bytes)
}
