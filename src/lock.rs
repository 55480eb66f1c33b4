// Puppet Agent - State file readers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Agent disabled lock (`agent_disabled.lock`)
//!
//! `puppet agent --disable "reason"` writes a small JSON document and
//! `--enable` removes it. The presence of the file is the primary signal:
//! an existing lock means the agent is disabled unless the document
//! explicitly says otherwise. The content only refines the state with the
//! operator's message.

use crate::error::Result;
use crate::loader;
use serde::Deserialize;
use std::path::Path;

/// Disabled state derived from the lock file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisabledLockState {
    /// Whether the agent is administratively disabled
    pub disabled: bool,

    /// Message given when the agent was disabled
    pub disabled_message: String,
}

impl DisabledLockState {
    /// Gauge value for the disabled flag.
    pub fn disabled_value(&self) -> f64 {
        if self.disabled {
            1.0
        } else {
            0.0
        }
    }
}

/// On-disk lock document.
#[derive(Debug, Default, Deserialize)]
struct LockDocument {
    #[serde(default)]
    disabled: Option<bool>,
    #[serde(default)]
    disabled_message: Option<String>,
}

/// Interpret the content of an existing lock file.
///
/// Empty (or whitespace only) content still means disabled. Anything else
/// must be valid JSON.
pub fn parse_lock(bytes: &[u8]) -> Result<DisabledLockState> {
    let mut state = DisabledLockState {
        disabled: true,
        disabled_message: String::new(),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(state);
    }

    let document: Option<LockDocument> = serde_json::from_slice(bytes)?;
    if let Some(document) = document {
        if let Some(disabled) = document.disabled {
            state.disabled = disabled;
        }
        if let Some(message) = document.disabled_message {
            state.disabled_message = message;
        }
    }

    Ok(state)
}

/// Read the lock file at `path`.
///
/// A missing file is the normal enabled state and is not an error.
pub fn load_lock(path: impl AsRef<Path>, max_bytes: u64) -> Result<DisabledLockState> {
    match loader::load_bounded(path, max_bytes) {
        Ok(bytes) => parse_lock(&bytes),
        Err(e) if e.is_not_found() => Ok(DisabledLockState::default()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;

    #[test]
    fn test_message_is_read() {
        let state = parse_lock(br#"{"disabled_message":"maintenance"}"#).unwrap();
        assert!(state.disabled);
        assert_eq!(state.disabled_message, "maintenance");
        assert_eq!(state.disabled_value(), 1.0);
    }

    #[test]
    fn test_presence_without_message_is_disabled() {
        let state = parse_lock(b"{}").unwrap();
        assert!(state.disabled);
        assert!(state.disabled_message.is_empty());
    }

    #[test]
    fn test_empty_file_is_disabled() {
        let state = parse_lock(b"\n").unwrap();
        assert!(state.disabled);
        assert!(state.disabled_message.is_empty());
    }

    #[test]
    fn test_explicit_disabled_override() {
        let state = parse_lock(br#"{"disabled":false,"disabled_message":"stale"}"#).unwrap();
        assert!(!state.disabled);
        assert_eq!(state.disabled_message, "stale");
        assert_eq!(state.disabled_value(), 0.0);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = parse_lock(b"not json").unwrap_err();
        assert!(matches!(err, Error::Lock(_)));
    }

    #[test]
    fn test_missing_file_is_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let state = load_lock(dir.path().join("agent_disabled.lock"), 1024).unwrap();
        assert_eq!(state, DisabledLockState::default());
        assert!(!state.disabled);
    }

    #[test]
    fn test_load_lock_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent_disabled.lock");
        fs::write(&path, r#"{"disabled_message":"upgrade in progress"}"#).unwrap();

        let state = load_lock(&path, 1024).unwrap();
        assert!(state.disabled);
        assert_eq!(state.disabled_message, "upgrade in progress");
    }

    #[test]
    fn test_load_lock_unreadable_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a file.
        let err = load_lock(dir.path(), 1024).unwrap_err();
        assert!(!err.is_not_found());
    }
}
