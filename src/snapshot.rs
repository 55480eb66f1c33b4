// Puppet Agent - State file readers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! One read of all agent state files.
//!
//! Each family (config, disabled lock, report) is read and parsed on its
//! own, so a failure in one never hides the others.

use crate::config::{load_config, AgentConfig};
use crate::error::Result;
use crate::interpret::InterpretedReport;
use crate::loader::DEFAULT_MAX_FILE_SIZE;
use crate::lock::{load_lock, DisabledLockState};
use crate::paths::PuppetPaths;
use crate::report::load_report;

/// Result of reading every state file once.
#[derive(Debug)]
pub struct StateSnapshot {
    pub config: Result<AgentConfig>,
    pub disabled_lock: Result<DisabledLockState>,
    pub report: Result<InterpretedReport>,
}

impl StateSnapshot {
    /// Read all state files with the default size limit.
    pub fn read(paths: &PuppetPaths) -> Self {
        Self::read_bounded(paths, DEFAULT_MAX_FILE_SIZE)
    }

    /// Read all state files, refusing any larger than `max_bytes`.
    pub fn read_bounded(paths: &PuppetPaths, max_bytes: u64) -> Self {
        Self {
            config: load_config(&paths.config, max_bytes),
            disabled_lock: load_lock(&paths.disabled_lock, max_bytes),
            report: load_report(&paths.report, max_bytes).map(|report| report.interpret()),
        }
    }

    /// True when every family was read and parsed.
    pub fn is_complete(&self) -> bool {
        self.config.is_ok() && self.disabled_lock.is_ok() && self.report.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PuppetPaths {
            config: dir.path().join("puppet.conf"),
            report: dir.path().join("last_run_report.yaml"),
            disabled_lock: dir.path().join("agent_disabled.lock"),
        };

        let snapshot = StateSnapshot::read(&paths);
        assert!(snapshot.config.as_ref().unwrap_err().is_not_found());
        assert!(snapshot.report.as_ref().unwrap_err().is_not_found());
        // A missing lock just means the agent is enabled.
        assert_eq!(snapshot.disabled_lock.unwrap(), DisabledLockState::default());
    }

    #[test]
    fn test_families_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PuppetPaths {
            config: dir.path().join("puppet.conf"),
            report: dir.path().join("last_run_report.yaml"),
            disabled_lock: dir.path().join("agent_disabled.lock"),
        };
        fs::write(&paths.config, "[main]\nserver = puppet\n").unwrap();
        fs::write(&paths.report, "metrics: [oops").unwrap();
        fs::write(&paths.disabled_lock, "{\"disabled_message\":\"maintenance\"}").unwrap();

        let snapshot = StateSnapshot::read(&paths);
        assert!(!snapshot.is_complete());
        assert_eq!(snapshot.config.unwrap().server, "puppet");
        assert_eq!(snapshot.disabled_lock.unwrap().disabled_message, "maintenance");
        assert!(snapshot.report.is_err());
    }

    #[test]
    fn test_size_limit_applies_to_every_family() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PuppetPaths {
            config: dir.path().join("puppet.conf"),
            report: dir.path().join("last_run_report.yaml"),
            disabled_lock: dir.path().join("agent_disabled.lock"),
        };
        fs::write(&paths.config, "[main]\nserver = puppet.example.com\n").unwrap();
        fs::write(&paths.report, "transaction_completed: true\n").unwrap();
        fs::write(&paths.disabled_lock, "{\"disabled_message\":\"maintenance\"}").unwrap();

        let snapshot = StateSnapshot::read_bounded(&paths, 8);
        assert!(snapshot.config.is_err());
        assert!(snapshot.report.is_err());
        assert!(snapshot.disabled_lock.is_err());
    }
}
