// Puppet Agent - State file readers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Default locations of the agent state files

use std::path::PathBuf;

#[cfg(windows)]
mod defaults {
    pub const CONFIG: &str = r"C:\ProgramData\PuppetLabs\puppet\etc\puppet.conf";
    pub const REPORT: &str =
        r"C:\ProgramData\PuppetLabs\puppet\cache\state\last_run_report.yaml";
    pub const DISABLED_LOCK: &str =
        r"C:\ProgramData\PuppetLabs\puppet\cache\state\agent_disabled.lock";
}

#[cfg(not(windows))]
mod defaults {
    pub const CONFIG: &str = "/etc/puppetlabs/puppet/puppet.conf";
    pub const REPORT: &str = "/opt/puppetlabs/puppet/cache/state/last_run_report.yaml";
    pub const DISABLED_LOCK: &str = "/opt/puppetlabs/puppet/cache/state/agent_disabled.lock";
}

pub use defaults::{
    CONFIG as DEFAULT_CONFIG_PATH, DISABLED_LOCK as DEFAULT_DISABLED_LOCK_PATH,
    REPORT as DEFAULT_REPORT_PATH,
};

/// Paths of the three state files read on every scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuppetPaths {
    /// Agent configuration (`puppet.conf`)
    pub config: PathBuf,

    /// Last run report (`last_run_report.yaml`)
    pub report: PathBuf,

    /// Disabled lock (`agent_disabled.lock`)
    pub disabled_lock: PathBuf,
}

impl Default for PuppetPaths {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            report: PathBuf::from(DEFAULT_REPORT_PATH),
            disabled_lock: PathBuf::from(DEFAULT_DISABLED_LOCK_PATH),
        }
    }
}

impl PuppetPaths {
    /// Override the config path.
    pub fn with_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = path.into();
        self
    }

    /// Override the report path.
    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report = path.into();
        self
    }

    /// Override the disabled lock path.
    pub fn with_disabled_lock(mut self, path: impl Into<PathBuf>) -> Self {
        self.disabled_lock = path.into();
        self
    }
}
