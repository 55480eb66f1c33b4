// Puppet Agent - State file readers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Puppet Agent state
//!
//! Readers for the files a Puppet agent leaves on disk, and the logic that
//! turns them into plain numbers for monitoring.
//!
//! ## Quick Start
//!
//! ```rust
//! use puppet_agent::parse_report;
//!
//! let yaml = r#"
//! transaction_completed: true
//! resource_statuses:
//!   "Notify[hello]": { failed: false, evaluation_time: 0.01 }
//! metrics:
//!   time:
//!     values: [["total", "Total", "17.2"], ["fact_generation", "Fact generation", "3.1"]]
//! "#;
//!
//! let report = parse_report(yaml.as_bytes()).unwrap().interpret();
//! assert_eq!(report.run_success, 1.0);
//! assert_eq!(report.run_duration, 17.2);
//! assert_eq!(report.run_time_durations["fact_generation"], 3.1);
//! ```
//!
//! ## Modules
//!
//! - [`loader`]: Bounded file reads
//! - [`config`]: `puppet.conf` (server and environment)
//! - [`lock`]: Disabled lock (`puppet agent --disable`)
//! - [`report`]: Last run report decoding
//! - [`interpret`]: Success, duration and per-category numbers
//! - [`snapshot`]: Reading all families at once
//! - [`paths`]: Default file locations

pub mod config;
pub mod error;
pub mod interpret;
pub mod loader;
pub mod lock;
pub mod paths;
pub mod report;
pub mod snapshot;

pub use config::{load_config, parse_config, AgentConfig};
pub use error::{Error, Result};
pub use interpret::{as_unix_seconds, interpret, InterpretedReport, UNKNOWN_DURATION};
pub use loader::{load, load_bounded, DEFAULT_MAX_FILE_SIZE};
pub use lock::{load_lock, parse_lock, DisabledLockState};
pub use paths::PuppetPaths;
pub use report::{load_report, parse_report, LogEntry, MetricCategory, RawReport, ResourceStatus};
pub use snapshot::StateSnapshot;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
