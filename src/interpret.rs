// Puppet Agent - State file readers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Run report interpretation
//!
//! Turns a loosely typed [`RawReport`] into the fixed numeric view that is
//! exported as gauges. The conversion is pure and never fails: entries that
//! cannot be read as numbers are dropped one by one, and missing categories
//! produce empty maps.

use crate::report::{
    RawReport, CHANGES_CATEGORY, EVENTS_CATEGORY, RESOURCES_CATEGORY, TIME_CATEGORY, TOTAL_LABEL,
};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// Run duration reported when the time category has no total.
pub const UNKNOWN_DURATION: f64 = -1.0;

/// Numeric view of the last run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpretedReport {
    /// Start of the run as fractional unix seconds
    pub run_at: f64,

    /// Total run duration in seconds, [`UNKNOWN_DURATION`] when not reported
    pub run_duration: f64,

    /// Catalog version applied by the run
    pub catalog_version: f64,

    /// 1.0 when the run succeeded, 0.0 otherwise
    pub run_success: f64,

    /// Resource counts by state (`total`, `changed`, `failed`, ...)
    pub run_resources: HashMap<String, f64>,

    /// Event counts by outcome (`total`, `success`, `failure`, ...)
    pub run_events: HashMap<String, f64>,

    /// Change counts (`total`)
    pub run_changes: HashMap<String, f64>,

    /// Phase durations in seconds, without the total
    pub run_time_durations: HashMap<String, f64>,
}

impl RawReport {
    /// Derive the numeric view of this report.
    pub fn interpret(&self) -> InterpretedReport {
        InterpretedReport {
            run_at: self.time.as_ref().map(as_unix_seconds).unwrap_or_default(),
            run_duration: self.total_duration(),
            catalog_version: self.configuration_version,
            run_success: if self.success() { 1.0 } else { 0.0 },
            run_resources: self.category_values(RESOURCES_CATEGORY),
            run_events: self.category_values(EVENTS_CATEGORY),
            run_changes: self.category_values(CHANGES_CATEGORY),
            run_time_durations: self.time_durations(),
        }
    }

    /// A run succeeded when the transaction completed, at least one
    /// resource was evaluated, and none of them failed.
    pub fn success(&self) -> bool {
        self.transaction_completed && self.resource_count() > 0 && self.failed_resources() == 0
    }

    /// Total run duration from `time.total`.
    pub fn total_duration(&self) -> f64 {
        self.category(TIME_CATEGORY)
            .and_then(|category| category.values().get(TOTAL_LABEL).copied())
            .unwrap_or(UNKNOWN_DURATION)
    }

    fn category_values(&self, name: &str) -> HashMap<String, f64> {
        self.category(name)
            .map(|category| category.values())
            .unwrap_or_default()
    }

    fn time_durations(&self) -> HashMap<String, f64> {
        let mut durations = self.category_values(TIME_CATEGORY);
        // Exported separately as the run duration.
        durations.remove(TOTAL_LABEL);
        durations
    }
}

/// Interpret a decoded report. See [`RawReport::interpret`].
pub fn interpret(report: &RawReport) -> InterpretedReport {
    report.interpret()
}

/// Unix seconds including the sub-second part.
pub fn as_unix_seconds(time: &DateTime<FixedOffset>) -> f64 {
    time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) / 1e9
}
