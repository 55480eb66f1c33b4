// Puppet Agent - State file readers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Last run report (`last_run_report.yaml`)
//!
//! The agent serializes `Puppet::Transaction::Report` as YAML with Ruby
//! object tags. Only the fields needed for monitoring are decoded; unknown
//! fields and tags are ignored and missing fields fall back to defaults.

use crate::error::{Error, Result};
use crate::loader;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;

/// Metric category holding phase timings.
pub const TIME_CATEGORY: &str = "time";
/// Metric category holding resource counts.
pub const RESOURCES_CATEGORY: &str = "resources";
/// Metric category holding event counts.
pub const EVENTS_CATEGORY: &str = "events";
/// Metric category holding change counts.
pub const CHANGES_CATEGORY: &str = "changes";
/// Entry of the time category holding the whole run duration.
pub const TOTAL_LABEL: &str = "total";

/// Decoded run report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawReport {
    /// Catalog version applied by the run
    pub configuration_version: f64,

    /// Start of the run
    pub time: Option<DateTime<FixedOffset>>,

    /// Whether the transaction ran to completion
    pub transaction_completed: bool,

    /// Report format revision
    pub report_format: i64,

    /// Per-resource outcome keyed by resource reference (`File[/etc/motd]`)
    #[serde(deserialize_with = "null_entries_as_default")]
    pub resource_statuses: HashMap<String, ResourceStatus>,

    /// Metric categories keyed by name
    #[serde(deserialize_with = "null_entries_as_default")]
    pub metrics: HashMap<String, MetricCategory>,

    /// Log entries emitted during the run
    #[serde(deserialize_with = "null_as_default")]
    pub logs: Vec<LogEntry>,
}

/// Outcome of a single resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceStatus {
    pub failed: bool,
    pub evaluation_time: f64,
}

/// A `Puppet::Util::Metric` category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricCategory {
    pub name: String,
    pub label: String,

    /// `[name, label, value]` triples. Kept loosely typed: entries are only
    /// validated when read through [`MetricCategory::values`].
    #[serde(deserialize_with = "null_as_default")]
    pub values: Vec<Vec<Value>>,
}

/// A `Puppet::Util::Log` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    pub time: Option<DateTime<FixedOffset>>,
}

/// An explicit YAML null (`~`) reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like [`null_as_default`], for the map and for each of its values.
fn null_entries_as_default<'de, D, T>(
    deserializer: D,
) -> std::result::Result<HashMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let entries = Option::<HashMap<String, Option<T>>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|(name, entry)| (name, entry.unwrap_or_default()))
        .collect())
}

impl MetricCategory {
    /// Numeric entries of this category, keyed by name.
    ///
    /// Only triples of three scalars whose third element parses as a float
    /// are kept; anything else is skipped.
    pub fn values(&self) -> HashMap<String, f64> {
        let mut result = HashMap::with_capacity(self.values.len());

        for item in &self.values {
            let [name, _, value] = item.as_slice() else {
                log::debug!("skipping {} metric entry with {} fields", self.name, item.len());
                continue;
            };
            let (Some(name), Some(value)) = (scalar_string(name), scalar_string(value)) else {
                log::debug!("skipping non-scalar {} metric entry", self.name);
                continue;
            };
            match value.parse::<f64>() {
                Ok(v) => {
                    result.insert(name, v);
                }
                Err(_) => log::debug!("skipping {}.{}: not a number: {:?}", self.name, name, value),
            }
        }

        result
    }
}

/// String form of a YAML scalar. Mappings, sequences and nulls have none.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

impl RawReport {
    /// Look up a metric category by name.
    pub fn category(&self, name: &str) -> Option<&MetricCategory> {
        self.metrics.get(name)
    }

    /// Number of resources with a status entry.
    pub fn resource_count(&self) -> usize {
        self.resource_statuses.len()
    }

    /// Number of resources marked failed.
    pub fn failed_resources(&self) -> usize {
        self.resource_statuses.values().filter(|s| s.failed).count()
    }
}

/// Decode a run report.
///
/// An empty or whitespace-only document is an error.
pub fn parse_report(bytes: &[u8]) -> Result<RawReport> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::Report(serde::de::Error::custom("empty run report")));
    }
    let report = serde_yaml::from_slice(bytes)?;
    Ok(report)
}

/// Load and decode the run report from disk.
pub fn load_report(path: impl AsRef<Path>, max_bytes: u64) -> Result<RawReport> {
    let bytes = loader::load_bounded(path, max_bytes)?;
    parse_report(&bytes)
}
