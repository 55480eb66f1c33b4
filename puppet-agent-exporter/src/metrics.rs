// Puppet Agent Exporter - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for Puppet agent monitoring.
//!
//! This module defines every metric exposed by the exporter. Definitions
//! are static; gauges are built fresh on each scrape from them so that
//! labels seen in an earlier report never linger.

use crate::error::ExporterError;
use lazy_static::lazy_static;
use prometheus::core::Desc;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;

/// Name, help text and label names of one exported metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

impl MetricDef {
    const fn new(name: &'static str, help: &'static str, labels: &'static [&'static str]) -> Self {
        Self { name, help, labels }
    }

    fn opts(&self) -> Opts {
        Opts::new(self.name, self.help)
    }

    /// Descriptor registered with the registry.
    pub fn desc(&self) -> prometheus::Result<Desc> {
        Desc::new(
            self.name.to_string(),
            self.help.to_string(),
            self.labels.iter().map(|l| l.to_string()).collect(),
            HashMap::new(),
        )
    }

    /// Fresh unlabelled gauge.
    pub fn gauge(&self) -> prometheus::Result<Gauge> {
        Gauge::with_opts(self.opts())
    }

    /// Fresh labelled gauge family.
    pub fn gauge_vec(&self) -> prometheus::Result<GaugeVec> {
        GaugeVec::new(self.opts(), self.labels)
    }
}

// ============================================================
// Config family
// ============================================================

pub const CONFIG: MetricDef = MetricDef::new(
    "puppet_config",
    "Puppet configuration.",
    &["server", "environment"],
);

pub const CONFIG_SCRAPE_ERROR: MetricDef = MetricDef::new(
    "puppet_config_scrape_error",
    "1 if there was an error opening or reading a file, 0 otherwise",
    &[],
);

// ============================================================
// Disabled lock family
// ============================================================

pub const DISABLED_LOCK: MetricDef = MetricDef::new(
    "puppet_disabled_lock_info",
    "Puppet state of agent disabled lock.",
    &["disabled_message"],
);

pub const DISABLED_SCRAPE_ERROR: MetricDef = MetricDef::new(
    "puppet_disabled_scrape_error",
    "1 if there was an error opening or reading a file, 0 otherwise",
    &[],
);

// ============================================================
// Last run report family
// ============================================================

pub const CATALOG_VERSION: MetricDef = MetricDef::new(
    "puppet_last_run_catalog_version",
    "The version of the last attempted Puppet catalog.",
    &[],
);

/// Older name of [`CATALOG_VERSION`], still emitted for existing dashboards.
pub const CATALOG_VERSION_INFO: MetricDef = MetricDef::new(
    "puppet_last_catalog_version_info",
    "The version of the last attempted Puppet catalog.",
    &[],
);

pub const RUN_AT: MetricDef = MetricDef::new(
    "puppet_last_run_at_seconds",
    "Time of the last Puppet run.",
    &[],
);

pub const RUN_DURATION: MetricDef = MetricDef::new(
    "puppet_last_run_duration_seconds",
    "Duration of the last Puppet run, -1 if not reported.",
    &[],
);

pub const RUN_SUCCESS: MetricDef = MetricDef::new(
    "puppet_last_run_success",
    "1 if the last Puppet run was successful.",
    &[],
);

pub const RUN_RESOURCES: MetricDef = MetricDef::new(
    "puppet_last_run_report_resources",
    "Resources state of the last Puppet run.",
    &["type"],
);

pub const RUN_EVENTS: MetricDef = MetricDef::new(
    "puppet_last_run_report_events",
    "Events of the last Puppet run.",
    &["type"],
);

pub const RUN_CHANGES: MetricDef = MetricDef::new(
    "puppet_last_run_report_changes",
    "Changes of the last Puppet run.",
    &["type"],
);

pub const RUN_TIME_DURATION: MetricDef = MetricDef::new(
    "puppet_last_run_report_time_duration_seconds",
    "Resources duration of the last Puppet run.",
    &["type"],
);

pub const REPORT_SCRAPE_ERROR: MetricDef = MetricDef::new(
    "puppet_last_run_scrape_error",
    "1 if there was an error opening or reading a file, 0 otherwise",
    &[],
);

// ============================================================
// Exporter metrics
// ============================================================

pub const BUILD_INFO: MetricDef = MetricDef::new(
    "puppet_agent_exporter_build_info",
    "A metric with a constant '1' value labeled by the exporter version.",
    &["version"],
);

/// Every metric produced by the Puppet collector.
pub const PUPPET_METRICS: &[MetricDef] = &[
    CONFIG,
    CONFIG_SCRAPE_ERROR,
    DISABLED_LOCK,
    DISABLED_SCRAPE_ERROR,
    CATALOG_VERSION,
    CATALOG_VERSION_INFO,
    RUN_AT,
    RUN_DURATION,
    RUN_SUCCESS,
    RUN_RESOURCES,
    RUN_EVENTS,
    RUN_CHANGES,
    RUN_TIME_DURATION,
    REPORT_SCRAPE_ERROR,
];

lazy_static! {
    /// Descriptors of [`PUPPET_METRICS`], built once.
    pub static ref PUPPET_DESCS: Vec<Desc> = PUPPET_METRICS
        .iter()
        .map(|def| def.desc().unwrap())
        .collect();
}

/// Gauge value for a boolean.
pub fn bool_value(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Register the constant build info gauge.
pub fn register_build_info(registry: &Registry) -> prometheus::Result<()> {
    let build_info = BUILD_INFO.gauge_vec()?;
    build_info
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);
    registry.register(Box::new(build_info))
}

/// Encode all metrics of `registry` to Prometheus text format.
pub fn encode_metrics(registry: &Registry) -> Result<String, ExporterError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
