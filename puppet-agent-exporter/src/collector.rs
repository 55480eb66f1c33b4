// Puppet Agent Exporter - Scrape-time collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus collector reading the Puppet agent state on every scrape.
//!
//! Nothing is cached between scrapes: each `collect()` re-reads the three
//! state files. A family that fails to load still emits its data gauges
//! with default values, paired with its `*_scrape_error` gauge set to 1.

use crate::metrics::{
    bool_value, MetricDef, CATALOG_VERSION, CATALOG_VERSION_INFO, CONFIG, CONFIG_SCRAPE_ERROR,
    DISABLED_LOCK, DISABLED_SCRAPE_ERROR, PUPPET_DESCS, REPORT_SCRAPE_ERROR, RUN_AT, RUN_CHANGES,
    RUN_DURATION, RUN_EVENTS, RUN_RESOURCES, RUN_SUCCESS, RUN_TIME_DURATION,
};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use puppet_agent::{
    AgentConfig, DisabledLockState, InterpretedReport, PuppetPaths, Result, StateSnapshot,
};
use std::collections::HashMap;
use tracing::{debug, error};

/// Collector for the config, disabled lock and last run report families.
#[derive(Debug, Clone)]
pub struct PuppetCollector {
    paths: PuppetPaths,
    max_file_size: u64,
}

impl PuppetCollector {
    /// Create a collector reading the given files.
    pub fn new(paths: PuppetPaths, max_file_size: u64) -> Self {
        Self {
            paths,
            max_file_size,
        }
    }

    pub fn paths(&self) -> &PuppetPaths {
        &self.paths
    }

    fn log_failures(&self, snapshot: &StateSnapshot) {
        if let Err(e) = &snapshot.config {
            error!(path = %self.paths.config.display(), error = %e, "Failed to read puppet config file");
        }
        if let Err(e) = &snapshot.disabled_lock {
            error!(path = %self.paths.disabled_lock.display(), error = %e, "Failed to read puppet agent disabled lock file");
        }
        if let Err(e) = &snapshot.report {
            error!(path = %self.paths.report.display(), error = %e, "Failed to read puppet run report file");
        }
    }
}

impl Collector for PuppetCollector {
    fn desc(&self) -> Vec<&Desc> {
        PUPPET_DESCS.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let snapshot = StateSnapshot::read_bounded(&self.paths, self.max_file_size);
        self.log_failures(&snapshot);

        match snapshot_families(&snapshot) {
            Ok(families) => {
                debug!(families = families.len(), "Collected puppet metrics");
                families
            }
            Err(e) => {
                error!(error = %e, "Failed to build puppet metrics");
                Vec::new()
            }
        }
    }
}

/// Convert one snapshot into metric families.
pub fn snapshot_families(snapshot: &StateSnapshot) -> prometheus::Result<Vec<MetricFamily>> {
    let mut families = config_families(&snapshot.config)?;
    families.extend(disabled_lock_families(&snapshot.disabled_lock)?);
    families.extend(report_families(&snapshot.report)?);
    Ok(families)
}

fn scrape_error<T>(def: &MetricDef, result: &Result<T>) -> prometheus::Result<Vec<MetricFamily>> {
    let gauge = def.gauge()?;
    gauge.set(bool_value(result.is_err()));
    Ok(gauge.collect())
}

fn value_gauge(def: &MetricDef, value: f64) -> prometheus::Result<Vec<MetricFamily>> {
    let gauge = def.gauge()?;
    gauge.set(value);
    Ok(gauge.collect())
}

fn labelled_gauges(
    def: &MetricDef,
    values: &HashMap<String, f64>,
) -> prometheus::Result<Vec<MetricFamily>> {
    let gauges = def.gauge_vec()?;
    for (label, value) in values {
        gauges.with_label_values(&[label.as_str()]).set(*value);
    }
    Ok(gauges.collect())
}

fn config_families(config: &Result<AgentConfig>) -> prometheus::Result<Vec<MetricFamily>> {
    let (agent, value) = match config {
        Ok(agent) => (agent.clone(), 1.0),
        Err(_) => (AgentConfig::default(), 0.0),
    };

    let info = CONFIG.gauge_vec()?;
    info.with_label_values(&[agent.server.as_str(), agent.environment.as_str()])
        .set(value);

    let mut families = info.collect();
    families.extend(scrape_error(&CONFIG_SCRAPE_ERROR, config)?);
    Ok(families)
}

fn disabled_lock_families(
    lock: &Result<DisabledLockState>,
) -> prometheus::Result<Vec<MetricFamily>> {
    let state = match lock {
        Ok(state) => state.clone(),
        Err(_) => DisabledLockState::default(),
    };

    let info = DISABLED_LOCK.gauge_vec()?;
    info.with_label_values(&[state.disabled_message.as_str()])
        .set(state.disabled_value());

    let mut families = info.collect();
    families.extend(scrape_error(&DISABLED_SCRAPE_ERROR, lock)?);
    Ok(families)
}

fn report_families(report: &Result<InterpretedReport>) -> prometheus::Result<Vec<MetricFamily>> {
    let default_report = InterpretedReport::default();
    let interpreted = report.as_ref().unwrap_or(&default_report);

    let mut families = Vec::new();
    families.extend(value_gauge(&CATALOG_VERSION, interpreted.catalog_version)?);
    families.extend(value_gauge(&CATALOG_VERSION_INFO, interpreted.catalog_version)?);
    families.extend(value_gauge(&RUN_AT, interpreted.run_at)?);
    families.extend(value_gauge(&RUN_DURATION, interpreted.run_duration)?);
    families.extend(value_gauge(&RUN_SUCCESS, interpreted.run_success)?);
    families.extend(labelled_gauges(&RUN_RESOURCES, &interpreted.run_resources)?);
    families.extend(labelled_gauges(&RUN_EVENTS, &interpreted.run_events)?);
    families.extend(labelled_gauges(&RUN_CHANGES, &interpreted.run_changes)?);
    families.extend(labelled_gauges(
        &RUN_TIME_DURATION,
        &interpreted.run_time_durations,
    )?);
    families.extend(scrape_error(&REPORT_SCRAPE_ERROR, report)?);
    Ok(families)
}
