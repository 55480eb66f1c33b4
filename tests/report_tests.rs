// Puppet Agent - Report Tests
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! End-to-end tests reading real-shaped agent state files from disk.

use approx::assert_relative_eq;
use puppet_agent::*;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn map(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

// ============================================================================
// Successful run
// ============================================================================

#[test]
fn test_load_successful_report() {
    let report = load_report(fixture("last_run_report.yaml"), DEFAULT_MAX_FILE_SIZE).unwrap();
    let interpreted = report.interpret();

    assert_relative_eq!(interpreted.run_at, 1618957125.5901103, epsilon = 1e-6);
    assert_eq!(interpreted.run_duration, 17.199882286);
    assert_eq!(interpreted.catalog_version, 1618957129.0);
    assert_eq!(interpreted.run_success, 1.0);

    assert_eq!(
        interpreted.run_resources,
        map(&[
            ("total", 574.0),
            ("skipped", 0.0),
            ("failed", 0.0),
            ("failed_to_restart", 0.0),
            ("restarted", 0.0),
            ("changed", 1.0),
            ("out_of_sync", 1.0),
            ("scheduled", 0.0),
            ("corrective_change", 1.0),
        ])
    );

    assert_eq!(
        interpreted.run_time_durations,
        map(&[
            ("plugin_sync", 19.038186447694898),
            ("fact_generation", 3.733549404889345),
            ("convert_catalog", 1.6039954144507647),
            ("config_retrieval", 7.887831624597311),
            ("transaction_evaluation", 23.296303944662213),
            ("catalog_application", 23.389429319649935),
        ])
    );

    assert_eq!(
        interpreted.run_events,
        map(&[("failure", 0.0), ("success", 1.0), ("total", 1.0)])
    );
    assert_eq!(interpreted.run_changes, map(&[("total", 1.0)]));
}

#[test]
fn test_raw_report_fields() {
    let report = load_report(fixture("last_run_report.yaml"), DEFAULT_MAX_FILE_SIZE).unwrap();

    assert_eq!(report.report_format, 12);
    assert_eq!(report.resource_count(), 2);
    assert_eq!(report.failed_resources(), 0);
    assert_eq!(report.logs.len(), 1);
    assert_eq!(report.category("time").unwrap().label, "Time");
}

// ============================================================================
// Failed run
// ============================================================================

#[test]
fn test_load_failed_report() {
    let interpreted = load_report(fixture("failed_run_report.yaml"), DEFAULT_MAX_FILE_SIZE)
        .unwrap()
        .interpret();

    assert_eq!(interpreted.run_success, 0.0);
    assert_eq!(interpreted.run_at, 1618984803.25);
    // `total` is not a number in this report
    assert_eq!(interpreted.run_duration, UNKNOWN_DURATION);
    assert_eq!(interpreted.run_time_durations, map(&[("exec", 0.5)]));
    assert_eq!(interpreted.run_resources, map(&[("total", 2.0), ("failed", 1.0)]));
    assert!(interpreted.run_events.is_empty());
    assert!(interpreted.run_changes.is_empty());
}

// ============================================================================
// Whole snapshot
// ============================================================================

#[test]
fn test_snapshot_with_all_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("puppet.conf");
    let lock = dir.path().join("agent_disabled.lock");
    fs::write(
        &config,
        "[main]\nserver = puppet.example.com\nenvironment = production\n\n[agent]\nruninterval = 30m\n",
    )
    .unwrap();
    fs::write(&lock, r#"{"disabled_message":"maintenance"}"#).unwrap();

    let paths = PuppetPaths::default()
        .with_config(&config)
        .with_report(fixture("last_run_report.yaml"))
        .with_disabled_lock(&lock);

    let snapshot = StateSnapshot::read(&paths);
    assert!(snapshot.is_complete());

    let agent = snapshot.config.unwrap();
    assert_eq!(agent.server, "puppet.example.com");
    assert_eq!(agent.environment, "production");

    let lock_state = snapshot.disabled_lock.unwrap();
    assert!(lock_state.disabled);
    assert_eq!(lock_state.disabled_message, "maintenance");

    assert_eq!(snapshot.report.unwrap().run_success, 1.0);
}

#[test]
fn test_snapshot_after_agent_enable() {
    let dir = tempfile::tempdir().unwrap();
    let paths = PuppetPaths::default()
        .with_config(dir.path().join("puppet.conf"))
        .with_report(fixture("failed_run_report.yaml"))
        .with_disabled_lock(dir.path().join("agent_disabled.lock"));
    fs::write(&paths.config, "[main]\n").unwrap();

    let snapshot = StateSnapshot::read(&paths);
    assert!(snapshot.is_complete());
    assert_eq!(snapshot.config.unwrap(), AgentConfig::default());
    assert!(!snapshot.disabled_lock.unwrap().disabled);
    assert_eq!(snapshot.report.unwrap().run_success, 0.0);
}
