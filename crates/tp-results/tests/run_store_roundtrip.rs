use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tp_results::{ChartSeries, ResultsError, RunManifest, RunStore, TimeseriesRecord};
use tp_sim::{SimSummary, SimulationLoop, SimulationParameters};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn simulated_run(params: SimulationParameters) -> (RunManifest, Vec<TimeseriesRecord>) {
    let record = SimulationLoop::new(params).expect("valid parameters").run();
    let summary = SimSummary::from_record(&params, &record);
    let manifest = RunManifest::new(params, summary, "0.1.0");
    (manifest, TimeseriesRecord::from_record(&record, params.sample_time))
}

#[test]
fn save_list_load_roundtrip() {
    let dir = unique_temp_dir("tp_results_roundtrip");
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let store = RunStore::in_dir(&dir).expect("failed to create run store");

    let params = SimulationParameters::default();
    let (manifest, records) = simulated_run(params);
    store
        .save_run(&manifest, &records)
        .expect("failed to save run");

    assert!(store.has_run(&manifest.run_id));

    let runs = store.list_runs().expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, manifest.run_id);

    let (loaded_manifest, loaded_records) =
        store.load_run(&manifest.run_id).expect("failed to load run");
    assert_eq!(loaded_manifest, manifest);
    assert_eq!(loaded_records.len(), 40);
    assert_eq!(loaded_records, records);
}

#[test]
fn chart_from_loaded_run_matches_fresh_chart() {
    let dir = unique_temp_dir("tp_results_chart");
    let store = RunStore::new(dir).expect("failed to create run store");

    let params = SimulationParameters {
        max_iterations: 12,
        ..Default::default()
    };
    let record = SimulationLoop::new(params).unwrap().run();
    let (manifest, rows) = simulated_run(params);
    store.save_run(&manifest, &rows).unwrap();

    let loaded = store.load_timeseries(&manifest.run_id).unwrap();
    let from_disk = ChartSeries::from_timeseries(&loaded, params.sample_time, params.initial_temp);
    let fresh = ChartSeries::from_record(&record, params.sample_time, params.initial_temp);
    assert_eq!(from_disk, fresh);
}

#[test]
fn same_parameters_share_run_id() {
    let params = SimulationParameters::default();
    let (a, _) = simulated_run(params);
    let (b, _) = simulated_run(params);
    assert_eq!(a.run_id, b.run_id);

    let (c, _) = simulated_run(SimulationParameters { kp: 0.6, ..params });
    assert_ne!(a.run_id, c.run_id);
}

#[test]
fn missing_run_is_reported() {
    let store = RunStore::new(unique_temp_dir("tp_results_missing")).unwrap();
    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
    assert!(matches!(
        store.load_timeseries("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
}

#[test]
fn delete_removes_run() {
    let store = RunStore::new(unique_temp_dir("tp_results_delete")).unwrap();
    let (manifest, rows) = simulated_run(SimulationParameters::default());
    store.save_run(&manifest, &rows).unwrap();

    store.delete_run(&manifest.run_id).unwrap();
    assert!(!store.has_run(&manifest.run_id));
    assert!(store.list_runs().unwrap().is_empty());
}

#[test]
fn list_skips_directories_without_manifest() {
    let store = RunStore::new(unique_temp_dir("tp_results_stray")).unwrap();
    fs::create_dir_all(store.root_dir().join("stray")).unwrap();
    let (manifest, rows) = simulated_run(SimulationParameters::default());
    store.save_run(&manifest, &rows).unwrap();

    let runs = store.list_runs().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, manifest.run_id);
}

#[test]
fn non_finite_run_is_refused_and_leaves_no_entry() {
    let store = RunStore::new(unique_temp_dir("tp_results_runaway")).unwrap();
    // Negative cooling makes the plant run away until it overflows.
    let params = SimulationParameters {
        cooling_rate: -1.0,
        max_iterations: 2000,
        ..Default::default()
    };
    let (manifest, rows) = simulated_run(params);
    assert!(rows.iter().any(|r| !r.is_finite()));

    assert!(matches!(
        store.save_run(&manifest, &rows),
        Err(ResultsError::NonFiniteRun { .. })
    ));
    assert!(!store.has_run(&manifest.run_id));
    assert!(store.list_runs().unwrap().is_empty());
}
