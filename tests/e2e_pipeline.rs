// ElwSleuth - tests/e2e_pipeline.rs
//
// End-to-end tests for discovery, parsing, resolution, scoring and export.
//
// These tests exercise the real filesystem, real walkdir traversal, real
// serde_json decoding and real chrono timestamp parsing; no mocks, no stubs.
// They cover the full path from journal files on disk to a ranked report.

use elwsleuth::app::pipeline::{run_files, PipelineConfig};
use elwsleuth::app::report::render_text;
use elwsleuth::core::discovery::{expand_inputs, DiscoveryConfig};
use elwsleuth::core::export::{export_detail_csv, export_json};
use elwsleuth::core::filter::{ContestWindow, ScanFilter};
use elwsleuth::core::model::{AnalysisReport, Attribute, PipelineStatus};
use elwsleuth::core::parser::{MalformedPolicy, ParseConfig};
use elwsleuth::util::error::{DiscoveryError, ElwSleuthError, ParseError};
use std::path::{Path, PathBuf};

// =============================================================================
// Helpers
// =============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

fn journals() -> Vec<PathBuf> {
    let (files, warnings) = expand_inputs(&[fixtures_dir()], &DiscoveryConfig::default()).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    files
}

fn run(paths: &[PathBuf], config: &PipelineConfig) -> AnalysisReport {
    run_files(paths, config, |_| {}).unwrap()
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

// =============================================================================
// Discovery E2E
// =============================================================================

/// The fixtures directory holds two journals plus a file outside the pattern.
#[test]
fn e2e_discovers_journals_in_order() {
    let files = journals();
    let names: Vec<&str> = files.iter().map(|p| file_name(p)).collect();
    assert_eq!(
        names,
        vec![
            "Journal.2025-08-01T120000.01.log",
            "Journal.2025-08-02T090000.01.log"
        ]
    );
}

#[test]
fn e2e_explicit_file_bypasses_pattern() {
    let path = fixture("truncated_journal.log");
    let (files, _) = expand_inputs(&[path.clone()], &DiscoveryConfig::default()).unwrap();
    assert_eq!(files, vec![path]);
}

#[test]
fn e2e_nonexistent_input_returns_error() {
    let result = expand_inputs(
        &[PathBuf::from("/nonexistent/elwsleuth-e2e-test-path")],
        &DiscoveryConfig::default(),
    );
    assert!(
        matches!(result, Err(DiscoveryError::RootNotFound { .. })),
        "expected RootNotFound, got {result:?}"
    );
}

// =============================================================================
// Pipeline E2E
// =============================================================================

#[test]
fn e2e_full_run_counts() {
    let report = run(&journals(), &PipelineConfig::default());
    let s = &report.summary;

    assert_eq!(s.files_processed, 2);
    assert_eq!(s.lines_processed, 11);
    // Body 3 is scanned in both journals; discovered, NavBeacon and
    // high-metal scans are never retained.
    assert_eq!(s.earthlike_scans, 3);
    assert_eq!(s.unique_earthlikes, 2);
    assert_eq!(s.rocky_scans, 2);
    assert_eq!(s.unique_rockies, 2);
    assert_eq!(s.resolved_moons, 1);
    assert_eq!(s.malformed_lines_skipped, 0);
    assert!(report.warnings.is_empty());
}

#[test]
fn e2e_earth_twin_normalised_and_first_seen_wins() {
    let report = run(&journals(), &PipelineConfig::default());
    let twin = &report.bodies[0].earthlike;

    assert_eq!(twin.name(), "Praea Euq AA-A h0 3");
    // The later duplicate (MassEM 2.0) must have been discarded.
    assert!((twin.body.mass - 1.0).abs() < 1e-12);
    assert!((twin.body.gravity - 1.0).abs() < 1e-12);
    assert!((twin.body.radius - 6378.0).abs() < 1e-9);
    assert!((twin.body.oxygen - 21.0).abs() < 1e-12);
    assert!((twin.score.get(Attribute::Mass).unwrap() - 1.0).abs() < 1e-12);
    assert!((twin.score.get(Attribute::Gravity).unwrap() - 1.0).abs() < 1e-12);

    let best = report.ranking.best_earthlike.as_ref().unwrap();
    assert_eq!(best.name, "Praea Euq AA-A h0 3");
}

#[test]
fn e2e_moon_resolved_only_within_system() {
    let report = run(&journals(), &PipelineConfig::default());
    assert_eq!(report.bodies.len(), 2);

    let moon = report.bodies[0].moon.as_ref().expect("moon of body 3");
    assert_eq!(moon.name(), "Praea Euq AA-A h0 3 a");
    assert!((moon.body.orbital_period - 27.322).abs() < 1e-9);

    // Body 8 in system 200 orbits body 99, which is not an eligible ELW.
    assert_eq!(report.bodies[1].earthlike.name(), "Blua Eaec XY-Z d1 7");
    assert!(report.bodies[1].moon.is_none());
    assert_eq!(
        report.ranking.best_moon.as_ref().map(|m| m.name.as_str()),
        Some("Praea Euq AA-A h0 3 a")
    );
}

#[test]
fn e2e_signed_values_use_magnitude() {
    let report = run(&journals(), &PipelineConfig::default());
    let retro = &report.bodies[1].earthlike.body;
    assert!(retro.orbital_period > 0.0);
    assert!(retro.rotation_period > 0.0);
    assert!((retro.tilt - 0.35_f64.to_degrees()).abs() < 1e-9);
    assert!((retro.oxygen - 9.5).abs() < 1e-12);
}

#[test]
fn e2e_ranking_has_earth_and_moon_rows() {
    let report = run(&journals(), &PipelineConfig::default());
    assert_eq!(report.ranking.rows.len(), 14);
    assert_eq!(report.ranking.rows[0].attribute, Attribute::Mass);
    assert_eq!(report.ranking.rows[0].body_name, "Praea Euq AA-A h0 3");
}

#[test]
fn e2e_contest_window_excludes_early_scans() {
    let config = PipelineConfig {
        parse: ParseConfig {
            filter: ScanFilter::with_contest(ContestWindow::default()),
            ..Default::default()
        },
        ..Default::default()
    };
    let report = run(&journals(), &config);

    assert_eq!(report.summary.earthlike_scans, 2);
    assert_eq!(report.summary.unique_earthlikes, 1);
    assert_eq!(report.summary.rocky_scans, 1);
    assert_eq!(report.summary.resolved_moons, 1);
    assert_eq!(report.bodies[0].earthlike.name(), "Praea Euq AA-A h0 3");
}

#[test]
fn e2e_status_messages() {
    let mut messages = Vec::new();
    run_files(&journals(), &PipelineConfig::default(), |s: &PipelineStatus| {
        messages.push(s.to_string())
    })
    .unwrap();
    assert_eq!(
        messages,
        vec![
            "Processing 2 files",
            "Filtering 5 results",
            "Found 2 Earth-like worlds and 1 rocky moons",
        ]
    );
}

// =============================================================================
// Failure modes
// =============================================================================

#[test]
fn e2e_malformed_line_aborts_and_names_file() {
    let path = fixture("truncated_journal.log");
    let err = run_files(&[path.clone()], &PipelineConfig::default(), |_| {}).unwrap_err();
    match err {
        ElwSleuthError::Parse(ParseError::MalformedRecord {
            file, line_number, ..
        }) => {
            assert_eq!(file, path);
            assert_eq!(line_number, 2);
        }
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
}

#[test]
fn e2e_malformed_line_skipped_on_request() {
    let config = PipelineConfig {
        parse: ParseConfig {
            malformed: MalformedPolicy::Skip,
            ..Default::default()
        },
        ..Default::default()
    };
    let report = run(&[fixture("truncated_journal.log")], &config);
    assert_eq!(report.summary.malformed_lines_skipped, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.bodies.len(), 1);
    assert_eq!(report.bodies[0].earthlike.name(), "Sothis Mine 2");
}

#[test]
fn e2e_missing_file_aborts_with_file_read() {
    let mut paths = journals();
    let missing = fixture("Journal.2099-01-01T000000.01.log");
    paths.push(missing.clone());

    let err = run_files(&paths, &PipelineConfig::default(), |_| {}).unwrap_err();
    match err {
        ElwSleuthError::FileRead { path, .. } => assert_eq!(path, missing),
        other => panic!("expected FileRead, got {other:?}"),
    }
}

// =============================================================================
// Output E2E
// =============================================================================

#[test]
fn e2e_text_report() {
    let report = run(&journals(), &PipelineConfig::default());
    let mut buf = Vec::new();
    render_text(&report, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.starts_with("Most similar ELW: Praea Euq AA-A h0 3 (ESI "));
    assert!(text.contains("Most similar moon: Praea Euq AA-A h0 3 a (ESI "));
    assert!(text.contains("2025-08-01 12:05:00"));
    assert!(text.contains("1.00 G"));
    assert!(text.contains("6378 km"));
}

#[test]
fn e2e_csv_export() {
    let report = run(&journals(), &PipelineConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("elw.csv");

    let file = std::fs::File::create(&out).unwrap();
    let rows = export_detail_csv(&report.bodies, file, &out).unwrap();
    assert_eq!(rows, 2);

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][1], "Praea Euq AA-A h0 3");
    assert_eq!(&records[0][12], "Praea Euq AA-A h0 3 a");
    assert_eq!(&records[1][12], "");
}

#[test]
fn e2e_json_export() {
    let report = run(&journals(), &PipelineConfig::default());
    let mut buf = Vec::new();
    export_json(&report, &mut buf, Path::new("report.json")).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(value["summary"]["resolvedMoons"], 1);
    assert_eq!(value["bodies"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        value["ranking"]["bestEarthlike"]["name"],
        "Praea Euq AA-A h0 3"
    );
}
