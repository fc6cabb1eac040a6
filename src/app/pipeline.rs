// ElwSleuth - app/pipeline.rs
//
// One analysis run: read → parse → dedup → resolve → score → rank.
//
// Architecture:
//   - File reads fan out on rayon, one task per journal, and join before
//     any parsing starts. The first failed read aborts the run; partial
//     results are discarded.
//   - Each buffer is parsed independently (also on rayon); per-file results
//     are concatenated in input order. Downstream stages key on body
//     identity, never on arrival order.
//   - Every stage returns new values. Nothing is shared or mutated across
//     tasks, so no locking is needed.
//   - Status messages go to a caller-supplied callback, called in stage
//     order from the thread driving the run.

use crate::core::model::{AnalysisReport, PipelineStatus, RunSummary, ScanRecord};
use crate::core::parser::{self, ParseConfig, ParseResult};
use crate::core::{dedup, esi, ranking, relation};
use crate::platform;
use crate::util::constants;
use crate::util::error::{ElwSleuthError, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub parse: ParseConfig,
    /// Memory-map journals at or above this size.
    pub large_file_threshold: u64,
    /// Worker threads for reads and parsing (0 = rayon default).
    pub worker_threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parse: ParseConfig::default(),
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
            worker_threads: constants::DEFAULT_WORKER_THREADS,
        }
    }
}

/// A journal's content, already read.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub path: PathBuf,
    pub content: String,
}

impl SourceText {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Read and analyse the given journal files.
pub fn run_files<F>(
    paths: &[PathBuf],
    config: &PipelineConfig,
    on_status: F,
) -> Result<AnalysisReport>
where
    F: FnMut(&PipelineStatus) + Send,
{
    with_pool(config.worker_threads, || {
        run_files_inner(paths, config, on_status)
    })
}

fn run_files_inner<F>(
    paths: &[PathBuf],
    config: &PipelineConfig,
    mut on_status: F,
) -> Result<AnalysisReport>
where
    F: FnMut(&PipelineStatus) + Send,
{
    on_status(&PipelineStatus::Processing { files: paths.len() });

    let sources = read_all(paths, config.large_file_threshold)?;
    analyse(&sources, config, on_status)
}

/// Analyse journals that are already in memory.
pub fn run_sources<F>(
    sources: &[SourceText],
    config: &PipelineConfig,
    mut on_status: F,
) -> Result<AnalysisReport>
where
    F: FnMut(&PipelineStatus) + Send,
{
    on_status(&PipelineStatus::Processing {
        files: sources.len(),
    });
    with_pool(config.worker_threads, || analyse(sources, config, on_status))
}

/// Read every journal concurrently. Fails on the first unreadable file.
fn read_all(paths: &[PathBuf], large_threshold: u64) -> Result<Vec<SourceText>> {
    paths
        .par_iter()
        .map(|path| read_one(path, large_threshold))
        .collect()
}

fn read_one(path: &Path, large_threshold: u64) -> Result<SourceText> {
    match platform::fs::read_journal(path, large_threshold) {
        Ok(content) => {
            tracing::debug!(file = %path.display(), bytes = content.len(), "Journal read");
            Ok(SourceText {
                path: path.to_path_buf(),
                content,
            })
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Journal read failed");
            Err(ElwSleuthError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}

/// Everything after the join point.
fn analyse<F>(
    sources: &[SourceText],
    config: &PipelineConfig,
    mut on_status: F,
) -> Result<AnalysisReport>
where
    F: FnMut(&PipelineStatus) + Send,
{
    let started = Instant::now();

    let parsed: Vec<ParseResult> = sources
        .par_iter()
        .map(|s| parser::parse_content(&s.content, &s.path, &config.parse))
        .collect::<std::result::Result<_, _>>()?;

    let mut summary = RunSummary {
        files_processed: sources.len(),
        ..Default::default()
    };
    let mut warnings = Vec::new();
    let mut earthlike: Vec<ScanRecord> = Vec::new();
    let mut rocky: Vec<ScanRecord> = Vec::new();

    for result in parsed {
        summary.lines_processed += result.lines_processed;
        summary.malformed_lines_skipped += result.malformed_skipped;
        warnings.extend(result.malformed.iter().map(|e| e.to_string()));
        earthlike.extend(result.earthlike);
        rocky.extend(result.rocky);
    }
    if summary.malformed_lines_skipped > warnings.len() {
        warnings.push(format!(
            "{} further malformed lines skipped",
            summary.malformed_lines_skipped - warnings.len()
        ));
    }

    summary.earthlike_scans = earthlike.len();
    summary.rocky_scans = rocky.len();
    on_status(&PipelineStatus::Filtering {
        results: earthlike.len() + rocky.len(),
    });

    let earthlike = dedup::dedup_first_seen(earthlike);
    let rocky = dedup::dedup_first_seen(rocky);
    summary.unique_earthlikes = earthlike.len();
    summary.unique_rockies = rocky.len();

    let resolution = relation::resolve(earthlike, rocky);
    summary.resolved_moons = resolution.resolved_moons.len();

    let bodies = esi::score_groups(&resolution.groups);
    let ranking = ranking::aggregate(&bodies);

    on_status(&PipelineStatus::Found {
        earthlikes: summary.unique_earthlikes,
        moons: summary.resolved_moons,
    });

    summary.duration = started.elapsed();
    tracing::info!(
        files = summary.files_processed,
        lines = summary.lines_processed,
        earthlikes = summary.unique_earthlikes,
        moons = summary.resolved_moons,
        skipped = summary.malformed_lines_skipped,
        elapsed_ms = summary.duration.as_millis() as u64,
        "Analysis complete"
    );

    Ok(AnalysisReport {
        summary,
        ranking,
        bodies,
        warnings,
    })
}

/// Run `f` on a dedicated pool of `threads` workers, or on the global pool
/// when `threads` is 0 or the pool cannot be built.
fn with_pool<T, F>(threads: usize, f: F) -> T
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    if threads == 0 {
        return f();
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(f),
        Err(e) => {
            tracing::warn!(threads, error = %e, "Cannot build worker pool, using global pool");
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::MalformedPolicy;
    use crate::util::error::ParseError;

    fn scan(system: u64, body: u32, class: &str, parents: &str, mass: f64) -> String {
        format!(
            r#"{{"timestamp":"2025-08-01T00:00:00Z","event":"Scan","ScanType":"Detailed","BodyName":"Sys{system} {body}","BodyID":{body},"Parents":{parents},"SystemAddress":{system},"PlanetClass":"{class}","MassEM":{mass},"SurfaceGravity":9.8,"Radius":6378000.0,"SurfaceTemperature":287.91,"OrbitalPeriod":31558118.4,"RotationPeriod":86400.0,"Eccentricity":0.0167,"SurfacePressure":101325.0,"AxialTilt":0.409,"WasDiscovered":false}}"#
        )
    }

    #[test]
    fn test_status_sequence() {
        let sources = vec![SourceText::new(
            "a.log",
            scan(1, 10, "Earthlike body", r#"[{"Star":0}]"#, 1.0),
        )];
        let mut statuses = Vec::new();
        run_sources(&sources, &PipelineConfig::default(), |s| statuses.push(s.clone())).unwrap();
        assert_eq!(
            statuses,
            vec![
                PipelineStatus::Processing { files: 1 },
                PipelineStatus::Filtering { results: 1 },
                PipelineStatus::Found {
                    earthlikes: 1,
                    moons: 0
                },
            ]
        );
    }

    #[test]
    fn test_dedup_across_sources() {
        let line = scan(1, 10, "Earthlike body", r#"[{"Star":0}]"#, 1.0);
        let sources = vec![
            SourceText::new("a.log", line.clone()),
            SourceText::new("b.log", line),
        ];
        let report = run_sources(&sources, &PipelineConfig::default(), |_| {}).unwrap();
        assert_eq!(report.summary.earthlike_scans, 2);
        assert_eq!(report.summary.unique_earthlikes, 1);
        assert_eq!(report.bodies.len(), 1);
    }

    #[test]
    fn test_moon_in_other_file_resolves() {
        let sources = vec![
            SourceText::new("a.log", scan(1, 10, "Earthlike body", r#"[{"Star":0}]"#, 1.0)),
            SourceText::new(
                "b.log",
                scan(1, 11, "Rocky body", r#"[{"Planet":10},{"Star":0}]"#, 0.0123),
            ),
        ];
        let report = run_sources(&sources, &PipelineConfig::default(), |_| {}).unwrap();
        assert_eq!(report.summary.resolved_moons, 1);
        let moon = report.bodies[0].moon.as_ref().expect("moon");
        assert_eq!(moon.body.name, "Sys1 11");
        assert!(report.ranking.best_moon.is_some());
    }

    #[test]
    fn test_malformed_aborts_whole_run() {
        let sources = vec![
            SourceText::new("good.log", scan(1, 10, "Earthlike body", "[]", 1.0)),
            SourceText::new("bad.log", "{oops"),
        ];
        let err = run_sources(&sources, &PipelineConfig::default(), |_| {}).unwrap_err();
        match err {
            ElwSleuthError::Parse(ParseError::MalformedRecord { file, .. }) => {
                assert_eq!(file, PathBuf::from("bad.log"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_mode_reports_warnings() {
        let config = PipelineConfig {
            parse: ParseConfig {
                malformed: MalformedPolicy::Skip,
                ..Default::default()
            },
            ..Default::default()
        };
        let sources = vec![SourceText::new(
            "mixed.log",
            format!("{{oops\n{}\n", scan(1, 10, "Earthlike body", "[]", 1.0)),
        )];
        let report = run_sources(&sources, &config, |_| {}).unwrap();
        assert_eq!(report.summary.malformed_lines_skipped, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("mixed.log"));
        assert_eq!(report.bodies.len(), 1);
    }

    #[test]
    fn test_dedicated_pool() {
        let config = PipelineConfig {
            worker_threads: 2,
            ..Default::default()
        };
        let sources = vec![SourceText::new("a.log", "")];
        let report = run_sources(&sources, &config, |_| {}).unwrap();
        assert!(report.bodies.is_empty());
        assert!(report.ranking.best_earthlike.is_none());
    }

    #[test]
    fn test_unreadable_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("Journal.good.log");
        std::fs::write(&good, scan(1, 10, "Earthlike body", "[]", 1.0)).unwrap();
        let missing = dir.path().join("Journal.missing.log");

        let err = run_files(&[good, missing.clone()], &PipelineConfig::default(), |_| {})
            .unwrap_err();
        match err {
            ElwSleuthError::FileRead { path, .. } => assert_eq!(path, missing),
            other => panic!("expected FileRead, got {other:?}"),
        }
    }
}
