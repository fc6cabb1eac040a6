// ElwSleuth - core/discovery.rs
//
// Expansion of input arguments into journal files.
//
// Explicit file arguments are taken as-is. Directory arguments are walked
// with `walkdir` and filtered by filename glob patterns. Only metadata is
// read here; file contents are owned by the app layer (app::pipeline).

use crate::util::error::DiscoveryError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of files to return.
    pub max_files: usize,

    /// Glob patterns (filename-only) a file inside a directory argument must
    /// match. An empty list means "include everything".
    pub include_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Discovery
// =============================================================================

/// Expand `inputs` into a list of journal files.
///
/// Files found inside one directory are sorted by path, which for journals
/// is chronological. Duplicate paths are dropped.
///
/// # Non-fatal errors
/// Unreadable entries below a directory argument and truncation to
/// `max_files` are reported in the returned warnings.
///
/// # Fatal errors
/// Returns `Err` if an input argument itself does not exist or cannot be
/// accessed.
pub fn expand_inputs(
    inputs: &[PathBuf],
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>), DiscoveryError> {
    use crate::util::constants;

    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);
    let include_pats = compile_patterns(&config.include_patterns);

    let mut files: Vec<PathBuf> = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut warnings: Vec<String> = Vec::new();

    for input in inputs {
        let metadata = std::fs::metadata(input).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => DiscoveryError::PermissionDenied {
                path: input.clone(),
                source: e,
            },
            _ => DiscoveryError::RootNotFound {
                path: input.clone(),
            },
        })?;

        if !metadata.is_dir() {
            if seen.insert(input.clone()) {
                files.push(input.clone());
            }
            continue;
        }

        let mut found = walk_directory(input, max_depth, &include_pats, &mut warnings);
        found.sort();
        tracing::debug!(dir = %input.display(), files = found.len(), "Directory expanded");
        for path in found {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    let total_found = files.len();
    if total_found > max_files {
        // Keep the newest journals: the tail of the sorted list.
        files.drain(..total_found - max_files);
        warnings.push(format!(
            "{total_found} journal files were found but the limit is {max_files}. \
             Only the last {max_files} have been loaded."
        ));
        tracing::info!(total_found, limit = max_files, "File list truncated");
    }

    Ok((files, warnings))
}

fn walk_directory(
    root: &Path,
    max_depth: usize,
    include_pats: &[glob::Pattern],
    warnings: &mut Vec<String>,
) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            warnings.push(format!(
                "Skipping '{}': non-UTF-8 filename",
                entry.path().display()
            ));
            continue;
        };

        if !is_included(file_name, include_pats) {
            tracing::trace!(file = file_name, "Not matched by include patterns");
            continue;
        }

        found.push(entry.into_path());
    }
    found
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile glob pattern strings. Patterns that fail to compile are logged
/// and skipped.
fn compile_patterns(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Returns true if `file_name` matches at least one include pattern.
/// An empty include list means "include all".
fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    include_pats.is_empty() || include_pats.iter().any(|p| p.matches(file_name))
}

// =============================================================================
// Tests
// =============================================================================
