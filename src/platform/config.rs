// ElwSleuth - platform/config.rs
//
// Platform-specific config directory resolution and config.toml loading
// with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::filter::ContestWindow;
use crate::core::parser::MalformedPolicy;
use crate::util::constants;
use crate::util::error::ConfigError;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ElwSleuth configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/elwsleuth/ or %APPDATA%\ElwSleuth\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[contest]` section.
    pub contest: ContestSection,
    /// `[parsing]` section.
    pub parsing: ParsingSection,
    /// `[discovery]` section.
    pub discovery: DiscoverySection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[contest]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ContestSection {
    /// Restrict scans to the contest window.
    pub enabled: Option<bool>,
    /// Window start, RFC 3339.
    pub start: Option<String>,
    /// Window end, RFC 3339.
    pub end: Option<String>,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// "abort" or "skip".
    pub malformed_lines: Option<String>,
    /// Number of worker threads (0 = auto).
    pub worker_threads: Option<usize>,
    /// Memory-map files at or above this size.
    pub large_file_threshold_bytes: Option<u64>,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    /// Filename globs for journals inside directory arguments.
    pub include_patterns: Option<Vec<String>>,
    /// Maximum directory recursion depth.
    pub max_depth: Option<usize>,
    /// Maximum journal files per run.
    pub max_files: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Contest --
    pub contest_enabled: bool,
    pub contest_window: ContestWindow,

    // -- Parsing --
    pub malformed: MalformedPolicy,
    pub worker_threads: usize,
    pub large_file_threshold: u64,

    // -- Discovery --
    pub include_patterns: Vec<String>,
    pub max_depth: usize,
    pub max_files: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            contest_enabled: false,
            contest_window: ContestWindow::default(),
            malformed: MalformedPolicy::default(),
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            log_level: None,
        }
    }
}

/// Load the platform config file, if any.
///
/// A missing file yields defaults with no warnings (first run). An
/// unreadable or unparseable file yields defaults plus a warning: the run
/// still proceeds but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match load_config_file(&config_path) {
        Ok(result) => result,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Load an explicitly named config file. Read and parse failures are errors.
pub fn load_config_file(path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Contest --
    if let Some(enabled) = raw.contest.enabled {
        config.contest_enabled = enabled;
    }
    let start = parse_bound("start", raw.contest.start.as_deref(), &mut warnings)
        .unwrap_or(config.contest_window.start);
    let end = parse_bound("end", raw.contest.end.as_deref(), &mut warnings)
        .unwrap_or(config.contest_window.end);
    if start <= end {
        config.contest_window = ContestWindow::new(start, end);
    } else {
        warnings.push(format!(
            "[contest] start ({start}) is after end ({end}). Using default window ({} - {}).",
            constants::DEFAULT_CONTEST_START,
            constants::DEFAULT_CONTEST_END,
        ));
    }

    // -- Parsing: malformed_lines --
    if let Some(ref policy) = raw.parsing.malformed_lines {
        match policy.to_lowercase().as_str() {
            "abort" => config.malformed = MalformedPolicy::Abort,
            "skip" => config.malformed = MalformedPolicy::Skip,
            other => warnings.push(format!(
                "[parsing] malformed_lines = \"{other}\" is not recognised. \
                 Expected \"abort\" or \"skip\". Using default (abort).",
            )),
        }
    }

    // -- Parsing: worker_threads --
    if let Some(threads) = raw.parsing.worker_threads {
        if threads <= constants::MAX_WORKER_THREADS {
            config.worker_threads = threads;
        } else {
            warnings.push(format!(
                "[parsing] worker_threads = {threads} is out of range (0-{}). Using default (auto).",
                constants::MAX_WORKER_THREADS,
            ));
        }
    }

    // -- Parsing: large_file_threshold_bytes --
    if let Some(bytes) = raw.parsing.large_file_threshold_bytes {
        config.large_file_threshold = bytes;
    }

    // -- Discovery --
    if let Some(patterns) = raw.discovery.include_patterns {
        config.include_patterns = patterns;
    }
    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }
    if let Some(files) = raw.discovery.max_files {
        if (constants::MIN_MAX_FILES..=constants::ABSOLUTE_MAX_FILES).contains(&files) {
            config.max_files = files;
        } else {
            warnings.push(format!(
                "[discovery] max_files = {files} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_FILES,
                constants::ABSOLUTE_MAX_FILES,
                constants::DEFAULT_MAX_FILES,
            ));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

fn parse_bound(
    field: &str,
    raw: Option<&str>,
    warnings: &mut Vec<String>,
) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            warnings.push(format!(
                "[contest] {field} = \"{raw}\" is not an RFC 3339 timestamp ({e}). Using default.",
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(toml_text: &str) -> (AppConfig, Vec<String>) {
        validate(toml::from_str(toml_text).unwrap())
    }

    #[test]
    fn test_empty_config_is_default() {
        let (config, warnings) = parse("");
        assert!(warnings.is_empty());
        assert!(!config.contest_enabled);
        assert_eq!(config.malformed, MalformedPolicy::Abort);
        assert_eq!(config.contest_window, ContestWindow::default());
    }

    #[test]
    fn test_valid_values_applied() {
        let (config, warnings) = parse(
            r#"
[contest]
enabled = true
start = "2025-01-01T00:00:00Z"
end = "2025-02-01T00:00:00+00:00"

[parsing]
malformed_lines = "Skip"
worker_threads = 4

[discovery]
include_patterns = ["*.log"]
max_depth = 3

[logging]
level = "debug"
"#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert!(config.contest_enabled);
        assert_eq!(config.contest_window.start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(config.malformed, MalformedPolicy::Skip);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.include_patterns, vec!["*.log".to_string()]);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_fall_back_with_warnings() {
        let (config, warnings) = parse(
            r#"
[contest]
start = "last tuesday"

[parsing]
malformed_lines = "ignore"

[discovery]
max_depth = 0

[logging]
level = "loud"
"#,
        );
        assert_eq!(warnings.len(), 4, "got {warnings:?}");
        assert_eq!(config.contest_window, ContestWindow::default());
        assert_eq!(config.malformed, MalformedPolicy::Abort);
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let (config, warnings) = parse(
            r#"
[contest]
start = "2025-09-01T00:00:00Z"
end = "2025-01-01T00:00:00Z"
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.contest_window, ContestWindow::default());
    }

    #[test]
    fn test_missing_platform_config_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let (_, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_broken_platform_config_warns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(constants::CONFIG_FILE_NAME), "[contest\n").unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(!config.contest_enabled);
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let result = load_config_file(Path::new("/nonexistent/elwsleuth/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
