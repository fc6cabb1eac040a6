// ElwSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Physical reference values live in core::esi next to the formula that
// consumes them; everything tunable lives here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ElwSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ElwSleuth";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Contest window
// =============================================================================

/// Default start of the contest window (inclusive, RFC 3339).
pub const DEFAULT_CONTEST_START: &str = "2025-07-17T02:00:00Z";

/// Default end of the contest window (inclusive, RFC 3339).
pub const DEFAULT_CONTEST_END: &str = "2025-09-01T04:00:00Z";

// =============================================================================
// Journal vocabulary
// =============================================================================

/// `event` value of a body scan.
pub const SCAN_EVENT: &str = "Scan";

/// `PlanetClass` value of an Earth-like world.
pub const EARTHLIKE_CLASS: &str = "Earthlike body";

/// `PlanetClass` value of a rocky body (moon candidate).
pub const ROCKY_CLASS: &str = "Rocky body";

/// Atmosphere component whose percentage is scored as "oxygen".
pub const OXYGEN_GAS: &str = "Oxygen";

// =============================================================================
// Discovery limits
// =============================================================================

/// Default include glob patterns for journal discovery inside directories.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["Journal.*.log"];

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 16;

/// Maximum number of journal files loaded in a single run.
pub const DEFAULT_MAX_FILES: usize = 5_000;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 100_000;

// =============================================================================
// Parsing limits
// =============================================================================

/// File size threshold in bytes above which the file is memory-mapped
/// instead of read into a heap buffer.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 64 * 1024 * 1024; // 64 MB

/// Default number of worker threads for parallel reads and parsing.
/// 0 means auto-detect (use available CPU cores).
pub const DEFAULT_WORKER_THREADS: usize = 0;

/// Upper bound on configured worker threads.
pub const MAX_WORKER_THREADS: usize = 256;

/// Maximum number of skipped-line descriptions kept per file in skip mode.
/// Lines beyond the cap are still counted and logged at debug level only.
pub const MAX_MALFORMED_WARNINGS: usize = 100;

/// Maximum length of a raw line quoted in a malformed-record message.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
