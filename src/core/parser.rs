// ElwSleuth - core/parser.rs
//
// Journal parsing: one JSON object per line, Scan events retained per the
// rules in core::filter. Core layer: accepts text already read by the app
// layer, never touches the filesystem directly.
//
// Every line is validated as JSON. Only Scan events are deserialised into
// the full scan shape, so unusual field types in unrelated events never
// abort a run.

use crate::core::filter::ScanFilter;
use crate::core::model::{BodyKey, PlanetClass, ScanRecord};
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

/// What to do with a line that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Abort the whole run with `ParseError::MalformedRecord`.
    #[default]
    Abort,
    /// Skip the line, count it, and keep going.
    Skip,
}

/// Configuration for parsing operations.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    pub filter: ScanFilter,
    pub malformed: MalformedPolicy,
    /// Cap on described skipped lines per file (skip mode only).
    pub max_malformed_warnings: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            filter: ScanFilter::default(),
            malformed: MalformedPolicy::default(),
            max_malformed_warnings: constants::MAX_MALFORMED_WARNINGS,
        }
    }
}

/// Result of parsing a single journal.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Retained Earth-like scans, in line order.
    pub earthlike: Vec<ScanRecord>,
    /// Retained rocky scans, in line order.
    pub rocky: Vec<ScanRecord>,
    /// Total lines processed.
    pub lines_processed: u64,
    /// Number of malformed lines skipped (skip mode).
    pub malformed_skipped: usize,
    /// Descriptions of skipped lines, capped at `max_malformed_warnings`.
    pub malformed: Vec<ParseError>,
}

impl ParseResult {
    pub fn retained(&self) -> usize {
        self.earthlike.len() + self.rocky.len()
    }
}

// =============================================================================
// Wire shapes
// =============================================================================

/// Fields shared by every journal event.
#[derive(Deserialize)]
struct EventHeader<'a> {
    #[serde(borrow, default)]
    event: Option<Cow<'a, str>>,
}

/// Fields of a Scan event. Everything is optional here; requirements are
/// enforced after the retention rules so filtered-out events never fail.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawScan {
    #[serde(rename = "timestamp")]
    timestamp: Option<String>,
    scan_type: Option<String>,
    planet_class: Option<String>,
    was_discovered: Option<bool>,
    system_address: Option<u64>,
    #[serde(rename = "BodyID")]
    body_id: Option<u32>,
    body_name: Option<String>,
    parents: Option<Vec<BTreeMap<String, u32>>>,
    #[serde(rename = "MassEM")]
    mass_em: Option<f64>,
    surface_gravity: Option<f64>,
    radius: Option<f64>,
    surface_temperature: Option<f64>,
    orbital_period: Option<f64>,
    rotation_period: Option<f64>,
    eccentricity: Option<f64>,
    surface_pressure: Option<f64>,
    atmosphere_composition: Option<Vec<RawGas>>,
    axial_tilt: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawGas {
    name: String,
    percent: f64,
}

// =============================================================================
// Parsing
// =============================================================================

/// ISO-8601 local date-time without an offset, fractional seconds optional.
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse one journal's content.
///
/// CRLF line endings are treated as LF. Blank lines are ignored.
///
/// # Arguments
/// * `content` - File content as a string (the app layer handles reading)
/// * `file_path` - Path to the source file (for diagnostics)
/// * `config` - Retention filter and malformed-line policy
///
/// # Errors
/// Under `MalformedPolicy::Abort`, the first malformed line is returned as
/// `ParseError::MalformedRecord` naming the file and line.
pub fn parse_content(
    content: &str,
    file_path: &Path,
    config: &ParseConfig,
) -> Result<ParseResult, ParseError> {
    tracing::debug!(file = %file_path.display(), bytes = content.len(), "Parsing started");

    let mut result = ParseResult::default();

    // `str::lines` splits on LF and strips a trailing CR, which is the
    // CRLF -> LF normalisation.
    for (line_idx, line) in content.lines().enumerate() {
        result.lines_processed += 1;
        let line_number = (line_idx as u64) + 1;

        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line, file_path, line_number, &config.filter) {
            Ok(Some(record)) => match record.planet_class {
                PlanetClass::Earthlike => result.earthlike.push(record),
                PlanetClass::Rocky => result.rocky.push(record),
            },
            Ok(None) => {}
            Err(reason) => {
                let err = ParseError::MalformedRecord {
                    file: file_path.to_path_buf(),
                    line_number,
                    reason,
                };
                match config.malformed {
                    MalformedPolicy::Abort => {
                        tracing::debug!(error = %err, "Malformed record, aborting");
                        return Err(err);
                    }
                    MalformedPolicy::Skip => {
                        result.malformed_skipped += 1;
                        if result.malformed.len() < config.max_malformed_warnings {
                            tracing::warn!(error = %err, "Skipping malformed record");
                            result.malformed.push(err);
                        } else {
                            tracing::debug!(error = %err, "Skipping malformed record");
                        }
                    }
                }
            }
        }
    }

    tracing::debug!(
        file = %file_path.display(),
        lines = result.lines_processed,
        retained = result.retained(),
        earthlike = result.earthlike.len(),
        rocky = result.rocky.len(),
        skipped = result.malformed_skipped,
        "Parsing complete"
    );

    Ok(result)
}

/// Parse one non-blank line.
///
/// `Ok(None)` means the line is well-formed but not retained; `Err` carries
/// a human-readable reason.
fn parse_line(
    line: &str,
    file_path: &Path,
    line_number: u64,
    filter: &ScanFilter,
) -> Result<Option<ScanRecord>, String> {
    let header: EventHeader<'_> = serde_json::from_str(line).map_err(|e| e.to_string())?;

    if header.event.as_deref() != Some(constants::SCAN_EVENT) {
        return Ok(None);
    }

    let raw: RawScan = serde_json::from_str(line).map_err(|e| e.to_string())?;

    let (scan_type, planet_class) = match filter.classify(
        raw.scan_type.as_deref(),
        raw.planet_class.as_deref(),
        raw.was_discovered,
    ) {
        Ok(kinds) => kinds,
        Err(rejection) => {
            tracing::trace!(line = line_number, ?rejection, "Scan not retained");
            return Ok(None);
        }
    };

    let raw_ts = raw
        .timestamp
        .as_deref()
        .ok_or_else(|| "missing 'timestamp'".to_string())?;
    let timestamp = parse_timestamp(raw_ts)?;

    if let Err(rejection) = filter.check_time(timestamp) {
        tracing::trace!(line = line_number, ?rejection, "Scan not retained");
        return Ok(None);
    }

    let system_address = raw
        .system_address
        .ok_or_else(|| "missing 'SystemAddress'".to_string())?;
    let body_id = raw.body_id.ok_or_else(|| "missing 'BodyID'".to_string())?;

    let parents = raw
        .parents
        .unwrap_or_default()
        .into_iter()
        .flat_map(|link| link.into_values())
        .collect();

    let atmosphere = raw.atmosphere_composition.map(|gases| {
        gases
            .into_iter()
            .map(|g| (g.name, g.percent))
            .collect::<BTreeMap<_, _>>()
    });

    let missing = f64::NAN;
    Ok(Some(ScanRecord {
        key: BodyKey {
            system_address,
            body_id,
        },
        body_name: raw.body_name.unwrap_or_default(),
        planet_class,
        scan_type,
        timestamp,
        mass_em: raw.mass_em.unwrap_or(missing),
        surface_gravity: raw.surface_gravity.unwrap_or(missing),
        radius: raw.radius.unwrap_or(missing),
        surface_temperature: raw.surface_temperature.unwrap_or(missing),
        orbital_period: raw.orbital_period.unwrap_or(missing),
        rotation_period: raw.rotation_period.unwrap_or(missing),
        eccentricity: raw.eccentricity.unwrap_or(missing),
        surface_pressure: raw.surface_pressure.unwrap_or(missing),
        axial_tilt: raw.axial_tilt.unwrap_or(missing),
        atmosphere,
        parents,
        source_file: file_path.to_path_buf(),
        line_number,
    }))
}

/// Parse a journal timestamp (ISO-8601, normally `...Z`). A timestamp
/// without an offset is taken as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|e| {
            NaiveDateTime::parse_from_str(trimmed, NAIVE_TIMESTAMP_FORMAT)
                .map(|naive| Utc.from_utc_datetime(&naive))
                .map_err(|_| e)
        })
        .map_err(|e| {
            let preview: String = raw.chars().take(constants::DEBUG_MAX_LINE_PREVIEW).collect();
            format!("cannot parse timestamp '{preview}': {e}")
        })
}
