// ElwSleuth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers.

use crate::core::esi::ReferenceBody;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// Body identity
// =============================================================================

/// Composite identity of a celestial body: unique across all journals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BodyKey {
    pub system_address: u64,
    pub body_id: u32,
}

impl fmt::Display for BodyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.system_address, self.body_id)
    }
}

// =============================================================================
// Scan record (normalised output of parsing)
// =============================================================================

/// Planet classes the pipeline cares about. Every other class is dropped
/// during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanetClass {
    Earthlike,
    Rocky,
}

impl PlanetClass {
    /// Map a journal `PlanetClass` string. `None` for ignored classes.
    pub fn from_journal(raw: &str) -> Option<Self> {
        use crate::util::constants::{EARTHLIKE_CLASS, ROCKY_CLASS};
        match raw {
            EARTHLIKE_CLASS => Some(Self::Earthlike),
            ROCKY_CLASS => Some(Self::Rocky),
            _ => None,
        }
    }
}

/// Scan types that produce usable body data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanType {
    Detailed,
    AutoScan,
}

impl ScanType {
    /// Map a journal `ScanType` string. `None` for ignored types.
    pub fn from_journal(raw: &str) -> Option<Self> {
        match raw {
            "Detailed" => Some(Self::Detailed),
            "AutoScan" => Some(Self::AutoScan),
            _ => None,
        }
    }
}

/// A single retained body scan.
///
/// Created by the parser from exactly one journal line and never mutated
/// afterwards. Physical attributes missing from the source line are NaN.
#[derive(Debug, Clone)]
pub struct ScanRecord {
    pub key: BodyKey,
    pub body_name: String,
    pub planet_class: PlanetClass,
    pub scan_type: ScanType,
    pub timestamp: DateTime<Utc>,

    /// Earth masses.
    pub mass_em: f64,
    /// m/s².
    pub surface_gravity: f64,
    /// Metres.
    pub radius: f64,
    /// Kelvin.
    pub surface_temperature: f64,
    /// Seconds, signed (retrograde orbits are negative).
    pub orbital_period: f64,
    /// Seconds, signed.
    pub rotation_period: f64,
    pub eccentricity: f64,
    /// Pascals.
    pub surface_pressure: f64,
    /// Radians.
    pub axial_tilt: f64,

    /// Gas name to percentage. `None` when the body has no atmosphere data.
    pub atmosphere: Option<BTreeMap<String, f64>>,

    /// Body IDs named anywhere in the journal `Parents` chain.
    pub parents: Vec<u32>,

    /// Journal the record came from (diagnostics only).
    pub source_file: PathBuf,
    /// 1-based line number in `source_file`.
    pub line_number: u64,
}

impl ScanRecord {
    /// Ancestor body IDs. Resolution treats the chain as a set.
    pub fn ancestor_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.parents.iter().copied()
    }

    /// `file:line` of the journal line this record was parsed from.
    pub fn origin(&self) -> String {
        format!("{}:{}", self.source_file.display(), self.line_number)
    }

    /// Percentage of the named gas in the atmosphere, if recorded.
    pub fn gas_percent(&self, gas: &str) -> Option<f64> {
        self.atmosphere.as_ref()?.get(gas).copied()
    }
}

// =============================================================================
// Scoring vocabulary
// =============================================================================

/// A physical attribute that can be compared against a reference body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Mass,
    Gravity,
    Radius,
    Temperature,
    OrbitalPeriod,
    Eccentricity,
    RotationPeriod,
    Pressure,
    Oxygen,
    Tilt,
}

impl Attribute {
    /// All attributes in ranking-table order.
    pub fn all() -> &'static [Attribute] {
        &[
            Attribute::Mass,
            Attribute::Gravity,
            Attribute::Radius,
            Attribute::Temperature,
            Attribute::OrbitalPeriod,
            Attribute::Eccentricity,
            Attribute::RotationPeriod,
            Attribute::Pressure,
            Attribute::Oxygen,
            Attribute::Tilt,
        ]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Attribute::Mass => "Mass",
            Attribute::Gravity => "Gravity",
            Attribute::Radius => "Radius",
            Attribute::Temperature => "Temperature",
            Attribute::OrbitalPeriod => "Orbital period",
            Attribute::Eccentricity => "Eccentricity",
            Attribute::RotationPeriod => "Rotation period",
            Attribute::Pressure => "Pressure",
            Attribute::Oxygen => "Oxygen",
            Attribute::Tilt => "Tilt",
        }
    }

    /// Unit suffix appended to formatted values (may be empty).
    pub fn unit_suffix(&self) -> &'static str {
        match self {
            Attribute::Mass => " EM",
            Attribute::Gravity => " G",
            Attribute::Radius => " km",
            Attribute::Temperature => " K",
            Attribute::OrbitalPeriod | Attribute::RotationPeriod => " days",
            Attribute::Eccentricity => "",
            Attribute::Pressure => " atm",
            Attribute::Oxygen => "%",
            Attribute::Tilt => "°",
        }
    }

    /// Decimal places used when displaying a value of this attribute.
    pub fn precision(&self) -> usize {
        match self {
            Attribute::Radius => 0,
            Attribute::OrbitalPeriod | Attribute::Tilt => 3,
            Attribute::Eccentricity => 4,
            _ => 2,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A scan converted into the units the ESI formula compares.
///
/// Mass in Earth masses, gravity in g, radius in km, periods in days,
/// pressure in atmospheres, oxygen in percent, tilt in degrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBody {
    pub name: String,
    pub mass: f64,
    pub gravity: f64,
    pub radius: f64,
    pub temperature: f64,
    pub orbital_period: f64,
    pub rotation_period: f64,
    pub eccentricity: f64,
    pub pressure: f64,
    pub oxygen: f64,
    pub tilt: f64,
}

impl NormalizedBody {
    pub fn value(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Mass => self.mass,
            Attribute::Gravity => self.gravity,
            Attribute::Radius => self.radius,
            Attribute::Temperature => self.temperature,
            Attribute::OrbitalPeriod => self.orbital_period,
            Attribute::Eccentricity => self.eccentricity,
            Attribute::RotationPeriod => self.rotation_period,
            Attribute::Pressure => self.pressure,
            Attribute::Oxygen => self.oxygen,
            Attribute::Tilt => self.tilt,
        }
    }
}

/// Per-attribute ESI values against one reference body, plus the composite.
///
/// Values are nominally in [0, 1]. NaN marks a degenerate comparison and
/// serialises as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityScore {
    pub reference: ReferenceBody,
    pub per_attribute: BTreeMap<Attribute, f64>,
    pub overall: f64,
}

impl SimilarityScore {
    /// Score for one attribute; `None` if the reference does not use it.
    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        self.per_attribute.get(&attribute).copied()
    }
}

/// A normalised body together with its score against one reference.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredBody {
    pub key: BodyKey,
    pub timestamp: DateTime<Utc>,
    pub body: NormalizedBody,
    pub score: SimilarityScore,
}

impl ScoredBody {
    pub fn name(&self) -> &str {
        &self.body.name
    }
}

// =============================================================================
// Groups
// =============================================================================

/// An Earth-like body with at most one resolved moon.
#[derive(Debug, Clone)]
pub struct BodyGroup {
    pub earthlike: ScanRecord,
    pub moon: Option<ScanRecord>,
}

/// A `BodyGroup` after scoring: the planet against Earth, the moon against
/// the Moon.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredGroup {
    pub earthlike: ScoredBody,
    pub moon: Option<ScoredBody>,
}

// =============================================================================
// Ranking output
// =============================================================================

/// One best-in-class row: the body closest to the reference on one attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub reference: ReferenceBody,
    pub attribute: Attribute,
    pub body_name: String,
    pub value: f64,
    pub reference_value: f64,
    pub esi: f64,
}

/// The body with the highest composite score against a reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MostSimilar {
    pub name: String,
    pub similarity: f64,
}

/// Fixed-shape summary consumed by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSummary {
    pub best_earthlike: Option<MostSimilar>,
    pub best_moon: Option<MostSimilar>,
    /// Earth rows first (ten attributes), then Moon rows (four attributes).
    /// Rows are omitted when there are no candidates for that reference.
    pub rows: Vec<RankingRow>,
}

// =============================================================================
// Run summary and status
// =============================================================================

/// Statistics for a completed pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub files_processed: usize,
    pub lines_processed: u64,
    /// Retained Earth-like scans before deduplication.
    pub earthlike_scans: usize,
    /// Retained rocky scans before deduplication.
    pub rocky_scans: usize,
    pub unique_earthlikes: usize,
    pub unique_rockies: usize,
    /// Rocky bodies with an Earth-like parent (attached or not).
    pub resolved_moons: usize,
    /// Lines skipped under the skip-malformed policy.
    pub malformed_lines_skipped: usize,
    #[serde(skip)]
    pub duration: std::time::Duration,
}

/// Full output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub summary: RunSummary,
    pub ranking: RankingSummary,
    pub bodies: Vec<ScoredGroup>,
    /// Non-fatal warnings (skipped malformed lines, discovery truncation).
    pub warnings: Vec<String>,
}

/// User-visible status messages emitted while a run progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStatus {
    /// Sources are being read.
    Processing { files: usize },

    /// Retained scans are being deduplicated and resolved.
    Filtering { results: usize },

    /// Run finished.
    Found { earthlikes: usize, moons: usize },
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing { files } => write!(f, "Processing {files} files"),
            Self::Filtering { results } => write!(f, "Filtering {results} results"),
            Self::Found { earthlikes, moons } => write!(
                f,
                "Found {earthlikes} Earth-like worlds and {moons} rocky moons"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planet_class_mapping() {
        assert_eq!(
            PlanetClass::from_journal("Earthlike body"),
            Some(PlanetClass::Earthlike)
        );
        assert_eq!(
            PlanetClass::from_journal("Rocky body"),
            Some(PlanetClass::Rocky)
        );
        assert_eq!(PlanetClass::from_journal("Icy body"), None);
    }

    #[test]
    fn test_scan_type_mapping() {
        assert_eq!(ScanType::from_journal("Detailed"), Some(ScanType::Detailed));
        assert_eq!(ScanType::from_journal("AutoScan"), Some(ScanType::AutoScan));
        assert_eq!(ScanType::from_journal("NavBeaconDetail"), None);
        assert_eq!(ScanType::from_journal("Basic"), None);
    }

    #[test]
    fn test_origin_names_file_and_line() {
        let record = ScanRecord {
            key: BodyKey {
                system_address: 7,
                body_id: 3,
            },
            body_name: "Body 3".to_string(),
            planet_class: PlanetClass::Rocky,
            scan_type: ScanType::AutoScan,
            timestamp: Utc::now(),
            mass_em: 0.1,
            surface_gravity: 1.6,
            radius: 1_700_000.0,
            surface_temperature: 200.0,
            orbital_period: 0.0,
            rotation_period: 0.0,
            eccentricity: 0.0,
            surface_pressure: 0.0,
            axial_tilt: 0.0,
            atmosphere: None,
            parents: vec![2, 0],
            source_file: PathBuf::from("Journal.a.log"),
            line_number: 42,
        };
        assert_eq!(record.origin(), "Journal.a.log:42");
        assert_eq!(record.ancestor_ids().collect::<Vec<_>>(), vec![2, 0]);
        assert_eq!(record.gas_percent("Oxygen"), None);
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            PipelineStatus::Processing { files: 3 }.to_string(),
            "Processing 3 files"
        );
        assert_eq!(
            PipelineStatus::Found {
                earthlikes: 2,
                moons: 1
            }
            .to_string(),
            "Found 2 Earth-like worlds and 1 rocky moons"
        );
    }

    #[test]
    fn test_attribute_keys_serialise_camel_case() {
        let mut map = BTreeMap::new();
        map.insert(Attribute::OrbitalPeriod, 0.5);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"orbitalPeriod":0.5}"#);
    }
}
