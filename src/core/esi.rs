// ElwSleuth - core/esi.rs
//
// Earth Similarity Index scoring.
//
// Single-factor ESI:   ESI(v, r) = 1 - |v - r| / |v + r|
// Composite vs Earth:  (product of 10 factors) ^ 0.1
// Composite vs others: (product of mass, gravity, radius, orbital period) ^ 0.25
//
// One canonical formula: absolute difference, unrounded f64. A zero sum is
// undefined and yields NaN.

use crate::core::model::{
    Attribute, BodyGroup, NormalizedBody, ScanRecord, ScoredBody, ScoredGroup, SimilarityScore,
};
use crate::util::constants::OXYGEN_GAS;
use crate::util::error::DegenerateComparison;
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// Unit conversion
// =============================================================================

/// Surface gravity of Earth in m/s² (journal gravity / this = g).
pub const STANDARD_GRAVITY: f64 = 9.8;

pub const METRES_PER_KM: f64 = 1_000.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub const PASCALS_PER_ATM: f64 = 101_325.0;

/// Exponent of the ten-factor Earth composite.
pub const EARTH_COMPOSITE_EXPONENT: f64 = 0.1;

/// Exponent of the four-factor composite used for every other reference.
pub const MOON_COMPOSITE_EXPONENT: f64 = 0.25;

// =============================================================================
// Reference bodies
// =============================================================================

/// A body scans are compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReferenceBody {
    Earth,
    Moon,
}

impl ReferenceBody {
    pub fn name(&self) -> &'static str {
        match self {
            ReferenceBody::Earth => "Earth",
            ReferenceBody::Moon => "Moon",
        }
    }

    /// Attributes scored against this reference, in ranking-table order.
    pub fn attributes(&self) -> &'static [Attribute] {
        match self {
            ReferenceBody::Earth => Attribute::all(),
            ReferenceBody::Moon => &[
                Attribute::Mass,
                Attribute::Gravity,
                Attribute::Radius,
                Attribute::OrbitalPeriod,
            ],
        }
    }

    /// Reference value in normalised units; `None` if not scored.
    pub fn value(&self, attribute: Attribute) -> Option<f64> {
        match self {
            ReferenceBody::Earth => Some(match attribute {
                Attribute::Mass => 1.0,
                Attribute::Gravity => 1.0,
                Attribute::Radius => 6_378.0,
                Attribute::Temperature => 287.91,
                Attribute::OrbitalPeriod => 365.256,
                Attribute::RotationPeriod => 1.0,
                Attribute::Eccentricity => 0.0167,
                Attribute::Pressure => 1.0,
                Attribute::Oxygen => 20.9,
                Attribute::Tilt => 23.439,
            }),
            ReferenceBody::Moon => match attribute {
                Attribute::Mass => Some(0.0123),
                Attribute::Gravity => Some(0.165),
                Attribute::Radius => Some(1_738.0),
                Attribute::OrbitalPeriod => Some(27.322),
                _ => None,
            },
        }
    }

    fn composite_exponent(&self) -> f64 {
        match self {
            ReferenceBody::Earth => EARTH_COMPOSITE_EXPONENT,
            ReferenceBody::Moon => MOON_COMPOSITE_EXPONENT,
        }
    }
}

// =============================================================================
// Formula
// =============================================================================

/// ESI of `value` against `reference`, or an error when they sum to zero.
pub fn esi_checked(value: f64, reference: f64) -> Result<f64, DegenerateComparison> {
    let sum = value + reference;
    if sum == 0.0 {
        return Err(DegenerateComparison { value, reference });
    }
    Ok(1.0 - (value - reference).abs() / sum.abs())
}

/// ESI of `value` against `reference`; NaN for a degenerate comparison.
pub fn esi(value: f64, reference: f64) -> f64 {
    esi_checked(value, reference).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Degenerate ESI comparison");
        f64::NAN
    })
}

/// Weighted geometric mean of per-attribute scores.
fn composite(factors: impl Iterator<Item = f64>, exponent: f64) -> f64 {
    factors.product::<f64>().powf(exponent)
}

// =============================================================================
// Normalisation and scoring
// =============================================================================

/// Convert a raw scan into ESI units.
pub fn normalize(record: &ScanRecord) -> NormalizedBody {
    NormalizedBody {
        name: record.body_name.clone(),
        mass: record.mass_em,
        gravity: record.surface_gravity / STANDARD_GRAVITY,
        radius: record.radius / METRES_PER_KM,
        temperature: record.surface_temperature,
        orbital_period: record.orbital_period.abs() / SECONDS_PER_DAY,
        rotation_period: record.rotation_period.abs() / SECONDS_PER_DAY,
        eccentricity: record.eccentricity,
        pressure: record.surface_pressure / PASCALS_PER_ATM,
        oxygen: record.gas_percent(OXYGEN_GAS).unwrap_or(0.0),
        tilt: record.axial_tilt.abs().to_degrees(),
    }
}

/// Score a normalised body against a reference.
pub fn score(body: &NormalizedBody, reference: ReferenceBody) -> SimilarityScore {
    let per_attribute: BTreeMap<Attribute, f64> = reference
        .attributes()
        .iter()
        .filter_map(|&attr| {
            reference
                .value(attr)
                .map(|r| (attr, esi(body.value(attr), r)))
        })
        .collect();

    let overall = composite(
        per_attribute.values().copied(),
        reference.composite_exponent(),
    );

    SimilarityScore {
        reference,
        per_attribute,
        overall,
    }
}

/// Normalise and score one record.
pub fn score_record(record: &ScanRecord, reference: ReferenceBody) -> ScoredBody {
    let body = normalize(record);
    let score = score(&body, reference);
    ScoredBody {
        key: record.key,
        timestamp: record.timestamp,
        body,
        score,
    }
}

/// Score every group: planets against Earth, moons against the Moon.
pub fn score_groups(groups: &[BodyGroup]) -> Vec<ScoredGroup> {
    groups
        .iter()
        .map(|g| ScoredGroup {
            earthlike: score_record(&g.earthlike, ReferenceBody::Earth),
            moon: g
                .moon
                .as_ref()
                .map(|m| score_record(m, ReferenceBody::Moon)),
        })
        .collect()
}
