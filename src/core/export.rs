// ElwSleuth - core/export.rs
//
// CSV and JSON export of analysis results.
// Core layer: writes to any Write trait object.

use crate::core::model::{AnalysisReport, Attribute, ScoredGroup};
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Timestamp layout used in exported and rendered tables.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV header, one column per detail-table field.
const DETAIL_HEADER: [&str; 17] = [
    "date",
    "body_name",
    "mass_em",
    "gravity_g",
    "radius_km",
    "temperature_k",
    "orbital_period_days",
    "eccentricity",
    "rotation_period_days",
    "pressure_atm",
    "oxygen_percent",
    "tilt_deg",
    "moon_name",
    "moon_mass_em",
    "moon_gravity_g",
    "moon_radius_km",
    "moon_orbital_period_days",
];

/// Export the per-body detail list to CSV, one row per Earth-like body.
///
/// Values are written at full precision; the moon columns are empty when the
/// body has no resolved moon. NaN is written as an empty cell.
pub fn export_detail_csv<W: Write>(
    groups: &[ScoredGroup],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(DETAIL_HEADER).map_err(csv_err)?;

    let mut count = 0;
    for group in groups {
        let planet = &group.earthlike;
        let mut record: Vec<String> = Vec::with_capacity(DETAIL_HEADER.len());
        record.push(planet.timestamp.format(DATE_FORMAT).to_string());
        record.push(planet.body.name.clone());
        for attr in [
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
        ] {
            record.push(number_cell(planet.body.value(attr)));
        }

        match &group.moon {
            Some(moon) => {
                record.push(moon.body.name.clone());
                for attr in [
                    Attribute::Mass,
                    Attribute::Gravity,
                    Attribute::Radius,
                    Attribute::OrbitalPeriod,
                ] {
                    record.push(number_cell(moon.body.value(attr)));
                }
            }
            None => record.extend(std::iter::repeat(String::new()).take(5)),
        }

        csv_writer.write_record(&record).map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export the full report to pretty-printed JSON. NaN serialises as `null`.
pub fn export_json<W: Write>(
    report: &AnalysisReport,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, report).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(report.bodies.len())
}

fn number_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}
