// ElwSleuth - app/report.rs
//
// Plain-text rendering of an analysis report: best-match summary lines,
// ranking table, per-body detail table, run statistics.

use crate::core::esi::ReferenceBody;
use crate::core::export::DATE_FORMAT;
use crate::core::model::{AnalysisReport, Attribute, RankingRow, ScoredBody, ScoredGroup};
use std::io::{self, Write};

/// Shown in place of a value that could not be computed.
const MISSING: &str = "-";

/// Moon attributes shown in the detail table, with their display precision.
const MOON_DETAIL: [(Attribute, usize); 4] = [
    (Attribute::Mass, 4),
    (Attribute::Gravity, 3),
    (Attribute::Radius, 0),
    (Attribute::OrbitalPeriod, 3),
];

/// Render the whole report as text.
pub fn render_text<W: Write>(report: &AnalysisReport, out: &mut W) -> io::Result<()> {
    let ranking = &report.ranking;

    match &ranking.best_earthlike {
        Some(best) => writeln!(
            out,
            "Most similar ELW: {} (ESI {})",
            best.name,
            fixed(best.similarity, 3)
        )?,
        None => writeln!(out, "No eligible Earth-like worlds found")?,
    }
    if let Some(best) = &ranking.best_moon {
        writeln!(
            out,
            "Most similar moon: {} (ESI {})",
            best.name,
            fixed(best.similarity, 3)
        )?;
    }

    if !ranking.rows.is_empty() {
        writeln!(out)?;
        render_ranking(&ranking.rows, out)?;
    }

    if !report.bodies.is_empty() {
        writeln!(out)?;
        render_detail(&report.bodies, out)?;
    }

    let s = &report.summary;
    writeln!(out)?;
    writeln!(
        out,
        "{} files, {} lines, {} Earth-like and {} rocky scans ({} and {} unique), {} moons resolved in {:.2}s",
        s.files_processed,
        s.lines_processed,
        s.earthlike_scans,
        s.rocky_scans,
        s.unique_earthlikes,
        s.unique_rockies,
        s.resolved_moons,
        s.duration.as_secs_f64()
    )?;
    if s.malformed_lines_skipped > 0 {
        writeln!(out, "{} malformed lines skipped", s.malformed_lines_skipped)?;
    }
    for warning in &report.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    Ok(())
}

fn render_ranking<W: Write>(rows: &[RankingRow], out: &mut W) -> io::Result<()> {
    let mut table = Table::new(&["Criterium", "Body", "Value", "Reference value", "ESI"]);
    for row in rows {
        let precision = row_precision(row.reference, row.attribute);
        table.push(vec![
            criterium(row.reference, row.attribute),
            row.body_name.clone(),
            with_unit(row.value, precision, row.attribute),
            with_unit(row.reference_value, precision, row.attribute),
            fixed(row.esi, 3),
        ]);
    }
    table.write(out)
}

fn render_detail<W: Write>(groups: &[ScoredGroup], out: &mut W) -> io::Result<()> {
    let mut headers = vec!["Date", "Body name"];
    headers.extend(Attribute::all().iter().map(|&a| detail_label(a)));
    headers.extend([
        "Moon name",
        "Moon mass",
        "Moon gravity",
        "Moon radius",
        "Moon orbital period",
    ]);
    let mut table = Table::new(&headers);

    for group in groups {
        let planet = &group.earthlike;
        let mut cells = vec![
            planet.timestamp.format(DATE_FORMAT).to_string(),
            planet.name().to_string(),
        ];
        cells.extend(
            Attribute::all()
                .iter()
                .map(|&a| with_unit(planet.body.value(a), a.precision(), a)),
        );
        match &group.moon {
            Some(moon) => cells.extend(moon_cells(moon)),
            None => cells.extend(std::iter::repeat(MISSING.to_string()).take(5)),
        }
        table.push(cells);
    }
    table.write(out)
}

fn moon_cells(moon: &ScoredBody) -> Vec<String> {
    let mut cells = vec![moon.name().to_string()];
    cells.extend(
        MOON_DETAIL
            .iter()
            .map(|&(a, precision)| with_unit(moon.body.value(a), precision, a)),
    );
    cells
}

fn detail_label(attribute: Attribute) -> &'static str {
    match attribute {
        Attribute::Oxygen => "Oxygen in atmosphere",
        other => other.label(),
    }
}

fn criterium(reference: ReferenceBody, attribute: Attribute) -> String {
    match reference {
        ReferenceBody::Earth => attribute.label().to_string(),
        ReferenceBody::Moon => format!(
            "{} {}",
            reference.name(),
            attribute.label().to_lowercase()
        ),
    }
}

/// Ranking-table precision. Moon masses are tiny and need two extra places.
fn row_precision(reference: ReferenceBody, attribute: Attribute) -> usize {
    match (reference, attribute) {
        (ReferenceBody::Moon, Attribute::Mass) => 4,
        _ => attribute.precision(),
    }
}

fn fixed(value: f64, precision: usize) -> String {
    if value.is_nan() {
        MISSING.to_string()
    } else {
        format!("{value:.precision$}")
    }
}

fn with_unit(value: f64, precision: usize, attribute: Attribute) -> String {
    if value.is_nan() {
        MISSING.to_string()
    } else {
        format!("{value:.precision$}{}", attribute.unit_suffix())
    }
}

/// Left-aligned text table sized to its widest cells.
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }
        widths
    }

    fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let widths = self.widths();
        write_row(out, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        write_row(out, &rule, &widths)?;
        for row in &self.rows {
            write_row(out, row, &widths)?;
        }
        Ok(())
    }
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}
