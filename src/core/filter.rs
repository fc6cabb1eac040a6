// ElwSleuth - core/filter.rs
//
// Retention rules for journal Scan events. All rules are AND-combined.
// Core layer: pure logic, no I/O.

use crate::core::model::{PlanetClass, ScanType};
use chrono::{DateTime, Utc};

/// Inclusive time range restricting which scans count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContestWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ContestWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Both boundaries are inclusive.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

impl Default for ContestWindow {
    fn default() -> Self {
        use crate::util::constants::{DEFAULT_CONTEST_END, DEFAULT_CONTEST_START};
        // The defaults are compile-time literals covered by a unit test.
        let parse = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or_default()
        };
        Self {
            start: parse(DEFAULT_CONTEST_START),
            end: parse(DEFAULT_CONTEST_END),
        }
    }
}

/// Complete filter state for a run.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Active contest window. `None` = every timestamp counts.
    pub contest: Option<ContestWindow>,
}

/// Why a Scan event was not retained. Used for trace logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ScanType,
    NoPlanetClass,
    AlreadyDiscovered,
    IgnoredClass,
    OutsideWindow,
}

impl ScanFilter {
    pub fn with_contest(window: ContestWindow) -> Self {
        Self {
            contest: Some(window),
        }
    }

    /// Apply the timestamp-independent rules to a Scan event's fields.
    ///
    /// A discovery flag that is absent counts as discovered: only bodies
    /// explicitly marked as new are eligible.
    pub fn classify(
        &self,
        scan_type: Option<&str>,
        planet_class: Option<&str>,
        was_discovered: Option<bool>,
    ) -> Result<(ScanType, PlanetClass), Rejection> {
        let scan_type = scan_type
            .and_then(ScanType::from_journal)
            .ok_or(Rejection::ScanType)?;
        let raw_class = planet_class.ok_or(Rejection::NoPlanetClass)?;
        if was_discovered != Some(false) {
            return Err(Rejection::AlreadyDiscovered);
        }
        let class = PlanetClass::from_journal(raw_class).ok_or(Rejection::IgnoredClass)?;
        Ok((scan_type, class))
    }

    /// Apply the contest window, if any.
    pub fn check_time(&self, ts: DateTime<Utc>) -> Result<(), Rejection> {
        match self.contest {
            Some(window) if !window.contains(ts) => Err(Rejection::OutsideWindow),
            _ => Ok(()),
        }
    }
}
