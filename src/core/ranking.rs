// ElwSleuth - core/ranking.rs
//
// Best-in-class selection over scored groups.
// Core layer: pure logic, inputs are never mutated.

use crate::core::esi::ReferenceBody;
use crate::core::model::{MostSimilar, RankingRow, RankingSummary, ScoredBody, ScoredGroup};

/// Return the first item with the highest score.
///
/// Equivalent to the head of a stable descending sort: ties keep input
/// order. NaN ranks below every number and is only chosen when nothing
/// else is available.
pub fn best_by<'a, T, I, F>(items: I, score: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> f64,
{
    let mut best: Option<(&'a T, f64)> = None;
    for item in items {
        let s = score(item);
        let better = match best {
            None => true,
            Some((_, current)) => (current.is_nan() && !s.is_nan()) || s > current,
        };
        if better {
            best = Some((item, s));
        }
    }
    best.map(|(item, _)| item)
}

/// Build the ranking summary for a run.
///
/// Earth rows are produced only when there is at least one Earth-like body,
/// Moon rows only when at least one group has a moon.
pub fn aggregate(groups: &[ScoredGroup]) -> RankingSummary {
    let planets: Vec<&ScoredBody> = groups.iter().map(|g| &g.earthlike).collect();
    let moons: Vec<&ScoredBody> = groups.iter().filter_map(|g| g.moon.as_ref()).collect();

    let mut rows = Vec::with_capacity(14);
    rows.extend(rows_for(&planets, ReferenceBody::Earth));
    rows.extend(rows_for(&moons, ReferenceBody::Moon));

    let summary = RankingSummary {
        best_earthlike: most_similar(&planets),
        best_moon: most_similar(&moons),
        rows,
    };

    tracing::debug!(
        planets = planets.len(),
        moons = moons.len(),
        rows = summary.rows.len(),
        "Ranking aggregated"
    );

    summary
}

fn most_similar(bodies: &[&ScoredBody]) -> Option<MostSimilar> {
    best_by(bodies.iter(), |b| b.score.overall).map(|b| MostSimilar {
        name: b.name().to_string(),
        similarity: b.score.overall,
    })
}

fn rows_for(bodies: &[&ScoredBody], reference: ReferenceBody) -> Vec<RankingRow> {
    reference
        .attributes()
        .iter()
        .filter_map(|&attribute| {
            let reference_value = reference.value(attribute)?;
            let best = best_by(bodies.iter(), |b| {
                b.score.get(attribute).unwrap_or(f64::NAN)
            })?;
            Some(RankingRow {
                reference,
                attribute,
                body_name: best.name().to_string(),
                value: best.body.value(attribute),
                reference_value,
                esi: best.score.get(attribute).unwrap_or(f64::NAN),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::esi;
    use crate::core::model::{Attribute, BodyKey, NormalizedBody};
    use chrono::Utc;

    fn scored(name: &str, mass: f64, reference: ReferenceBody) -> ScoredBody {
        let body = NormalizedBody {
            name: name.to_string(),
            mass,
            gravity: 1.0,
            radius: 6378.0,
            temperature: 287.91,
            orbital_period: 365.256,
            rotation_period: 1.0,
            eccentricity: 0.0167,
            pressure: 1.0,
            oxygen: 20.9,
            tilt: 23.439,
        };
        let score = esi::score(&body, reference);
        ScoredBody {
            key: BodyKey {
                system_address: 1,
                body_id: 1,
            },
            timestamp: Utc::now(),
            body,
            score,
        }
    }

    fn group(name: &str, mass: f64) -> ScoredGroup {
        ScoredGroup {
            earthlike: scored(name, mass, ReferenceBody::Earth),
            moon: None,
        }
    }

    #[test]
    fn test_best_by_picks_max() {
        let values = [0.80, 0.95, 0.60];
        let best = best_by(values.iter(), |v| *v).unwrap();
        assert_eq!(*best, 0.95);
    }

    #[test]
    fn test_best_by_ties_keep_first() {
        let items = [("a", 0.5), ("b", 0.9), ("c", 0.9)];
        let best = best_by(items.iter(), |i| i.1).unwrap();
        assert_eq!(best.0, "b");
    }

    #[test]
    fn test_best_by_nan_ranks_last() {
        let items = [("nan", f64::NAN), ("low", 0.1)];
        assert_eq!(best_by(items.iter(), |i| i.1).unwrap().0, "low");
        let only_nan = [("nan", f64::NAN)];
        assert_eq!(best_by(only_nan.iter(), |i| i.1).unwrap().0, "nan");
        let empty: [(&str, f64); 0] = [];
        assert!(best_by(empty.iter(), |i| i.1).is_none());
    }

    #[test]
    fn test_best_mass_selected() {
        // Below 1 EM, mass ESI is 2m / (1 + m), so m = e / (2 - e).
        let mass_for = |e: f64| e / (2.0 - e);
        let groups = vec![
            group("A", mass_for(0.80)),
            group("B", mass_for(0.95)),
            group("C", mass_for(0.60)),
        ];
        let mass_esi: Vec<f64> = groups
            .iter()
            .map(|g| g.earthlike.score.get(Attribute::Mass).unwrap())
            .collect();
        for (got, want) in mass_esi.iter().zip([0.80, 0.95, 0.60]) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }

        let summary = aggregate(&groups);
        let mass_row = summary
            .rows
            .iter()
            .find(|r| r.reference == ReferenceBody::Earth && r.attribute == Attribute::Mass)
            .unwrap();
        assert_eq!(mass_row.body_name, "B");
        assert_eq!(mass_row.value, mass_for(0.95));
        assert_eq!(mass_row.reference_value, 1.0);
        assert_eq!(summary.best_earthlike.unwrap().name, "B");
    }

    #[test]
    fn test_row_shape() {
        let mut with_moon = group("A", 1.0);
        with_moon.moon = Some(scored("A a", 0.0123, ReferenceBody::Moon));
        let summary = aggregate(&[with_moon]);

        assert_eq!(summary.rows.len(), 14);
        let order: Vec<Attribute> = summary.rows.iter().map(|r| r.attribute).collect();
        assert_eq!(&order[..10], Attribute::all());
        assert_eq!(
            &order[10..],
            &[
                Attribute::Mass,
                Attribute::Gravity,
                Attribute::Radius,
                Attribute::OrbitalPeriod
            ]
        );
        assert_eq!(summary.best_moon.unwrap().name, "A a");
    }

    #[test]
    fn test_no_moons_no_moon_rows() {
        let summary = aggregate(&[group("A", 1.0)]);
        assert_eq!(summary.rows.len(), 10);
        assert!(summary.best_moon.is_none());
    }

    #[test]
    fn test_empty_input() {
        let summary = aggregate(&[]);
        assert_eq!(summary, RankingSummary::default());
    }
}
