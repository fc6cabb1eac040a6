// ElwSleuth - core/relation.rs
//
// Moon-to-planet resolution via parent chains.
//
// A rocky body is a moon of Earth-like body E when E's body ID appears
// anywhere in the rocky body's parent chain and both share a system
// address. The chain is an unordered ancestor set here; journals list it
// innermost-first but nothing below depends on that.

use crate::core::model::{BodyGroup, BodyKey, ScanRecord};
use std::collections::HashMap;

/// Output of resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One group per Earth-like body, in Earth-like input order.
    pub groups: Vec<BodyGroup>,

    /// Every rocky body with an Earth-like parent, in rocky input order.
    /// Includes moons that lost the one-moon-per-planet slot.
    pub resolved_moons: Vec<BodyKey>,
}

/// Index of Earth-like bodies by identity, mapping to their position in the
/// Earth-like sequence.
struct ParentIndex {
    positions: HashMap<BodyKey, usize>,
}

impl ParentIndex {
    fn build(earthlike: &[ScanRecord]) -> Self {
        let mut positions = HashMap::with_capacity(earthlike.len());
        for (idx, rec) in earthlike.iter().enumerate() {
            positions.entry(rec.key).or_insert(idx);
        }
        Self { positions }
    }

    /// Earth-like parent of `rocky`, as a position in the Earth-like
    /// sequence. When the chain names several Earth-like bodies, the one
    /// earliest in Earth-like order wins.
    fn parent_of(&self, rocky: &ScanRecord) -> Option<usize> {
        rocky
            .ancestor_ids()
            .filter_map(|body_id| {
                self.positions.get(&BodyKey {
                    system_address: rocky.key.system_address,
                    body_id,
                })
            })
            .copied()
            .min()
    }
}

/// Pair each Earth-like body with at most one moon.
///
/// The first rocky body (in rocky order) whose winning parent is E becomes
/// E's moon; later matches are counted in `resolved_moons` only. With no
/// Earth-like bodies there are no resolved moons.
pub fn resolve(earthlike: Vec<ScanRecord>, rocky: Vec<ScanRecord>) -> Resolution {
    if earthlike.is_empty() {
        return Resolution::default();
    }

    let index = ParentIndex::build(&earthlike);
    let mut moons: Vec<Option<ScanRecord>> = vec![None; earthlike.len()];
    let mut resolved_moons = Vec::new();

    for candidate in rocky {
        let Some(parent) = index.parent_of(&candidate) else {
            continue;
        };
        resolved_moons.push(candidate.key);

        let slot = &mut moons[parent];
        if slot.is_none() {
            tracing::trace!(
                moon = %candidate.key,
                planet = %earthlike[parent].key,
                origin = %candidate.origin(),
                "Moon resolved"
            );
            *slot = Some(candidate);
        } else {
            tracing::trace!(
                moon = %candidate.key,
                planet = %earthlike[parent].key,
                origin = %candidate.origin(),
                "Additional moon ignored"
            );
        }
    }

    let groups = earthlike
        .into_iter()
        .zip(moons)
        .map(|(earthlike, moon)| BodyGroup { earthlike, moon })
        .collect();

    Resolution {
        groups,
        resolved_moons,
    }
}
