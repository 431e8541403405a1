//! Candidate narrowing for offset-mode pages.
//!
//! Offset pages are ordered by a parent column (the product name) while the
//! paged rows live in the child table. The parent side is ranked and capped
//! first, and only children of that bounded candidate set are sorted and
//! sliced. The cap grows with the requested depth so that legitimate pages
//! stay inside it, but never past [`MAX_CANDIDATES`].

use std::collections::HashMap;
use std::hash::Hash;

use vitrine_model::CandidateKey;

/// Lower bound of the candidate set, so shallow pages never starve.
pub const MIN_CANDIDATES: u32 = 100;

/// Hard ceiling on materialized candidates under any filter.
pub const MAX_CANDIDATES: u32 = 5_000;

/// Number of parent candidates to materialize for an offset page:
/// `2 * (skip + limit)` clamped to `[MIN_CANDIDATES, MAX_CANDIDATES]`.
pub fn candidate_budget(skip: u32, limit: u32) -> u32 {
    let wanted = (u64::from(skip) + u64::from(limit)).saturating_mul(2);
    let clamped =
        wanted.clamp(u64::from(MIN_CANDIDATES), u64::from(MAX_CANDIDATES));
    // Bounded by MAX_CANDIDATES above.
    clamped as u32
}

/// Rank candidates by `(sort_key, id)` and keep the first `budget`.
pub fn narrow(
    mut candidates: Vec<CandidateKey>,
    budget: u32,
) -> Vec<CandidateKey> {
    candidates.sort_unstable();
    candidates.dedup();
    candidates.truncate(budget as usize);
    candidates
}

/// Reorder hydrated entities to match `ids`.
///
/// Hydration joins carry no ordering guarantee. Entities whose id is not in
/// `ids` are dropped, and ids without an entity (deleted between the id
/// query and hydration) leave no hole.
pub fn restore_order<K, T, F>(ids: &[K], entities: Vec<T>, key_of: F) -> Vec<T>
where
    K: Eq + Hash + Copy,
    F: Fn(&T) -> K,
{
    let positions: HashMap<K, usize> = ids
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position))
        .collect();

    let mut slots: Vec<Option<T>> = Vec::with_capacity(ids.len());
    slots.resize_with(ids.len(), || None);

    for entity in entities {
        if let Some(&position) = positions.get(&key_of(&entity)) {
            slots[position] = Some(entity);
        }
    }

    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn budget_has_a_floor() {
        assert_eq!(candidate_budget(0, 12), MIN_CANDIDATES);
        assert_eq!(candidate_budget(24, 12), MIN_CANDIDATES);
    }

    #[test]
    fn budget_doubles_the_requested_depth() {
        assert_eq!(candidate_budget(100, 20), 240);
        assert_eq!(candidate_budget(49, 1), 100);
        assert_eq!(candidate_budget(50, 1), 102);
    }

    #[test]
    fn budget_is_capped() {
        assert_eq!(candidate_budget(10_000, 12), MAX_CANDIDATES);
        assert_eq!(candidate_budget(u32::MAX, u32::MAX), MAX_CANDIDATES);
    }

    #[test]
    fn narrowing_orders_by_sort_key_then_id() {
        let a2 = CandidateKey::new("alpha", Uuid::from_u128(2));
        let a1 = CandidateKey::new("alpha", Uuid::from_u128(1));
        let b0 = CandidateKey::new("beta", Uuid::from_u128(0));

        let narrowed = narrow(vec![b0.clone(), a2.clone(), a1.clone()], 2);
        assert_eq!(narrowed, vec![a1, a2]);
    }

    #[test]
    fn restore_order_follows_id_list() {
        let ids = [3_u32, 1, 2];
        let hydrated = vec![(1, "one"), (2, "two"), (3, "three"), (9, "nine")];
        let restored = restore_order(&ids, hydrated, |(id, _)| *id);
        assert_eq!(restored, vec![(3, "three"), (1, "one"), (2, "two")]);
    }

    #[test]
    fn restore_order_skips_vanished_ids() {
        let ids = [5_u32, 6, 7];
        let restored = restore_order(&ids, vec![7, 5], |id| *id);
        assert_eq!(restored, vec![5, 7]);
    }
}
