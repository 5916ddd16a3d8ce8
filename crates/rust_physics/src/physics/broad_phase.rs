//! Broad phase: sweep and prune
//!
//! Every tracked collider contributes two endpoints on the x axis. Endpoints
//! are kept sorted with insertion sort, which is close to linear when motion
//! between ticks barely reorders them. Sweeping the sorted list while keeping
//! the set of open intervals yields every pair whose x intervals overlap, and
//! optionally drops pairs whose y intervals are disjoint.

use std::collections::HashMap;

use log::{debug, trace, warn};

use super::shape::Aabb;
use crate::ecs::Entity;
use crate::foundation::math::Vec2;

#[derive(Debug, Clone, Copy)]
struct Edge {
    entity: Entity,
    x: f32,
    is_left: bool,
}

impl Edge {
    /// Sort order; left endpoints first on ties so touching boxes pair up
    fn precedes(&self, other: &Self) -> bool {
        self.x < other.x || (self.x <= other.x && self.is_left && !other.is_left)
    }
}

/// Sweep-and-prune index over collider bounding boxes
#[derive(Debug, Clone)]
pub struct SweepAndPrune {
    edges: Vec<Edge>,
    bounds: HashMap<Entity, Aabb>,
    check_y: bool,
}

impl Default for SweepAndPrune {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SweepAndPrune {
    /// Create an empty index. `check_y` also filters candidates on the y axis.
    pub fn new(check_y: bool) -> Self {
        Self {
            edges: Vec::new(),
            bounds: HashMap::new(),
            check_y,
        }
    }

    /// Start tracking `entity`. Returns false if it was already tracked.
    ///
    /// Its bounds are unknown until the next [`SweepAndPrune::update`].
    pub fn add(&mut self, entity: Entity) -> bool {
        if self.bounds.contains_key(&entity) {
            return false;
        }
        self.bounds.insert(entity, Aabb::new(Vec2::zeros(), Vec2::zeros()));
        self.edges.push(Edge { entity, x: 0.0, is_left: true });
        self.edges.push(Edge { entity, x: 0.0, is_left: false });
        trace!("Broad phase tracking {entity:?}");
        true
    }

    /// Stop tracking `entity`. Returns false if it was not tracked.
    pub fn remove(&mut self, entity: Entity) -> bool {
        if self.bounds.remove(&entity).is_none() {
            return false;
        }
        self.edges.retain(|edge| edge.entity != entity);
        trace!("Broad phase dropped {entity:?}");
        true
    }

    /// Entity is tracked
    pub fn contains(&self, entity: Entity) -> bool {
        self.bounds.contains_key(&entity)
    }

    /// Number of tracked entities
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Forget every entity
    pub fn clear(&mut self) {
        self.edges.clear();
        self.bounds.clear();
    }

    /// Last bounds recorded for `entity`
    pub fn bounds(&self, entity: Entity) -> Option<Aabb> {
        self.bounds.get(&entity).copied()
    }

    /// Refresh every tracked bounding box and restore endpoint order
    ///
    /// `bounds_of` returns the current world box, or `None` for an entity that
    /// no longer has a collider. Such entities are dropped from the index, and
    /// so are entities whose box is not finite.
    pub fn update<F>(&mut self, mut bounds_of: F)
    where
        F: FnMut(Entity) -> Option<Aabb>,
    {
        let mut stale = Vec::new();
        for (entity, bounds) in &mut self.bounds {
            match bounds_of(*entity) {
                Some(current) if current.is_finite() => *bounds = current,
                Some(current) => {
                    warn!("Broad phase entry {entity:?} has non-finite bounds {current:?}, removing");
                    stale.push(*entity);
                }
                None => {
                    debug!("Broad phase entry {entity:?} lost its collider, removing");
                    stale.push(*entity);
                }
            }
        }
        for entity in stale {
            self.remove(entity);
        }

        for edge in &mut self.edges {
            if let Some(bounds) = self.bounds.get(&edge.entity) {
                edge.x = if edge.is_left { bounds.min.x } else { bounds.max.x };
            }
        }

        for i in 1..self.edges.len() {
            let mut j = i;
            while j > 0 && self.edges[j].precedes(&self.edges[j - 1]) {
                self.edges.swap(j, j - 1);
                j -= 1;
            }
        }
    }

    /// Candidate pairs for the current ordering
    ///
    /// The iterator is lazy and single-use; call [`SweepAndPrune::update`]
    /// first so it reflects this tick's positions.
    pub fn pairs(&self) -> CandidatePairs<'_> {
        CandidatePairs {
            index: self,
            cursor: 0,
            active: Vec::new(),
            entering: None,
        }
    }

    fn overlaps_y(&self, a: Entity, b: Entity) -> bool {
        if !self.check_y {
            return true;
        }
        match (self.bounds.get(&a), self.bounds.get(&b)) {
            (Some(a), Some(b)) => a.overlaps_y(b),
            _ => false,
        }
    }
}

/// Lazy sweep over a [`SweepAndPrune`] index
///
/// Yields `(open, entering)` pairs: an entity whose interval was already open
/// and one whose left endpoint was just reached.
#[derive(Debug)]
pub struct CandidatePairs<'a> {
    index: &'a SweepAndPrune,
    cursor: usize,
    active: Vec<Entity>,
    entering: Option<(Entity, usize)>,
}

impl Iterator for CandidatePairs<'_> {
    type Item = (Entity, Entity);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((entity, checked)) = self.entering {
                if let Some(&open) = self.active.get(checked) {
                    self.entering = Some((entity, checked + 1));
                    if self.index.overlaps_y(open, entity) {
                        return Some((open, entity));
                    }
                    continue;
                }
                self.active.push(entity);
                self.entering = None;
            }

            let edge = self.index.edges.get(self.cursor)?;
            self.cursor += 1;
            if edge.is_left {
                self.entering = Some((edge.entity, 0));
            } else {
                self.active.retain(|open| *open != edge.entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use slotmap::SlotMap;
    use std::collections::HashSet;

    fn entities(count: usize) -> Vec<Entity> {
        let mut keys: SlotMap<Entity, ()> = SlotMap::with_key();
        (0..count).map(|_| keys.insert(())).collect()
    }

    fn aabb(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    fn unordered(pairs: impl Iterator<Item = (Entity, Entity)>) -> HashSet<(Entity, Entity)> {
        pairs.map(|(a, b)| if a < b { (a, b) } else { (b, a) }).collect()
    }

    #[test]
    fn test_add_is_idempotent() {
        let ids = entities(1);
        let mut sap = SweepAndPrune::default();
        assert!(sap.add(ids[0]));
        assert!(!sap.add(ids[0]));
        assert_eq!(sap.len(), 1);
        assert!(sap.remove(ids[0]));
        assert!(!sap.remove(ids[0]));
        assert!(sap.is_empty());
    }

    #[test]
    fn test_finds_overlapping_pairs_only() {
        let ids = entities(3);
        let boxes: HashMap<Entity, Aabb> = [
            (ids[0], aabb(0.0, 0.0, 10.0, 10.0)),
            (ids[1], aabb(5.0, 5.0, 10.0, 10.0)),
            (ids[2], aabb(30.0, 0.0, 10.0, 10.0)),
        ]
        .into_iter()
        .collect();

        let mut sap = SweepAndPrune::default();
        for id in &ids {
            sap.add(*id);
        }
        sap.update(|e| boxes.get(&e).copied());

        let pairs = unordered(sap.pairs());
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains(&(ids[0].min(ids[1]), ids[0].max(ids[1]))));
    }

    #[test]
    fn test_non_finite_bounds_are_dropped() {
        let ids = entities(3);
        let boxes: HashMap<Entity, Aabb> = [
            (ids[0], aabb(0.0, 0.0, 10.0, 10.0)),
            (ids[1], aabb(f32::NAN, 0.0, 10.0, 10.0)),
            (ids[2], aabb(5.0, 5.0, 10.0, 10.0)),
        ]
        .into_iter()
        .collect();

        let mut sap = SweepAndPrune::default();
        for id in &ids {
            sap.add(*id);
        }
        sap.update(|e| boxes.get(&e).copied());

        assert!(!sap.contains(ids[1]));
        let pairs = unordered(sap.pairs());
        assert_eq!(pairs, HashSet::from([(ids[0].min(ids[2]), ids[0].max(ids[2]))]));
    }

    #[test]
    fn test_y_axis_filter() {
        let ids = entities(2);
        let boxes: HashMap<Entity, Aabb> = [
            (ids[0], aabb(0.0, 0.0, 10.0, 10.0)),
            (ids[1], aabb(0.0, 50.0, 10.0, 10.0)),
        ]
        .into_iter()
        .collect();

        let mut filtered = SweepAndPrune::new(true);
        let mut x_only = SweepAndPrune::new(false);
        for id in &ids {
            filtered.add(*id);
            x_only.add(*id);
        }
        filtered.update(|e| boxes.get(&e).copied());
        x_only.update(|e| boxes.get(&e).copied());

        assert_eq!(filtered.pairs().count(), 0);
        assert_eq!(x_only.pairs().count(), 1);
    }

    #[test]
    fn test_touching_boxes_are_candidates() {
        let ids = entities(2);
        let boxes: HashMap<Entity, Aabb> = [
            (ids[0], aabb(0.0, 0.0, 10.0, 10.0)),
            (ids[1], aabb(10.0, 0.0, 10.0, 10.0)),
        ]
        .into_iter()
        .collect();

        let mut sap = SweepAndPrune::default();
        sap.add(ids[1]);
        sap.add(ids[0]);
        sap.update(|e| boxes.get(&e).copied());
        assert_eq!(sap.pairs().count(), 1);
    }

    #[test]
    fn test_update_drops_entities_without_bounds() {
        let ids = entities(2);
        let mut sap = SweepAndPrune::default();
        sap.add(ids[0]);
        sap.add(ids[1]);
        sap.update(|e| (e == ids[0]).then(|| aabb(0.0, 0.0, 1.0, 1.0)));

        assert!(sap.contains(ids[0]));
        assert!(!sap.contains(ids[1]));
        assert_eq!(sap.pairs().count(), 0);
    }

    #[test]
    fn test_removed_entity_never_yielded() {
        let ids = entities(3);
        let mut sap = SweepAndPrune::default();
        for id in &ids {
            sap.add(*id);
        }
        sap.update(|_| Some(aabb(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(sap.pairs().count(), 3);

        sap.remove(ids[1]);
        assert!(sap.pairs().all(|(a, b)| a != ids[1] && b != ids[1]));
        assert_eq!(sap.pairs().count(), 1);
    }

    fn arb_boxes() -> impl Strategy<Value = Vec<(f32, f32, f32, f32)>> {
        prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0, 0.0f32..40.0, 0.0f32..40.0), 0..24)
    }

    proptest! {
        #[test]
        fn prop_candidates_cover_all_overlaps(start in arb_boxes(), motion in prop::collection::vec((-15.0f32..15.0, -15.0f32..15.0), 24)) {
            let ids = entities(start.len());
            let mut sap = SweepAndPrune::default();
            for id in &ids {
                sap.add(*id);
            }

            let first: HashMap<Entity, Aabb> = ids.iter().zip(&start).map(|(id, &(x, y, w, h))| (*id, aabb(x, y, w, h))).collect();
            sap.update(|e| first.get(&e).copied());

            // Second tick after everything moved: the insertion sort must catch up
            let moved: HashMap<Entity, Aabb> = ids
                .iter()
                .zip(&start)
                .zip(&motion)
                .map(|((id, &(x, y, w, h)), &(dx, dy))| (*id, aabb(x + dx, y + dy, w, h)))
                .collect();
            sap.update(|e| moved.get(&e).copied());

            let candidates = unordered(sap.pairs());
            for (i, a) in ids.iter().enumerate() {
                for b in &ids[i + 1..] {
                    if moved[a].overlaps(&moved[b]) {
                        let key = if a < b { (*a, *b) } else { (*b, *a) };
                        prop_assert!(candidates.contains(&key), "missed overlapping pair");
                    }
                }
            }
        }
    }
}
