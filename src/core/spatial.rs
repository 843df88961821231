//! KD-Tree über Node-Positionen.
//!
//! Jeder Node belegt einen dichten Slot; Slots sind nach Node-ID sortiert.
//! Die Pfadsuche benutzt dieselben Slots als Index in ihren Suchraum.

use glam::Vec2;
use kiddo::{KdTree, SquaredEuclidean};

use super::WorldBounds;

/// Treffer einer Abfrage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    pub node_id: u64,
    /// Dichter Slot des Nodes im Index
    pub slot: usize,
    pub distance: f32,
}

/// Unveränderlicher Index; wird bei jeder Änderung der Node-Menge neu gebaut.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f32, 2>,
    node_ids: Vec<u64>,
    positions: Vec<Vec2>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::from_points(std::iter::empty())
    }
}

impl SpatialIndex {
    /// Baut den Index aus `(id, position)`-Paaren. Doppelte IDs: der letzte gewinnt.
    pub fn from_points(points: impl IntoIterator<Item = (u64, Vec2)>) -> Self {
        let mut points: Vec<(u64, Vec2)> = points.into_iter().collect();
        points.sort_by_key(|(id, _)| *id);
        points.dedup_by(|later, earlier| {
            let same = later.0 == earlier.0;
            if same {
                earlier.1 = later.1;
            }
            same
        });

        let (node_ids, positions): (Vec<u64>, Vec<Vec2>) = points.into_iter().unzip();
        let coords: Vec<[f32; 2]> = positions.iter().map(|p| p.to_array()).collect();

        Self {
            tree: (&coords).into(),
            node_ids,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Slot eines Nodes (binäre Suche)
    pub fn slot_of(&self, node_id: u64) -> Option<usize> {
        self.node_ids.binary_search(&node_id).ok()
    }

    /// Node-IDs in Slot-Reihenfolge (aufsteigend)
    pub fn node_ids(&self) -> &[u64] {
        &self.node_ids
    }

    /// Positionen in Slot-Reihenfolge
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn position(&self, node_id: u64) -> Option<Vec2> {
        self.slot_of(node_id).map(|slot| self.positions[slot])
    }

    fn hit(&self, item: u64, distance_sq: f32) -> Option<SpatialMatch> {
        let slot = usize::try_from(item).ok()?;
        Some(SpatialMatch {
            node_id: *self.node_ids.get(slot)?,
            slot,
            distance: distance_sq.sqrt(),
        })
    }

    pub fn nearest(&self, query: Vec2) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }
        let found = self
            .tree
            .nearest_one::<SquaredEuclidean>(&query.to_array());
        self.hit(found.item, found.distance)
    }

    /// Alle Nodes im Radius, nach Distanz und danach nach ID sortiert
    pub fn within_radius(&self, query: Vec2, radius: f32) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let mut hits: Vec<SpatialMatch> = self
            .tree
            .within::<SquaredEuclidean>(&query.to_array(), radius * radius)
            .into_iter()
            .filter_map(|n| self.hit(n.item, n.distance))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.slot.cmp(&b.slot)));
        hits
    }

    /// Nächster Node im Radius, dessen Slot das Prädikat erfüllt.
    ///
    /// Akteure rasten nur auf Nodes ein, an denen eine für sie benutzbare
    /// Lane hängt.
    pub fn nearest_matching(
        &self,
        query: Vec2,
        max_radius: f32,
        mut accept: impl FnMut(&SpatialMatch) -> bool,
    ) -> Option<SpatialMatch> {
        self.within_radius(query, max_radius)
            .into_iter()
            .find(|hit| accept(hit))
    }

    /// Node-IDs innerhalb eines Weltbereichs (Ränder inklusive), aufsteigend
    pub fn within_bounds(&self, area: &WorldBounds) -> Vec<u64> {
        if self.is_empty() {
            return Vec::new();
        }
        let center = (area.min() + area.max()) * 0.5;
        // Umkreis leicht vergrößert, damit Eckpunkte sicher im Vorfilter landen
        let reach_sq = (area.max() - center).length_squared() * 1.001 + 1e-3;

        let mut ids: Vec<u64> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&center.to_array(), reach_sq)
            .into_iter()
            .filter_map(|n| usize::try_from(n.item).ok())
            .filter(|&slot| self.positions.get(slot).is_some_and(|p| area.contains(*p)))
            .map(|slot| self.node_ids[slot])
            .collect();
        ids.sort_unstable();
        ids
    }
}
