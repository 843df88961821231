//! Abstandsfeld zum nächsten Hindernis und Mittelachsen-Zellen.
//!
//! Mehrquellen-Dijkstra über die 8er-Nachbarschaft (Chamfer-Distanz). Jede
//! freie Zelle erbt das Label des Hindernisses, von dem sie erreicht wurde.
//! Zellen, an denen zwei Einzugsgebiete aneinanderstoßen, bilden die
//! diskrete Voronoi-Mittelachse.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::grid::{ObstacleGrid, ObstacleLabel};

/// Toleranz für gleich weite Wege
const DISTANCE_EPSILON: f32 = 1e-4;

/// Abstand und nächstes Hindernis pro Zelle
#[derive(Debug, Clone)]
pub struct DistanceField {
    distance: Vec<f32>,
    label: Vec<Option<ObstacleLabel>>,
}

/// Eine Zelle der Mittelachse zwischen zwei Hindernissen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedialCell {
    /// Zellindex im Raster
    pub index: usize,
    /// Hindernispaar (kleineres Label zuerst)
    pub pair: (ObstacleLabel, ObstacleLabel),
    /// Abstand zum nächsten Hindernis in Zellen
    pub clearance: f32,
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    distance: f32,
    index: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // Min-Heap: kleinste Distanz, bei Gleichstand kleinster Index zuerst
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl DistanceField {
    /// Berechnet das Feld. Ohne Hindernisse bleibt jede Zelle unendlich weit entfernt.
    pub fn compute(grid: &ObstacleGrid) -> Self {
        let mut distance = vec![f32::INFINITY; grid.len()];
        let mut label = vec![None; grid.len()];
        let mut heap = BinaryHeap::new();

        for index in 0..grid.len() {
            if let Some(l) = grid.label(index) {
                distance[index] = 0.0;
                label[index] = Some(l);
                heap.push(QueueEntry {
                    distance: 0.0,
                    index,
                });
            }
        }

        while let Some(QueueEntry { distance: d, index }) = heap.pop() {
            if d > distance[index] {
                continue;
            }
            let source = label[index];
            for (next, cost) in grid.neighbors8(index) {
                if grid.is_blocked(next) {
                    continue;
                }
                let candidate = d + cost;
                let current = distance[next];
                let better = candidate < current - DISTANCE_EPSILON
                    || ((candidate - current).abs() <= DISTANCE_EPSILON && source < label[next]);
                if better {
                    distance[next] = candidate.min(current);
                    label[next] = source;
                    heap.push(QueueEntry {
                        distance: distance[next],
                        index: next,
                    });
                }
            }
        }

        Self { distance, label }
    }

    /// Abstand der Zelle zum nächsten Hindernis (in Zellen)
    pub fn distance(&self, index: usize) -> f32 {
        self.distance.get(index).copied().unwrap_or(f32::INFINITY)
    }

    /// Label des nächsten Hindernisses
    pub fn label(&self, index: usize) -> Option<ObstacleLabel> {
        self.label.get(index).copied().flatten()
    }

    /// Sammelt die Mittelachsen-Zellen in Zeilenreihenfolge.
    ///
    /// Eine freie Zelle gehört zur Mittelachse, wenn ein freier 4er-Nachbar
    /// einem Hindernis mit größerem Label zugeordnet ist. Die Grenze wird
    /// so nur einseitig markiert und bleibt eine Zelle dick.
    pub fn medial_cells(&self, grid: &ObstacleGrid, min_clearance_cells: f32) -> Vec<MedialCell> {
        let (w, h) = (grid.width(), grid.height());
        let mut cells = Vec::new();

        for index in 0..grid.len() {
            if grid.is_blocked(index) {
                continue;
            }
            let Some(own) = self.label(index) else {
                continue;
            };
            let clearance = self.distance[index];
            if clearance < min_clearance_cells {
                continue;
            }

            let (x, z) = grid.coords(index);
            let neighbors = [
                (x > 0).then(|| index - 1),
                (x + 1 < w).then(|| index + 1),
                (z > 0).then(|| index - w),
                (z + 1 < h).then(|| index + w),
            ];
            let partner = neighbors
                .into_iter()
                .flatten()
                .filter(|&n| !grid.is_blocked(n))
                .filter_map(|n| self.label(n))
                .filter(|&other| other > own)
                .min();

            if let Some(other) = partner {
                cells.push(MedialCell {
                    index,
                    pair: (own, other),
                    clearance,
                });
            }
        }

        log::debug!("{} Mittelachsen-Zellen gefunden", cells.len());
        cells
    }
}
