//! Zerlegung der Mittelachse in Liniensegmente.
//!
//! Mittelachsen-Zellen werden nach ihrem Hindernispaar gruppiert, jede Gruppe
//! in 8-zusammenhängende Komponenten zerlegt und jede Komponente auf ihren
//! längsten Pfad reduziert (zweifache Breitensuche). Abzweige fallen weg.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet, VecDeque};

use super::distance_field::MedialCell;
use super::grid::{ObstacleGrid, ObstacleLabel};

/// Geordnete Zellkette zwischen zwei Hindernissen
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Hindernispaar
    pub pair: (ObstacleLabel, ObstacleLabel),
    /// Zellindizes vom einen Ende zum anderen
    pub cells: Vec<usize>,
    /// Kleinster Hindernisabstand entlang der Kette (in Zellen)
    pub clearance: f32,
}

impl Segment {
    /// Erste Zelle
    pub fn first(&self) -> Option<usize> {
        self.cells.first().copied()
    }

    /// Letzte Zelle
    pub fn last(&self) -> Option<usize> {
        self.cells.last().copied()
    }
}

/// Zerlegt die Mittelachse in Segmente.
///
/// Komponenten mit weniger als `min_segment_cells` Zellen werden verworfen.
/// Die Reihenfolge ist deterministisch: Paare in Reihenfolge ihres ersten
/// Auftretens, Komponenten nach ihrer ersten Zelle.
pub fn trace_segments(
    grid: &ObstacleGrid,
    medial: &[MedialCell],
    min_segment_cells: usize,
) -> Vec<Segment> {
    let mut groups: IndexMap<(ObstacleLabel, ObstacleLabel), Vec<&MedialCell>> = IndexMap::new();
    for cell in medial {
        groups.entry(cell.pair).or_default().push(cell);
    }

    let mut segments = Vec::new();
    let mut dropped = 0usize;
    for (pair, cells) in &groups {
        let clearance: HashMap<usize, f32> = cells.iter().map(|c| (c.index, c.clearance)).collect();
        let mut assigned: HashSet<usize> = HashSet::new();

        for seed in cells.iter().map(|c| c.index) {
            if assigned.contains(&seed) {
                continue;
            }
            let component = bfs(grid, seed, &clearance).order;
            assigned.extend(component.iter().copied());
            if component.len() < min_segment_cells.max(1) {
                dropped += 1;
                continue;
            }

            let path = longest_path(grid, seed, &clearance);
            let min_clearance = path
                .iter()
                .filter_map(|i| clearance.get(i).copied())
                .fold(f32::INFINITY, f32::min);
            segments.push(Segment {
                pair: *pair,
                cells: path,
                clearance: min_clearance,
            });
        }
    }

    log::debug!(
        "{} Segmente aus {} Hindernispaaren, {} zu kurze verworfen",
        segments.len(),
        groups.len(),
        dropped
    );
    segments
}

struct BfsResult {
    order: Vec<usize>,
    parent: HashMap<usize, usize>,
}

fn bfs(grid: &ObstacleGrid, start: usize, members: &HashMap<usize, f32>) -> BfsResult {
    let mut order = vec![start];
    let mut parent = HashMap::new();
    let mut queue = VecDeque::from([start]);
    let mut seen = HashSet::from([start]);

    while let Some(current) = queue.pop_front() {
        for (next, _) in grid.neighbors8(current) {
            if members.contains_key(&next) && seen.insert(next) {
                parent.insert(next, current);
                order.push(next);
                queue.push_back(next);
            }
        }
    }
    BfsResult { order, parent }
}

/// Längster Pfad einer Komponente per zweifacher Breitensuche
fn longest_path(grid: &ObstacleGrid, seed: usize, members: &HashMap<usize, f32>) -> Vec<usize> {
    let first = bfs(grid, seed, members);
    let far_a = first.order.last().copied().unwrap_or(seed);

    let second = bfs(grid, far_a, members);
    let far_b = second.order.last().copied().unwrap_or(far_a);

    let mut path = vec![far_b];
    let mut current = far_b;
    while let Some(&p) = second.parent.get(&current) {
        path.push(p);
        current = p;
    }
    path
}
