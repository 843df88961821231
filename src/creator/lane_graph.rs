//! Vom Segment zur Lane: Node-Ketten, Anschlüsse, Zusammenführen.

use anyhow::Result;
use glam::Vec2;
use std::collections::{HashMap, HashSet};

use super::grid::ObstacleGrid;
use super::segments::Segment;
use super::settings::LaneWorldCreationSettings;
use crate::core::{Lane, LaneDirection, LaneNode, SpatialIndex, TrafficLaneWorld};

/// Kante des Zwischengraphen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneGraphEdge {
    /// Erster Node (Index in `LaneGraph::nodes`)
    pub a: usize,
    /// Zweiter Node
    pub b: usize,
    /// Lane-Breite
    pub width: f32,
    /// Anschluss zwischen zwei Segmenten
    pub junction: bool,
}

/// Ungerichteter Zwischengraph vor der Umwandlung in eine Lane-Welt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneGraph {
    /// Node-Positionen
    pub nodes: Vec<Vec2>,
    /// Kanten
    pub edges: Vec<LaneGraphEdge>,
}

/// Kennzahlen der Verknüpfung
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneGraphStats {
    /// Anschluss-Kanten zwischen Segmenten
    pub junctions: usize,
    /// Zusammengeführte Endpunkte
    pub merged_endpoints: usize,
}

#[derive(Debug, Clone, Copy)]
struct Endpoint {
    segment: usize,
    width: f32,
}

/// Baut aus den Segmenten einen verbundenen Zwischengraphen.
///
/// Entlang jedes Segments liegt alle `node_spacing_cells` Zellen ein Node,
/// beide Enden immer. Endpunkte verschiedener Segmente werden unterhalb von
/// anderthalb Zellen Abstand verschmolzen, bis `connection_radius` durch eine
/// Anschluss-Kante verbunden.
pub fn build_lane_graph(
    grid: &ObstacleGrid,
    segments: &[Segment],
    settings: &LaneWorldCreationSettings,
) -> (LaneGraph, LaneGraphStats) {
    let cell_size = grid.cell_size();
    let step = settings.node_spacing_cells.max(1);

    let mut nodes: Vec<Vec2> = Vec::new();
    let mut edges: Vec<LaneGraphEdge> = Vec::new();
    let mut endpoints: HashMap<usize, Endpoint> = HashMap::new();

    for (segment_index, segment) in segments.iter().enumerate() {
        if segment.cells.is_empty() {
            continue;
        }
        let width = (2.0 * segment.clearance * cell_size).min(settings.max_lane_width);

        let last = segment.cells.len() - 1;
        let mut samples: Vec<usize> = (0..=last).step_by(step).collect();
        if samples.last() != Some(&last) {
            samples.push(last);
        }

        let first_node = nodes.len();
        for &sample in &samples {
            nodes.push(grid.cell_center(segment.cells[sample]));
        }
        for i in first_node + 1..nodes.len() {
            edges.push(LaneGraphEdge {
                a: i - 1,
                b: i,
                width,
                junction: false,
            });
        }

        let endpoint = Endpoint {
            segment: segment_index,
            width,
        };
        endpoints.insert(first_node, endpoint);
        endpoints.insert(nodes.len() - 1, endpoint);
    }

    let mut stats = LaneGraphStats::default();
    let mut union_find = UnionFind::new(nodes.len());
    let merge_distance = cell_size * 1.5;

    let index = SpatialIndex::from_points(endpoints.keys().map(|&i| (i as u64, nodes[i])));

    let mut sorted_endpoints: Vec<usize> = endpoints.keys().copied().collect();
    sorted_endpoints.sort_unstable();

    for &node in &sorted_endpoints {
        let own = endpoints[&node];
        for candidate in index.within_radius(nodes[node], settings.connection_radius) {
            let other = candidate.node_id as usize;
            if other <= node {
                continue;
            }
            let Some(other_endpoint) = endpoints.get(&other) else {
                continue;
            };
            if other_endpoint.segment == own.segment {
                continue;
            }
            if candidate.distance <= merge_distance {
                if union_find.union(node, other) {
                    stats.merged_endpoints += 1;
                }
            } else {
                edges.push(LaneGraphEdge {
                    a: node,
                    b: other,
                    width: own.width.min(other_endpoint.width),
                    junction: true,
                });
            }
        }
    }

    let graph = compact(nodes, edges, &mut union_find);
    stats.junctions = graph.edges.iter().filter(|e| e.junction).count();
    log::debug!(
        "Lane-Graph: {} Nodes, {} Kanten, {} Anschluesse, {} verschmolzen",
        graph.nodes.len(),
        graph.edges.len(),
        stats.junctions,
        stats.merged_endpoints
    );
    (graph, stats)
}

/// Wendet die Verschmelzungen an, entfernt Schleifen, doppelte Kanten und
/// Nodes ohne Kante und nummeriert dicht neu.
fn compact(nodes: Vec<Vec2>, edges: Vec<LaneGraphEdge>, union_find: &mut UnionFind) -> LaneGraph {
    let mut seen_pairs = HashSet::new();
    let mut kept_edges = Vec::with_capacity(edges.len());
    for edge in edges {
        let (a, b) = (union_find.find(edge.a), union_find.find(edge.b));
        if a == b || !seen_pairs.insert((a.min(b), a.max(b))) {
            continue;
        }
        kept_edges.push(LaneGraphEdge { a, b, ..edge });
    }

    let mut used = vec![false; nodes.len()];
    for edge in &kept_edges {
        used[edge.a] = true;
        used[edge.b] = true;
    }

    let mut remap = vec![usize::MAX; nodes.len()];
    let mut compact_nodes = Vec::new();
    for (i, position) in nodes.into_iter().enumerate() {
        if used[i] {
            remap[i] = compact_nodes.len();
            compact_nodes.push(position);
        }
    }
    for edge in &mut kept_edges {
        edge.a = remap[edge.a];
        edge.b = remap[edge.b];
    }

    LaneGraph {
        nodes: compact_nodes,
        edges: kept_edges,
    }
}

impl LaneGraph {
    /// Wandelt den Graphen in eine Lane-Welt um.
    ///
    /// Node-IDs und Lane-IDs beginnen bei 1 in Graph-Reihenfolge. Alle Lanes
    /// sind in beide Richtungen befahrbar.
    pub fn into_traffic_lane_world(
        self,
        settings: &LaneWorldCreationSettings,
        map_name: Option<String>,
    ) -> Result<TrafficLaneWorld> {
        let mut world = TrafficLaneWorld::new(settings.bounds);
        world.map_name = map_name;
        world.extend_nodes(
            self.nodes
                .iter()
                .enumerate()
                .map(|(i, p)| LaneNode::new(i as u64 + 1, *p)),
        );

        for (i, edge) in self.edges.iter().enumerate() {
            world.add_lane(Lane::new(
                i as u64 + 1,
                edge.a as u64 + 1,
                edge.b as u64 + 1,
                LaneDirection::Dual,
                settings.default_lane_flags,
                edge.width,
                self.nodes[edge.a],
                self.nodes[edge.b],
            ))?;
        }
        Ok(world)
    }
}

/// Union-Find mit Pfadkompression; Repräsentant ist immer der kleinste Index
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        let (keep, drop) = (ra.min(rb), ra.max(rb));
        self.parent[drop] = keep;
        true
    }
}
