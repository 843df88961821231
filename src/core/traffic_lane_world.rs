//! Die zentrale Lane-Welt mit Nodes, Lanes, Kreuzungen und Spatial-Index.

use super::{Lane, LaneNode, SpatialIndex, SpatialMatch, StreetCrossing, WorldBounds};
use anyhow::{anyhow, bail, Result};
use glam::Vec2;
use std::collections::HashMap;

/// Graph der befahrbaren Spuren einer Map
#[derive(Debug, Clone)]
pub struct TrafficLaneWorld {
    /// Alle Nodes, indexiert nach ihrer ID
    nodes: HashMap<u64, LaneNode>,
    /// Alle Lanes, indexiert nach ihrer ID
    lanes: HashMap<u64, Lane>,
    /// Straßenkreuzungen (Reihenfolge = Einfügereihenfolge)
    crossings: Vec<StreetCrossing>,
    /// Name der Map (optional)
    pub map_name: Option<String>,
    /// Weltbereich, aus dem die Lane-Welt erzeugt wurde
    pub bounds: WorldBounds,
    /// Persistenter Spatial-Index fuer schnelle Node-Abfragen
    spatial_index: SpatialIndex,
}

/// Kennzahlen einer Lane-Welt (für Logging und CLI-Ausgabe)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldSummary {
    /// Anzahl Nodes
    pub node_count: usize,
    /// Anzahl Lanes
    pub lane_count: usize,
    /// Anzahl Kreuzungen
    pub crossing_count: usize,
    /// Summe aller Lane-Längen
    pub total_lane_length: f32,
    /// Anzahl gesperrter Lanes
    pub blocked_lanes: usize,
}

impl TrafficLaneWorld {
    /// Erstellt eine neue leere Lane-Welt
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            nodes: HashMap::new(),
            lanes: HashMap::new(),
            crossings: Vec::new(),
            map_name: None,
            bounds,
            spatial_index: SpatialIndex::default(),
        }
    }

    /// Findet einen Node, O(1)
    pub fn node(&self, node_id: u64) -> Option<&LaneNode> {
        self.nodes.get(&node_id)
    }

    pub fn contains_node(&self, node_id: u64) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Iterator über alle Nodes (read-only, ungeordnet).
    ///
    /// Positionen ändern sich nur über `update_node_position`, damit Index
    /// und Lane-Längen stimmen.
    pub fn nodes_iter(&self) -> impl Iterator<Item = &LaneNode> {
        self.nodes.values()
    }

    /// Fügt einen Node hinzu (ersetzt einen bestehenden mit gleicher ID)
    pub fn add_node(&mut self, node: LaneNode) {
        self.nodes.insert(node.id, node);
        self.rebuild_lane_geometry_of(node.id);
        self.rebuild_spatial_index();
    }

    /// Fügt mehrere Nodes hinzu und baut den Index nur einmal neu auf
    pub fn extend_nodes(&mut self, nodes: impl IntoIterator<Item = LaneNode>) {
        for node in nodes {
            self.nodes.insert(node.id, node);
        }
        self.rebuild_spatial_index();
    }

    /// Entfernt einen Node inklusive aller betroffenen Lanes
    pub fn remove_node(&mut self, node_id: u64) -> Option<LaneNode> {
        let removed = self.nodes.remove(&node_id);
        if removed.is_some() {
            self.lanes.retain(|_, lane| !lane.touches(node_id));
            for crossing in &mut self.crossings {
                crossing.node_ids.retain(|id| *id != node_id);
            }
            self.crossings.retain(|c| !c.node_ids.is_empty());
            self.rebuild_spatial_index();
        }
        removed
    }

    /// Aktualisiert die Position eines Nodes samt Lane-Längen und Index
    pub fn update_node_position(&mut self, node_id: u64, new_position: Vec2) -> bool {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return false;
        };

        if node.position == new_position {
            return true;
        }

        node.position = new_position;
        self.rebuild_lane_geometry_of(node_id);
        self.rebuild_spatial_index();
        true
    }

    /// Fügt eine Lane hinzu. Beide Endpunkte müssen existieren.
    pub fn add_lane(&mut self, mut lane: Lane) -> Result<()> {
        if lane.start_id == lane.end_id {
            bail!("Lane {} ist eine Schleife auf Node {}", lane.id, lane.start_id);
        }
        let (Some(start), Some(end)) =
            (self.nodes.get(&lane.start_id), self.nodes.get(&lane.end_id))
        else {
            bail!(
                "Lane {} verweist auf fehlenden Node ({} -> {})",
                lane.id,
                lane.start_id,
                lane.end_id
            );
        };
        lane.update_geometry(start.position, end.position);
        self.lanes.insert(lane.id, lane);
        Ok(())
    }

    /// Entfernt eine Lane
    pub fn remove_lane(&mut self, lane_id: u64) -> Option<Lane> {
        self.lanes.remove(&lane_id)
    }

    /// Findet eine Lane, O(1)
    pub fn find_lane(&self, lane_id: u64) -> Option<&Lane> {
        self.lanes.get(&lane_id)
    }

    /// Mutable Zugriff auf eine Lane (Flags, Breite, Richtung)
    pub fn find_lane_mut(&mut self, lane_id: u64) -> Option<&mut Lane> {
        self.lanes.get_mut(&lane_id)
    }

    /// Alle Lanes zwischen zwei Nodes (egal in welcher Orientierung), nach ID sortiert
    pub fn lanes_between(&self, node_a: u64, node_b: u64) -> Vec<&Lane> {
        let mut result: Vec<&Lane> = self
            .lanes
            .values()
            .filter(|l| {
                (l.start_id == node_a && l.end_id == node_b)
                    || (l.start_id == node_b && l.end_id == node_a)
            })
            .collect();
        result.sort_by_key(|l| l.id);
        result
    }

    /// Alle Lanes, die einen Node berühren, nach ID sortiert
    pub fn lanes_of_node(&self, node_id: u64) -> Vec<&Lane> {
        let mut result: Vec<&Lane> = self.lanes.values().filter(|l| l.touches(node_id)).collect();
        result.sort_by_key(|l| l.id);
        result
    }

    /// Lanes je Node in einem Durchlauf, jede Liste nach Lane-ID sortiert.
    ///
    /// Für Abfragen über alle Nodes statt `lanes_of_node` pro Node.
    pub fn lane_incidence(&self) -> HashMap<u64, Vec<&Lane>> {
        let mut incidence: HashMap<u64, Vec<&Lane>> = HashMap::with_capacity(self.nodes.len());
        for lane in self.sorted_lanes() {
            incidence.entry(lane.start_id).or_default().push(lane);
            incidence.entry(lane.end_id).or_default().push(lane);
        }
        incidence
    }

    /// Anzahl der Lanes an einem Node
    pub fn node_degree(&self, node_id: u64) -> usize {
        self.lanes.values().filter(|l| l.touches(node_id)).count()
    }

    /// Iterator über alle Lanes (read-only, ungeordnet).
    pub fn lanes_iter(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.values()
    }

    /// Alle Lanes nach ID sortiert
    pub fn sorted_lanes(&self) -> Vec<&Lane> {
        let mut lanes: Vec<&Lane> = self.lanes.values().collect();
        lanes.sort_by_key(|l| l.id);
        lanes
    }

    /// Alle Node-IDs aufsteigend sortiert
    pub fn sorted_node_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Fügt eine Kreuzung hinzu. Alle beteiligten Nodes müssen existieren.
    pub fn add_crossing(&mut self, crossing: StreetCrossing) -> Result<()> {
        if let Some(missing) = crossing
            .node_ids
            .iter()
            .find(|id| !self.nodes.contains_key(id))
        {
            bail!(
                "Kreuzung {} verweist auf fehlenden Node {}",
                crossing.id,
                missing
            );
        }
        self.crossings.push(crossing);
        Ok(())
    }

    /// Alle Kreuzungen
    pub fn crossings(&self) -> &[StreetCrossing] {
        &self.crossings
    }

    /// Berechnet die nächste freie Node-ID (größte ID + 1)
    pub fn next_node_id(&self) -> Result<u64> {
        id_after(self.nodes.keys().max().copied(), "Node")
    }

    /// Berechnet die nächste freie Lane-ID
    pub fn next_lane_id(&self) -> Result<u64> {
        id_after(self.lanes.keys().max().copied(), "Lane")
    }

    /// Berechnet die nächste freie Kreuzungs-ID
    pub fn next_crossing_id(&self) -> Result<u64> {
        id_after(self.crossings.iter().map(|c| c.id).max(), "Kreuzungs")
    }

    /// Gibt die Anzahl der Nodes zurück
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Gibt die Anzahl der Lanes zurück
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Gibt die Anzahl der Kreuzungen zurück
    pub fn crossing_count(&self) -> usize {
        self.crossings.len()
    }

    /// `true`, wenn die Welt weder Nodes noch Lanes enthält
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.lanes.is_empty()
    }

    /// Aktualisiert die Länge aller Lanes
    pub fn rebuild_lane_geometry(&mut self) {
        let nodes = &self.nodes;
        for lane in self.lanes.values_mut() {
            if let (Some(s), Some(e)) = (nodes.get(&lane.start_id), nodes.get(&lane.end_id)) {
                lane.update_geometry(s.position, e.position);
            }
        }
    }

    fn rebuild_lane_geometry_of(&mut self, node_id: u64) {
        let nodes = &self.nodes;
        for lane in self.lanes.values_mut().filter(|l| l.touches(node_id)) {
            if let (Some(s), Some(e)) = (nodes.get(&lane.start_id), nodes.get(&lane.end_id)) {
                lane.update_geometry(s.position, e.position);
            }
        }
    }

    /// Zugriff auf den persistenten Spatial-Index
    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.spatial_index
    }

    /// Baut den persistenten Spatial-Index aus den aktuellen Nodes neu auf.
    pub fn rebuild_spatial_index(&mut self) {
        self.spatial_index =
            SpatialIndex::from_points(self.nodes.values().map(|n| (n.id, n.position)));
    }

    /// Findet den nächstgelegenen Node zur Weltposition.
    pub fn nearest_node(&self, query: Vec2) -> Option<SpatialMatch> {
        self.spatial_index.nearest(query)
    }

    /// Findet alle Nodes innerhalb eines Radius.
    pub fn nodes_within_radius(&self, query: Vec2, radius: f32) -> Vec<SpatialMatch> {
        self.spatial_index.within_radius(query, radius)
    }

    /// Node-IDs innerhalb eines Rechtecks (Ecken in beliebiger Reihenfolge), aufsteigend
    pub fn nodes_within_rect(&self, min: Vec2, max: Vec2) -> Vec<u64> {
        self.spatial_index.within_bounds(&WorldBounds::new(min, max))
    }

    /// Setzt die Bounds auf die Hülle aller Nodes (leere Welt: unverändert)
    pub fn recompute_bounds(&mut self) {
        if let Some(bounds) = WorldBounds::enclosing(self.nodes.values().map(|n| n.position)) {
            self.bounds = bounds;
        }
    }

    /// Vergleicht Topologie und Geometrie zweier Lane-Welten.
    ///
    /// Lane-Längen werden nicht verglichen, sie sind aus den Positionen abgeleitet.
    pub fn structurally_equal(&self, other: &TrafficLaneWorld) -> bool {
        if self.map_name != other.map_name
            || self.bounds != other.bounds
            || self.nodes != other.nodes
            || self.lanes.len() != other.lanes.len()
            || self.crossings != other.crossings
        {
            return false;
        }

        self.lanes.iter().all(|(id, lane)| {
            other.lanes.get(id).is_some_and(|o| {
                o.start_id == lane.start_id
                    && o.end_id == lane.end_id
                    && o.direction == lane.direction
                    && o.flags == lane.flags
                    && o.width == lane.width
            })
        })
    }

    /// Kennzahlen der Lane-Welt
    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            node_count: self.node_count(),
            lane_count: self.lane_count(),
            crossing_count: self.crossing_count(),
            total_lane_length: self.lanes.values().map(|l| l.length).sum(),
            blocked_lanes: self
                .lanes
                .values()
                .filter(|l| l.flags.contains(super::LaneFlags::BLOCKED))
                .count(),
        }
    }
}

fn id_after(max: Option<u64>, kind: &str) -> Result<u64> {
    match max {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| anyhow!("{}-IDs erschöpft: {} ist bereits vergeben", kind, max)),
    }
}

impl Default for TrafficLaneWorld {
    fn default() -> Self {
        Self::new(WorldBounds::default())
    }
}
