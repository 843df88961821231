//! A*-Pfadsuche auf dem Lane-Graphen, gestützt auf einen statischen Suchraum.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec2;

use super::search_space::{StateIndex, StaticSearchSpace};
use crate::core::{LaneFlags, SpatialIndex, TrafficLaneWorld};
use crate::shared::options::{PATHFINDER_MAX_EXPANSIONS, PATHFINDER_SNAP_RADIUS};

/// Anforderungen eines Akteurs an die benutzbaren Lanes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathRequest {
    /// Lane muss mindestens eines dieser Flags tragen
    pub allowed: LaneFlags,
    /// Minimale Lane-Breite
    pub min_width: f32,
}

impl PathRequest {
    /// Anforderung für Fahrzeuge
    pub fn vehicle(min_width: f32) -> Self {
        Self {
            allowed: LaneFlags::VEHICLE,
            min_width,
        }
    }

    /// Anforderung für Fußgänger
    pub fn pedestrian() -> Self {
        Self {
            allowed: LaneFlags::PEDESTRIAN,
            min_width: 0.0,
        }
    }

    /// Anforderung für Einsatzfahrzeuge (dürfen auch Einsatz-Lanes benutzen)
    pub fn emergency_vehicle(min_width: f32) -> Self {
        Self {
            allowed: LaneFlags::VEHICLE | LaneFlags::EMERGENCY_ONLY,
            min_width,
        }
    }

    fn accepts(&self, flags: LaneFlags, width: f32) -> bool {
        if flags.contains(LaneFlags::BLOCKED) {
            return false;
        }
        if flags.contains(LaneFlags::EMERGENCY_ONLY)
            && !self.allowed.contains(LaneFlags::EMERGENCY_ONLY)
        {
            return false;
        }
        flags.intersects(self.allowed) && width >= self.min_width
    }
}

/// Ergebnis einer Pfadsuche
#[derive(Debug, Clone, PartialEq)]
pub struct LanePath {
    /// Besuchte Nodes vom Start bis zum Ziel
    pub node_ids: Vec<u64>,
    /// Benutzte Lanes (eine weniger als Nodes)
    pub lane_ids: Vec<u64>,
    /// Gesamtlänge
    pub length: f32,
}

/// Zustand eines Nodes während der Suche
#[derive(Debug, Clone, Default)]
pub struct LaneSearchState {
    /// Suchdurchlauf, in dem der Zustand zuletzt beschrieben wurde
    generation: u32,
    /// Kosten vom Start
    g: f32,
    /// Vorgänger im Suchbaum
    parent: Option<StateIndex>,
    /// Lane vom Vorgänger zu diesem Node
    via_lane: Option<u64>,
    /// Bereits expandiert
    closed: bool,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    to: usize,
    lane_id: u64,
    length: f32,
    flags: LaneFlags,
    width: f32,
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f32,
    g: f32,
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-Heap: kleineres f zuerst, bei Gleichstand kleinerer Index
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pfadsuche über einer festen Lane-Welt.
///
/// Der Suchraum wird einmal pro Lane-Welt angelegt; Anfragen setzen ihn über
/// einen Generationszähler zurück statt ihn zu leeren. Zustand `i` gehört zum
/// Node in Slot `i` des Spatial-Index.
pub struct LanePathfinder {
    outgoing: Vec<Vec<Edge>>,
    incoming: Vec<Vec<Edge>>,
    spatial_index: SpatialIndex,
    space: StaticSearchSpace<LaneSearchState>,
    generation: u32,
    max_expansions: usize,
    snap_radius: f32,
}

impl LanePathfinder {
    /// Baut Adjazenz und Suchraum für die Lane-Welt auf
    pub fn new(world: &TrafficLaneWorld) -> Self {
        let spatial_index = world.spatial_index().clone();
        let node_count = spatial_index.len();

        let mut outgoing = vec![Vec::new(); node_count];
        let mut incoming = vec![Vec::new(); node_count];
        for lane in world.sorted_lanes() {
            let (Some(s), Some(e)) = (
                spatial_index.slot_of(lane.start_id),
                spatial_index.slot_of(lane.end_id),
            ) else {
                continue;
            };
            let edge = |to: usize| Edge {
                to,
                lane_id: lane.id,
                length: lane.length,
                flags: lane.flags,
                width: lane.width,
            };
            if lane.direction.allows_forward() {
                outgoing[s].push(edge(e));
                incoming[e].push(edge(s));
            }
            if lane.direction.allows_backward() {
                outgoing[e].push(edge(s));
                incoming[s].push(edge(e));
            }
        }

        log::debug!(
            "Pfadsuche vorbereitet: {} Nodes, {} Lanes",
            node_count,
            world.lane_count()
        );

        Self {
            space: StaticSearchSpace::new(node_count),
            outgoing,
            incoming,
            spatial_index,
            generation: 0,
            max_expansions: PATHFINDER_MAX_EXPANSIONS,
            snap_radius: PATHFINDER_SNAP_RADIUS,
        }
    }

    /// Setzt das Expansionslimit pro Anfrage
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Setzt den Einrast-Radius für positionsbasierte Anfragen
    pub fn with_snap_radius(mut self, snap_radius: f32) -> Self {
        self.snap_radius = snap_radius;
        self
    }

    /// Anzahl der Nodes im Suchraum
    pub fn node_count(&self) -> usize {
        self.spatial_index.len()
    }

    /// Sucht den kürzesten Pfad zwischen zwei Nodes.
    ///
    /// `None`, wenn ein Node fehlt, kein Pfad existiert oder das
    /// Expansionslimit erreicht wird.
    pub fn find_path(
        &mut self,
        start_id: u64,
        goal_id: u64,
        request: &PathRequest,
    ) -> Option<LanePath> {
        let start = self.spatial_index.slot_of(start_id)?;
        let goal = self.spatial_index.slot_of(goal_id)?;
        let positions = self.spatial_index.positions();

        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.space.reset();
            self.generation = 1;
        }
        let generation = self.generation;
        let goal_pos = positions[goal];

        {
            let state = self.space.state_mut(start).ok()?;
            *state = LaneSearchState {
                generation,
                ..LaneSearchState::default()
            };
        }

        let mut open = BinaryHeap::new();
        open.push(OpenEntry {
            f: positions[start].distance(goal_pos),
            g: 0.0,
            index: start,
        });

        let mut expansions = 0usize;
        while let Some(entry) = open.pop() {
            {
                let state = self.space.state_mut(entry.index).ok()?;
                if state.closed || entry.g > state.g {
                    continue;
                }
                state.closed = true;
            }

            if entry.index == goal {
                return self.reconstruct(goal);
            }

            expansions += 1;
            if expansions > self.max_expansions {
                log::debug!(
                    "Pfadsuche {} -> {} abgebrochen: Expansionslimit {} erreicht",
                    start_id,
                    goal_id,
                    self.max_expansions
                );
                return None;
            }

            let parent = self.space.handle(entry.index).ok()?;
            for edge in &self.outgoing[entry.index] {
                if !request.accepts(edge.flags, edge.width) {
                    continue;
                }
                let tentative = entry.g + edge.length;
                let neighbor = self.space.state_mut(edge.to).ok()?;
                if neighbor.generation != generation {
                    *neighbor = LaneSearchState {
                        generation,
                        g: f32::INFINITY,
                        ..LaneSearchState::default()
                    };
                }
                if neighbor.closed || tentative >= neighbor.g {
                    continue;
                }
                neighbor.g = tentative;
                neighbor.parent = Some(parent);
                neighbor.via_lane = Some(edge.lane_id);
                open.push(OpenEntry {
                    f: tentative + positions[edge.to].distance(goal_pos),
                    g: tentative,
                    index: edge.to,
                });
            }
        }

        None
    }

    /// Sucht einen Pfad zwischen zwei Weltpositionen.
    ///
    /// Start und Ziel rasten auf den nächsten Node ein, der eine für die
    /// Anfrage benutzbare Lane hat.
    pub fn find_path_between(
        &mut self,
        start: Vec2,
        goal: Vec2,
        request: &PathRequest,
    ) -> Option<LanePath> {
        let start_node = self
            .spatial_index
            .nearest_matching(start, self.snap_radius, |hit| {
                has_usable_lane(&self.outgoing, hit.slot, request)
            })?;
        let goal_node = self
            .spatial_index
            .nearest_matching(goal, self.snap_radius, |hit| {
                has_usable_lane(&self.incoming, hit.slot, request)
            })?;
        self.find_path(start_node.node_id, goal_node.node_id, request)
    }

    fn reconstruct(&self, goal: usize) -> Option<LanePath> {
        let mut node_ids = Vec::new();
        let mut lane_ids = Vec::new();
        let mut current = self.space.state(goal).ok()?;
        let length = current.g;

        loop {
            // Zustände stammen aus dem eigenen Suchraum, der ungeprüfte Rückweg ist gültig
            let index = self.space.index_of(current);
            node_ids.push(self.spatial_index.node_ids()[index]);
            if let Some(lane_id) = current.via_lane {
                lane_ids.push(lane_id);
            }
            match current.parent {
                Some(parent) => current = self.space.get(parent)?,
                None => break,
            }
        }

        node_ids.reverse();
        lane_ids.reverse();
        Some(LanePath {
            node_ids,
            lane_ids,
            length,
        })
    }
}

fn has_usable_lane(edges: &[Vec<Edge>], slot: usize, request: &PathRequest) -> bool {
    edges
        .get(slot)
        .is_some_and(|edges| edges.iter().any(|e| request.accepts(e.flags, e.width)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Lane, LaneDirection, LaneNode};
    use approx::assert_relative_eq;

    fn add_lane(
        world: &mut TrafficLaneWorld,
        id: u64,
        s: u64,
        e: u64,
        dir: LaneDirection,
        flags: LaneFlags,
    ) {
        world
            .add_lane(Lane::new(id, s, e, dir, flags, 3.0, Vec2::ZERO, Vec2::ZERO))
            .expect("Lane erwartet");
    }

    /// Quadrat 1-2-3-4 mit Diagonale 1-3 (nur Fußgänger)
    fn square_world() -> TrafficLaneWorld {
        let mut world = TrafficLaneWorld::default();
        world.extend_nodes([
            LaneNode::new(1, Vec2::new(0.0, 0.0)),
            LaneNode::new(2, Vec2::new(10.0, 0.0)),
            LaneNode::new(3, Vec2::new(10.0, 10.0)),
            LaneNode::new(4, Vec2::new(0.0, 10.0)),
        ]);
        let both = LaneFlags::VEHICLE | LaneFlags::PEDESTRIAN;
        add_lane(&mut world, 1, 1, 2, LaneDirection::Dual, both);
        add_lane(&mut world, 2, 2, 3, LaneDirection::Dual, both);
        add_lane(&mut world, 3, 3, 4, LaneDirection::Dual, both);
        add_lane(&mut world, 4, 4, 1, LaneDirection::Dual, both);
        add_lane(&mut world, 5, 1, 3, LaneDirection::Dual, LaneFlags::PEDESTRIAN);
        world
    }

    #[test]
    fn test_pedestrian_uses_diagonal() {
        let world = square_world();
        let mut finder = LanePathfinder::new(&world);

        let path = finder
            .find_path(1, 3, &PathRequest::pedestrian())
            .expect("Pfad erwartet");
        assert_eq!(path.node_ids, vec![1, 3]);
        assert_eq!(path.lane_ids, vec![5]);
        assert_relative_eq!(path.length, 200.0f32.sqrt(), epsilon = 1e-4);
    }

    #[test]
    fn test_vehicle_avoids_pedestrian_lane() {
        let world = square_world();
        let mut finder = LanePathfinder::new(&world);

        let path = finder
            .find_path(1, 3, &PathRequest::vehicle(0.0))
            .expect("Pfad erwartet");
        assert_eq!(path.node_ids.len(), 3);
        assert_eq!(path.node_ids.first(), Some(&1));
        assert_eq!(path.node_ids.last(), Some(&3));
        assert_relative_eq!(path.length, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_blocked_and_one_way_lanes() {
        let mut world = TrafficLaneWorld::default();
        world.extend_nodes([
            LaneNode::new(1, Vec2::new(0.0, 0.0)),
            LaneNode::new(2, Vec2::new(5.0, 0.0)),
            LaneNode::new(3, Vec2::new(10.0, 0.0)),
        ]);
        add_lane(&mut world, 1, 1, 2, LaneDirection::Regular, LaneFlags::VEHICLE);
        add_lane(&mut world, 2, 2, 3, LaneDirection::Reverse, LaneFlags::VEHICLE);
        let mut finder = LanePathfinder::new(&world);
        let request = PathRequest::vehicle(0.0);

        // 1 -> 2 erlaubt, 2 -> 3 nur rückwärts
        assert!(finder.find_path(1, 2, &request).is_some());
        assert!(finder.find_path(2, 1, &request).is_none());
        assert!(finder.find_path(1, 3, &request).is_none());
        assert!(finder.find_path(3, 2, &request).is_some());

        if let Some(lane) = world.find_lane_mut(1) {
            lane.flags.insert(LaneFlags::BLOCKED);
        }
        let mut finder = LanePathfinder::new(&world);
        assert!(finder.find_path(1, 2, &request).is_none());
    }

    #[test]
    fn test_emergency_lanes_only_for_emergency_requests() {
        let mut world = TrafficLaneWorld::default();
        world.extend_nodes([
            LaneNode::new(1, Vec2::new(0.0, 0.0)),
            LaneNode::new(2, Vec2::new(5.0, 0.0)),
        ]);
        add_lane(
            &mut world,
            1,
            1,
            2,
            LaneDirection::Dual,
            LaneFlags::VEHICLE | LaneFlags::EMERGENCY_ONLY,
        );
        let mut finder = LanePathfinder::new(&world);

        assert!(finder.find_path(1, 2, &PathRequest::vehicle(0.0)).is_none());
        assert!(finder.find_path(1, 2, &PathRequest::pedestrian()).is_none());
        let path = finder
            .find_path(1, 2, &PathRequest::emergency_vehicle(0.0))
            .expect("Pfad erwartet");
        assert_eq!(path.lane_ids, vec![1]);
    }

    #[test]
    fn test_repeated_queries_reuse_search_space() {
        let world = square_world();
        let mut finder = LanePathfinder::new(&world);
        let request = PathRequest::vehicle(0.0);

        let first = finder.find_path(2, 4, &request).expect("Pfad erwartet");
        for _ in 0..10 {
            let again = finder.find_path(2, 4, &request).expect("Pfad erwartet");
            assert_eq!(again, first);
        }
        let trivial = finder.find_path(2, 2, &request).expect("Pfad erwartet");
        assert_eq!(trivial.node_ids, vec![2]);
        assert!(trivial.lane_ids.is_empty());
    }

    #[test]
    fn test_min_width_and_expansion_limit() {
        let world = square_world();
        let mut finder = LanePathfinder::new(&world);
        assert!(finder.find_path(1, 3, &PathRequest::vehicle(5.0)).is_none());

        let mut limited = LanePathfinder::new(&world).with_max_expansions(0);
        assert!(limited.find_path(1, 3, &PathRequest::vehicle(0.0)).is_none());
        assert!(finder.find_path(1, 99, &PathRequest::vehicle(0.0)).is_none());
    }

    #[test]
    fn test_find_path_between_positions() {
        let world = square_world();
        let mut finder = LanePathfinder::new(&world).with_snap_radius(3.0);

        let path = finder
            .find_path_between(
                Vec2::new(0.5, 0.5),
                Vec2::new(9.0, 9.5),
                &PathRequest::pedestrian(),
            )
            .expect("Pfad erwartet");
        assert_eq!(path.node_ids, vec![1, 3]);

        assert!(finder
            .find_path_between(Vec2::new(50.0, 50.0), Vec2::ZERO, &PathRequest::pedestrian())
            .is_none());
    }
}
