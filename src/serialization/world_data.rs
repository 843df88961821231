//! Formatunabhängige Rohform einer Lane-Welt.
//!
//! Binär- und JSON-Format lesen zuerst in diese Rohform. Die Prüfung auf
//! doppelte IDs und hängende Verweise passiert beim Zusammenbau, für beide
//! Formate gleich.

use glam::Vec2;
use std::collections::HashSet;

use super::error::SerializationError;
use crate::core::{
    Lane, LaneDirection, LaneFlags, LaneNode, StreetCrossing, TrafficLaneWorld, WorldBounds,
};

/// Ab dieser Version sind alle Lane-Flag-Bits belegt
pub const FULL_FLAGS_VERSION: u32 = 3;

/// Lane in Rohform
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RawLane {
    pub id: u64,
    pub start_id: u64,
    pub end_id: u64,
    pub direction: LaneDirection,
    pub width: f32,
    pub flags: u32,
}

/// Lane-Welt in Rohform, Elemente nach ID sortiert
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct WorldData {
    pub map_name: Option<String>,
    pub bounds: WorldBounds,
    pub nodes: Vec<(u64, Vec2)>,
    pub lanes: Vec<RawLane>,
    pub crossings: Vec<StreetCrossing>,
}

impl WorldData {
    /// Rohform einer bestehenden Welt (deterministische Reihenfolge)
    pub fn from_world(world: &TrafficLaneWorld) -> Self {
        let nodes = world
            .sorted_node_ids()
            .into_iter()
            .filter_map(|id| world.node(id).map(|n| (id, n.position)))
            .collect();
        let lanes = world
            .sorted_lanes()
            .into_iter()
            .map(|l| RawLane {
                id: l.id,
                start_id: l.start_id,
                end_id: l.end_id,
                direction: l.direction,
                width: l.width,
                flags: l.flags.bits(),
            })
            .collect();
        Self {
            map_name: world.map_name.clone(),
            bounds: world.bounds,
            nodes,
            lanes,
            crossings: world.crossings().to_vec(),
        }
    }

    /// Prüft die Rohdaten und baut die Lane-Welt.
    ///
    /// Dateien vor [`FULL_FLAGS_VERSION`] kannten nur die beiden unteren
    /// Flag-Bits, höhere Bits werden dort verworfen.
    pub fn into_world(self, version: u32) -> Result<TrafficLaneWorld, SerializationError> {
        let values = [
            self.bounds.min_x,
            self.bounds.min_z,
            self.bounds.max_x,
            self.bounds.max_z,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SerializationError::malformed("Weltbereich nicht endlich"));
        }

        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for (id, position) in &self.nodes {
            if !node_ids.insert(*id) {
                return Err(SerializationError::malformed(format!("Node-ID {id} doppelt")));
            }
            if !position.is_finite() {
                return Err(SerializationError::malformed(format!(
                    "Node {id} hat keine endliche Position"
                )));
            }
        }

        let mut world = TrafficLaneWorld::new(self.bounds);
        world.map_name = self.map_name;
        world.extend_nodes(self.nodes.iter().map(|(id, p)| LaneNode::new(*id, *p)));

        let flag_mask = if version < FULL_FLAGS_VERSION {
            LaneFlags::LEGACY_MASK
        } else {
            LaneFlags::ALL
        };
        let mut lane_ids = HashSet::with_capacity(self.lanes.len());
        for raw in &self.lanes {
            if !lane_ids.insert(raw.id) {
                return Err(SerializationError::malformed(format!(
                    "Lane-ID {} doppelt",
                    raw.id
                )));
            }
            if !raw.width.is_finite() || raw.width < 0.0 {
                return Err(SerializationError::malformed(format!(
                    "Lane {} hat ungueltige Breite {}",
                    raw.id, raw.width
                )));
            }
            let (Some(start), Some(end)) = (
                world.node(raw.start_id).map(|n| n.position),
                world.node(raw.end_id).map(|n| n.position),
            ) else {
                return Err(SerializationError::malformed(format!(
                    "Lane {} verweist auf fehlenden Node",
                    raw.id
                )));
            };
            let flags = LaneFlags::from_bits_truncate(raw.flags).intersection(flag_mask);
            world
                .add_lane(Lane::new(
                    raw.id,
                    raw.start_id,
                    raw.end_id,
                    raw.direction,
                    flags,
                    raw.width,
                    start,
                    end,
                ))
                .map_err(|e| SerializationError::malformed(e.to_string()))?;
        }

        let mut crossing_ids = HashSet::with_capacity(self.crossings.len());
        for crossing in self.crossings {
            if !crossing_ids.insert(crossing.id) {
                return Err(SerializationError::malformed(format!(
                    "Kreuzungs-ID {} doppelt",
                    crossing.id
                )));
            }
            if !crossing.center.is_finite() {
                return Err(SerializationError::malformed(format!(
                    "Kreuzung {} hat keinen endlichen Mittelpunkt",
                    crossing.id
                )));
            }
            world
                .add_crossing(crossing)
                .map_err(|e| SerializationError::malformed(e.to_string()))?;
        }

        Ok(world)
    }
}
