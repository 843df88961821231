//! JSON-Format für `TrafficLaneWorld` (lesbar, für Tests und Handarbeit).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::binary::TrafficLaneWorldBinarySerializer;
use super::error::SerializationError;
use super::world_data::{RawLane, WorldData};
use crate::core::{LaneDirection, StreetCrossing, TrafficLaneWorld, WorldBounds, WorldModelKind};

#[derive(Debug, Serialize, Deserialize)]
struct LaneWorldDocument {
    format: String,
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    map_name: Option<String>,
    bounds: WorldBounds,
    #[serde(default)]
    nodes: Vec<NodeDto>,
    #[serde(default)]
    lanes: Vec<LaneDto>,
    #[serde(default)]
    crossings: Vec<CrossingDto>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeDto {
    id: u64,
    x: f32,
    z: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct LaneDto {
    id: u64,
    start: u64,
    end: u64,
    direction: LaneDirection,
    width: f32,
    #[serde(default)]
    flags: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CrossingDto {
    id: u64,
    center: [f32; 2],
    nodes: Vec<u64>,
}

/// Nur die Kopfdaten, um Format und Version vor dem Vollimport zu prüfen
#[derive(Debug, Deserialize)]
struct DocumentHeader {
    format: String,
    version: u32,
}

/// JSON-(De-)Serialisierer, gleiche Versionsregeln wie das Binärformat
pub struct TrafficLaneWorldJsonSerializer;

impl TrafficLaneWorldJsonSerializer {
    /// Serialisiert als formatiertes JSON in der aktuellen Version
    pub fn serialize(world: &TrafficLaneWorld) -> Result<Vec<u8>, SerializationError> {
        let data = WorldData::from_world(world);
        let document = LaneWorldDocument {
            format: WorldModelKind::TrafficLanes.to_string(),
            version: TrafficLaneWorldBinarySerializer::CURRENT_VERSION,
            map_name: data.map_name,
            bounds: data.bounds,
            nodes: data
                .nodes
                .iter()
                .map(|(id, p)| NodeDto {
                    id: *id,
                    x: p.x,
                    z: p.y,
                })
                .collect(),
            lanes: data
                .lanes
                .iter()
                .map(|l| LaneDto {
                    id: l.id,
                    start: l.start_id,
                    end: l.end_id,
                    direction: l.direction,
                    width: l.width,
                    flags: l.flags,
                })
                .collect(),
            crossings: data
                .crossings
                .iter()
                .map(|c| CrossingDto {
                    id: c.id,
                    center: c.center.to_array(),
                    nodes: c.node_ids.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_vec_pretty(&document)?)
    }

    /// Liest eine Lane-Welt und die gespeicherte Version
    pub fn deserialize(bytes: &[u8]) -> Result<(TrafficLaneWorld, u32), SerializationError> {
        let header: DocumentHeader = serde_json::from_slice(bytes)?;
        if header.format != WorldModelKind::TrafficLanes.to_string() {
            log::warn!("Unbekannter Modelltyp im JSON: '{}'", header.format);
            return Err(SerializationError::UnknownFormat);
        }
        let version = header.version;
        if !(TrafficLaneWorldBinarySerializer::MIN_SUPPORTED_VERSION
            ..=TrafficLaneWorldBinarySerializer::CURRENT_VERSION)
            .contains(&version)
        {
            return Err(SerializationError::UnsupportedVersion {
                found: version,
                min: TrafficLaneWorldBinarySerializer::MIN_SUPPORTED_VERSION,
                max: TrafficLaneWorldBinarySerializer::CURRENT_VERSION,
            });
        }

        let document: LaneWorldDocument = serde_json::from_slice(bytes)?;
        let data = WorldData {
            map_name: document.map_name,
            bounds: document.bounds,
            nodes: document
                .nodes
                .into_iter()
                .map(|n| (n.id, Vec2::new(n.x, n.z)))
                .collect(),
            lanes: document
                .lanes
                .into_iter()
                .map(|l| RawLane {
                    id: l.id,
                    start_id: l.start,
                    end_id: l.end,
                    direction: l.direction,
                    width: l.width,
                    flags: l.flags,
                })
                .collect(),
            crossings: document
                .crossings
                .into_iter()
                .map(|c| StreetCrossing::new(c.id, Vec2::from_array(c.center), c.nodes))
                .collect(),
        };
        Ok((data.into_world(version)?, version))
    }
}
