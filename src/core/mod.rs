//! Core-Domänentypen: Lane-Nodes, Lanes, Kreuzungen, Lane-Welt, Spatial-Index.

pub mod bounds;
pub mod crossing;
pub mod lane;
/// Core-Datenmodelle der Lane-Navigation
///
/// - TrafficLaneWorld: Container für alle Nodes, Lanes und Kreuzungen
/// - LaneNode: Knoten mit Position
/// - Lane: Spur zwischen zwei Nodes
pub mod lane_node;
pub mod spatial;
pub mod traffic_lane_world;
pub mod world_model;

pub use bounds::WorldBounds;
pub use crossing::StreetCrossing;
pub use lane::{Lane, LaneDirection, LaneFlags};
pub use lane_node::LaneNode;
pub use spatial::{SpatialIndex, SpatialMatch};
pub use traffic_lane_world::{TrafficLaneWorld, WorldSummary};
pub use world_model::{WorldModel, WorldModelKind};
