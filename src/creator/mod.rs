//! Erzeugung von Lane-Welten aus Kollisionsformen einer Map.

pub mod distance_field;
pub mod grid;
pub mod lane_graph;
pub mod merge;
pub mod scene;
pub mod segments;
pub mod settings;
pub mod validation;
pub mod voronoi_creator;

pub use distance_field::{DistanceField, MedialCell};
pub use grid::{ObstacleGrid, ObstacleLabel, RasterStats};
pub use lane_graph::{build_lane_graph, LaneGraph, LaneGraphEdge, LaneGraphStats};
pub use merge::{merge_lane_worlds, MergeResult};
pub use scene::{CollisionEntity, MapScene, ObstacleShape};
pub use segments::{trace_segments, Segment};
pub use settings::{HeightRange, LaneWorldCreationSettings, TurningConstraintSettings};
pub use validation::{
    validate_turning_constraints, TurningViolation, TurningViolationKind, ValidationReport,
};
pub use voronoi_creator::{CreatedLaneWorld, CreationReport, VoronoiLaneWorldCreator};
