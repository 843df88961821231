//! Suchraum und Pfadsuche auf dem Lane-Graphen.

pub mod pathfinder;
pub mod search_space;

pub use pathfinder::{LanePath, LanePathfinder, LaneSearchState, PathRequest};
pub use search_space::{SearchSpaceError, StateIndex, StaticSearchSpace};
