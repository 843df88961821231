//! Knoten des Lane-Graphen.

use glam::Vec2;

/// Ein Knoten im Lane-Graphen (Spurende, Abzweigung oder Zwischenpunkt)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneNode {
    /// Node-ID
    pub id: u64,
    /// Position in der X/Z-Ebene
    pub position: Vec2,
}

impl LaneNode {
    /// Erstellt einen neuen Node
    pub fn new(id: u64, position: Vec2) -> Self {
        Self { id, position }
    }
}
