/// Straßenkreuzung: Bereich, in dem sich mehrere Lane-Nodes treffen.
/// Entsteht beim Zusammenfügen zweier Lane-Welten.
use glam::Vec2;

/// Beschreibt eine Straßenkreuzung in der Lane-Welt.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetCrossing {
    /// Kreuzungs-ID
    pub id: u64,
    /// Mittelpunkt der Kreuzung
    pub center: Vec2,
    /// Beteiligte Nodes
    pub node_ids: Vec<u64>,
}

impl StreetCrossing {
    /// Erstellt eine neue Kreuzung
    pub fn new(id: u64, center: Vec2, node_ids: Vec<u64>) -> Self {
        Self {
            id,
            center,
            node_ids,
        }
    }
}
