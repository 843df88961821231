//! Basis-Typ aller Navigations-Weltmodelle.

use super::TrafficLaneWorld;
use std::fmt;

/// Art eines Weltmodells (wird beim Laden/Speichern protokolliert)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldModelKind {
    /// Lane-Graph für Verkehr und Fußgänger
    TrafficLanes,
}

impl fmt::Display for WorldModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldModelKind::TrafficLanes => write!(f, "TrafficLaneWorld"),
        }
    }
}

/// Ein geladenes oder erzeugtes Weltmodell. Besitzt seine Daten exklusiv.
#[derive(Debug, Clone)]
pub enum WorldModel {
    /// Lane-Welt
    TrafficLanes(TrafficLaneWorld),
}

impl WorldModel {
    /// Art des Modells
    pub fn kind(&self) -> WorldModelKind {
        match self {
            WorldModel::TrafficLanes(_) => WorldModelKind::TrafficLanes,
        }
    }

    /// Lane-Welt, falls das Modell eine ist
    pub fn as_traffic_lane_world(&self) -> Option<&TrafficLaneWorld> {
        match self {
            WorldModel::TrafficLanes(world) => Some(world),
        }
    }

    /// Übernimmt die Lane-Welt aus dem Modell
    pub fn into_traffic_lane_world(self) -> Option<TrafficLaneWorld> {
        match self {
            WorldModel::TrafficLanes(world) => Some(world),
        }
    }
}

impl From<TrafficLaneWorld> for WorldModel {
    fn from(world: TrafficLaneWorld) -> Self {
        WorldModel::TrafficLanes(world)
    }
}
