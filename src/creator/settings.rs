//! Einstellungen der Lane-Welt-Erzeugung.

use serde::{Deserialize, Serialize};

use crate::core::{LaneFlags, WorldBounds};
use crate::shared::options::{
    CONNECTION_RADIUS, DEFAULT_CELL_SIZE, MAX_LANE_WIDTH, MAX_TURN_ANGLE_DEG, MIN_CLEARANCE,
    MIN_LANE_LENGTH, MIN_LANE_WIDTH, MIN_SEGMENT_CELLS, NODE_SPACING_CELLS, STITCH_RADIUS,
};

/// Vertikaler Bereich (Y-Achse) eines Hindernisses oder Filters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    /// Unterkante
    pub min: f32,
    /// Oberkante
    pub max: f32,
}

impl HeightRange {
    /// Erstellt einen Bereich (Reihenfolge egal)
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Überlappen sich die Bereiche (Ränder inklusive)?
    pub fn overlaps(&self, other: &HeightRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// Abbiege-Vorgaben für die Validierung (Vorschau-Qualität)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurningConstraintSettings {
    /// Maximale Richtungsänderung an einem Node in Grad (0 = geradeaus)
    pub max_turn_angle_deg: f32,
    /// Minimale Lane-Länge
    pub min_lane_length: f32,
    /// Minimale Lane-Breite
    pub min_lane_width: f32,
}

impl Default for TurningConstraintSettings {
    fn default() -> Self {
        Self {
            max_turn_angle_deg: MAX_TURN_ANGLE_DEG,
            min_lane_length: MIN_LANE_LENGTH,
            min_lane_width: MIN_LANE_WIDTH,
        }
    }
}

/// Alle Parameter der Rasterung, Segment-Extraktion und Lane-Verknüpfung
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneWorldCreationSettings {
    /// Kantenlänge einer Rasterzelle in Welteinheiten
    pub cell_size: f32,
    /// Rasterrand als Hindernis behandeln (Map-Grenze)
    #[serde(default)]
    pub border_as_obstacle: bool,
    /// Minimaler Abstand einer Lane zum nächsten Hindernis (Welteinheiten)
    pub min_clearance: f32,
    /// Segmente mit weniger Zellen werden verworfen
    pub min_segment_cells: usize,
    /// Abstand zwischen Lane-Nodes entlang eines Segments (in Zellen)
    pub node_spacing_cells: usize,
    /// Segment-Endpunkte innerhalb dieses Radius werden verbunden
    pub connection_radius: f32,
    /// Flags der erzeugten Lanes
    #[serde(default = "default_lane_flags")]
    pub default_lane_flags: LaneFlags,
    /// Obergrenze der Lane-Breite
    pub max_lane_width: f32,
    /// Suchradius beim Zusammenfügen zweier Lane-Welten
    #[serde(default = "default_stitch_radius")]
    pub stitch_radius: f32,
    /// Gerasterter Weltbereich
    pub bounds: WorldBounds,
    /// Nur Hindernisse, deren Höhe diesen Bereich schneidet, werden gerastert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_filter: Option<HeightRange>,
    /// Abbiege-Vorgaben für die Validierung
    #[serde(default)]
    pub turning: TurningConstraintSettings,
}

fn default_lane_flags() -> LaneFlags {
    LaneFlags::VEHICLE | LaneFlags::PEDESTRIAN
}

fn default_stitch_radius() -> f32 {
    STITCH_RADIUS
}

impl Default for LaneWorldCreationSettings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            border_as_obstacle: false,
            min_clearance: MIN_CLEARANCE,
            min_segment_cells: MIN_SEGMENT_CELLS,
            node_spacing_cells: NODE_SPACING_CELLS,
            connection_radius: CONNECTION_RADIUS,
            default_lane_flags: default_lane_flags(),
            max_lane_width: MAX_LANE_WIDTH,
            stitch_radius: STITCH_RADIUS,
            bounds: WorldBounds::default(),
            height_filter: None,
            turning: TurningConstraintSettings::default(),
        }
    }
}

impl LaneWorldCreationSettings {
    /// Einstellungen für einen bestimmten Weltbereich, sonst Standardwerte
    pub fn for_bounds(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Mindestabstand in Zelleinheiten
    pub fn min_clearance_cells(&self) -> f32 {
        self.min_clearance / self.cell_size
    }
}
