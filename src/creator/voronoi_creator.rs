//! Erzeugung einer Lane-Welt über die Voronoi-Mittelachse freier Flächen.

use anyhow::{bail, Result};
use std::path::Path;

use super::distance_field::{DistanceField, MedialCell};
use super::grid::{ObstacleGrid, RasterStats};
use super::lane_graph::{build_lane_graph, LaneGraphStats};
use super::merge::{merge_lane_worlds, MergeResult};
use super::scene::MapScene;
use super::segments::trace_segments;
use super::settings::LaneWorldCreationSettings;
use super::validation::{validate_turning_constraints, ValidationReport};
use crate::core::TrafficLaneWorld;

/// Bericht über einen Erzeugungslauf
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreationReport {
    /// Rasterbreite in Zellen
    pub grid_width: usize,
    /// Rasterhöhe in Zellen
    pub grid_height: usize,
    /// Kennzahlen der Rasterung
    pub raster: RasterStats,
    /// Anzahl Mittelachsen-Zellen
    pub medial_cells: usize,
    /// Anzahl Segmente nach dem Filtern
    pub segments: usize,
    /// Kennzahlen der Verknüpfung
    pub graph: LaneGraphStats,
    /// Prüfung gegen die Abbiege-Vorgaben
    pub validation: ValidationReport,
    /// Nur bei zusammengeführten Welten
    pub merge: Option<MergeResult>,
}

/// Ergebnis eines Erzeugungslaufs mit Zwischenständen für Debug-Ausgaben
#[derive(Debug, Clone)]
pub struct CreatedLaneWorld {
    /// Die erzeugte Lane-Welt
    pub world: TrafficLaneWorld,
    /// Bericht
    pub report: CreationReport,
    grid: ObstacleGrid,
    medial: Vec<MedialCell>,
}

impl CreatedLaneWorld {
    /// Speichert Raster und Mittelachse als PNG
    pub fn save_debug_image(&self, path: &Path) -> Result<()> {
        let highlight: Vec<usize> = self.medial.iter().map(|c| c.index).collect();
        self.grid.save_debug_image(&highlight, path)
    }
}

/// Erzeugt Lane-Welten aus Map-Szenen
#[derive(Debug, Clone, Default)]
pub struct VoronoiLaneWorldCreator {
    settings: LaneWorldCreationSettings,
}

impl VoronoiLaneWorldCreator {
    /// Erstellt den Creator mit den gegebenen Einstellungen
    pub fn new(settings: LaneWorldCreationSettings) -> Self {
        Self { settings }
    }

    /// Aktive Einstellungen
    pub fn settings(&self) -> &LaneWorldCreationSettings {
        &self.settings
    }

    /// Erzeugt nur die Lane-Welt
    pub fn create_traffic_lane_world(&self, scene: &MapScene) -> Result<TrafficLaneWorld> {
        Ok(self.create_with_report(scene)?.world)
    }

    /// Erzeugt die Lane-Welt samt Bericht.
    ///
    /// Ablauf: Rasterung → Abstandsfeld → Mittelachse → Segmente →
    /// Node-Ketten und Anschlüsse → Lane-Welt → Prüfung.
    /// Eine Szene ohne relevante Hindernisse ergibt eine leere Welt.
    pub fn create_with_report(&self, scene: &MapScene) -> Result<CreatedLaneWorld> {
        self.validate_settings()?;
        let settings = &self.settings;

        let (grid, raster) = ObstacleGrid::rasterize(scene, settings)?;
        let mut report = CreationReport {
            grid_width: grid.width(),
            grid_height: grid.height(),
            raster,
            ..CreationReport::default()
        };

        let field = DistanceField::compute(&grid);
        let medial = field.medial_cells(&grid, settings.min_clearance_cells());
        report.medial_cells = medial.len();

        if raster.obstacle_cells == 0 || medial.is_empty() {
            log::warn!(
                "Keine Mittelachse gefunden ({} belegte Zellen), Lane-Welt bleibt leer",
                raster.obstacle_cells
            );
            let mut world = TrafficLaneWorld::new(settings.bounds);
            world.map_name = scene.name.clone();
            return Ok(CreatedLaneWorld {
                world,
                report,
                grid,
                medial,
            });
        }

        let segments = trace_segments(&grid, &medial, settings.min_segment_cells);
        report.segments = segments.len();

        let (graph, graph_stats) = build_lane_graph(&grid, &segments, settings);
        report.graph = graph_stats;

        let world = graph.into_traffic_lane_world(settings, scene.name.clone())?;
        report.validation = validate_turning_constraints(&world, &settings.turning);

        log::info!(
            "Lane-Welt erzeugt: {} Nodes, {} Lanes aus {} Segmenten ({}x{} Zellen)",
            world.node_count(),
            world.lane_count(),
            report.segments,
            report.grid_width,
            report.grid_height
        );
        Ok(CreatedLaneWorld {
            world,
            report,
            grid,
            medial,
        })
    }

    /// Erzeugt eine Lane-Welt und fügt eine bestehende hinzu.
    ///
    /// Die erzeugte Welt ist die primäre, `secondary` wird mit verschobenen
    /// IDs angehängt und an Sackgassen angebunden.
    pub fn create_merged_traffic_lane_world(
        &self,
        scene: &MapScene,
        secondary: &TrafficLaneWorld,
    ) -> Result<CreatedLaneWorld> {
        let mut created = self.create_with_report(scene)?;
        let merge = merge_lane_worlds(&mut created.world, secondary, self.settings.stitch_radius)?;
        created.report.merge = Some(merge);
        created.report.validation =
            validate_turning_constraints(&created.world, &self.settings.turning);
        Ok(created)
    }

    fn validate_settings(&self) -> Result<()> {
        let s = &self.settings;
        if !s.bounds.is_valid() {
            bail!("Ungueltiger Weltbereich: {:?}", s.bounds);
        }
        if !s.cell_size.is_finite() || s.cell_size <= 0.0 {
            bail!("Ungueltige Zellgroesse: {}", s.cell_size);
        }
        if !s.min_clearance.is_finite() || s.min_clearance < 0.0 {
            bail!("Ungueltiger Mindestabstand: {}", s.min_clearance);
        }
        if !s.connection_radius.is_finite() || s.connection_radius < 0.0 {
            bail!("Ungueltiger Anschlussradius: {}", s.connection_radius);
        }
        if !s.max_lane_width.is_finite() || s.max_lane_width <= 0.0 {
            bail!("Ungueltige maximale Lane-Breite: {}", s.max_lane_width);
        }
        if s.node_spacing_cells == 0 {
            bail!("Node-Abstand muss mindestens eine Zelle sein");
        }
        Ok(())
    }
}
