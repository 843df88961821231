//! Rasterung der Kollisionsformen in ein Belegungsgitter.
//!
//! Jede belegte Zelle trägt das Label des Hindernisses, das sie zuerst
//! getroffen hat. Labels `0..n` sind Entities in Szenen-Reihenfolge, die vier
//! höchsten Labels stehen für die Ränder des Rasters.

use anyhow::{bail, Context, Result};
use glam::Vec2;
use image::{Rgb, RgbImage};
use std::path::Path;

use super::scene::MapScene;
use super::settings::LaneWorldCreationSettings;
use crate::shared::options::MAX_GRID_CELLS;

/// Label eines Hindernisses im Raster
pub type ObstacleLabel = u32;

/// Rand-Label: untere Rasterzeile
pub const BORDER_SOUTH: ObstacleLabel = u32::MAX - 3;
/// Rand-Label: obere Rasterzeile
pub const BORDER_NORTH: ObstacleLabel = u32::MAX - 2;
/// Rand-Label: linke Rasterspalte
pub const BORDER_WEST: ObstacleLabel = u32::MAX - 1;
/// Rand-Label: rechte Rasterspalte
pub const BORDER_EAST: ObstacleLabel = u32::MAX;

/// Ist das Label ein Rasterrand?
pub fn is_border_label(label: ObstacleLabel) -> bool {
    label >= BORDER_SOUTH
}

/// Kennzahlen der Rasterung
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    /// Belegte Zellen (inkl. Rand)
    pub obstacle_cells: usize,
    /// Entities mit ungültiger Form
    pub skipped_entities: usize,
    /// Entities außerhalb des Höhenfilters
    pub filtered_entities: usize,
}

/// Belegungsgitter über dem Weltbereich
#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    width: usize,
    height: usize,
    cell_size: f32,
    origin: Vec2,
    cells: Vec<Option<ObstacleLabel>>,
}

/// 8er-Nachbarschaft mit Schrittkosten in Zelleinheiten
const NEIGHBORS_8: [(i64, i64, f32); 8] = [
    (-1, 0, 1.0),
    (1, 0, 1.0),
    (0, -1, 1.0),
    (0, 1, 1.0),
    (-1, -1, std::f32::consts::SQRT_2),
    (1, -1, std::f32::consts::SQRT_2),
    (-1, 1, std::f32::consts::SQRT_2),
    (1, 1, std::f32::consts::SQRT_2),
];

impl ObstacleGrid {
    /// Leeres Raster über `settings.bounds`.
    ///
    /// Fehler bei ungültigem Bereich, ungültiger Zellgröße oder zu vielen Zellen.
    pub fn empty(settings: &LaneWorldCreationSettings) -> Result<Self> {
        let bounds = settings.bounds;
        if !bounds.is_valid() {
            bail!("Ungueltiger Weltbereich: {:?}", bounds);
        }
        let cell_size = settings.cell_size;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            bail!("Ungueltige Zellgroesse: {}", cell_size);
        }

        let width = ((bounds.width() / cell_size).ceil() as usize).max(1);
        let height = ((bounds.depth() / cell_size).ceil() as usize).max(1);
        let total = width
            .checked_mul(height)
            .context("Rastergroesse laeuft ueber")?;
        if total > MAX_GRID_CELLS {
            bail!(
                "Raster zu gross: {}x{} = {} Zellen (Maximum {})",
                width,
                height,
                total,
                MAX_GRID_CELLS
            );
        }

        Ok(Self {
            width,
            height,
            cell_size,
            origin: bounds.min(),
            cells: vec![None; total],
        })
    }

    /// Rastert alle relevanten Entities der Szene
    pub fn rasterize(
        scene: &MapScene,
        settings: &LaneWorldCreationSettings,
    ) -> Result<(Self, RasterStats)> {
        let mut grid = Self::empty(settings)?;
        let mut stats = RasterStats::default();

        for (label, entity) in scene.entities.iter().enumerate() {
            if let (Some(filter), Some(height)) = (&settings.height_filter, &entity.height) {
                if !filter.overlaps(height) {
                    stats.filtered_entities += 1;
                    continue;
                }
            }
            let Some((min, max)) = entity.shape.aabb() else {
                log::warn!("Entity '{}' hat eine ungueltige Form, uebersprungen", entity.name);
                stats.skipped_entities += 1;
                continue;
            };

            let Some((x_range, z_range)) = grid.cell_span(min, max) else {
                continue;
            };
            for z in z_range {
                for x in x_range.clone() {
                    let index = z * grid.width + x;
                    if grid.cells[index].is_none()
                        && entity.shape.contains(grid.cell_center(index))
                    {
                        grid.cells[index] = Some(label as ObstacleLabel);
                    }
                }
            }
        }

        if settings.border_as_obstacle {
            grid.mark_border();
        }

        stats.obstacle_cells = grid.cells.iter().filter(|c| c.is_some()).count();
        log::debug!(
            "Raster {}x{}: {} belegte Zellen, {} Entities uebersprungen, {} gefiltert",
            grid.width,
            grid.height,
            stats.obstacle_cells,
            stats.skipped_entities,
            stats.filtered_entities
        );
        Ok((grid, stats))
    }

    /// Zellbereich, dessen Mittelpunkte im Rechteck liegen
    fn cell_span(
        &self,
        min: Vec2,
        max: Vec2,
    ) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>)> {
        let to_range = |lo: f32, hi: f32, origin: f32, count: usize| {
            let first = ((lo - origin) / self.cell_size - 0.5).ceil().max(0.0);
            let last = ((hi - origin) / self.cell_size - 0.5).floor();
            if last < first || first >= count as f32 {
                return None;
            }
            let last = (last as usize).min(count - 1);
            Some(first as usize..last + 1)
        };
        Some((
            to_range(min.x, max.x, self.origin.x, self.width)?,
            to_range(min.y, max.y, self.origin.y, self.height)?,
        ))
    }

    fn mark_border(&mut self) {
        let (w, h) = (self.width, self.height);
        let mut mark = |index: usize, label: ObstacleLabel| {
            if self.cells[index].is_none() {
                self.cells[index] = Some(label);
            }
        };
        for x in 0..w {
            mark(x, BORDER_SOUTH);
            mark((h - 1) * w + x, BORDER_NORTH);
        }
        for z in 0..h {
            mark(z * w, BORDER_WEST);
            mark(z * w + w - 1, BORDER_EAST);
        }
    }

    /// Anzahl Spalten
    pub fn width(&self) -> usize {
        self.width
    }

    /// Anzahl Zeilen
    pub fn height(&self) -> usize {
        self.height
    }

    /// Anzahl Zellen
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// `true` bei einem Raster ohne Zellen (kommt praktisch nicht vor)
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Zellgröße in Welteinheiten
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Label der Zelle, `None` bei freier Zelle
    pub fn label(&self, index: usize) -> Option<ObstacleLabel> {
        self.cells.get(index).copied().flatten()
    }

    /// Ist die Zelle belegt?
    pub fn is_blocked(&self, index: usize) -> bool {
        self.label(index).is_some()
    }

    /// (Spalte, Zeile) einer Zelle
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Weltposition des Zellmittelpunkts
    pub fn cell_center(&self, index: usize) -> Vec2 {
        let (x, z) = self.coords(index);
        self.origin + Vec2::new(x as f32 + 0.5, z as f32 + 0.5) * self.cell_size
    }

    /// Zelle, in der eine Weltposition liegt
    pub fn world_to_cell(&self, position: Vec2) -> Option<usize> {
        let local = (position - self.origin) / self.cell_size;
        if !local.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (x, z) = (local.x as usize, local.y as usize);
        (x < self.width && z < self.height).then_some(z * self.width + x)
    }

    /// 8er-Nachbarn einer Zelle mit Schrittkosten (in Zellen)
    pub fn neighbors8(&self, index: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let (x, z) = self.coords(index);
        NEIGHBORS_8.iter().filter_map(move |&(dx, dz, cost)| {
            let nx = x as i64 + dx;
            let nz = z as i64 + dz;
            if nx < 0 || nz < 0 || nx >= self.width as i64 || nz >= self.height as i64 {
                return None;
            }
            Some((nz as usize * self.width + nx as usize, cost))
        })
    }

    /// Debug-Bild: Hindernisse grau, Rand dunkel, hervorgehobene Zellen rot.
    ///
    /// Zeile 0 des Rasters liegt unten im Bild.
    pub fn to_debug_image(&self, highlight: &[usize]) -> RgbImage {
        let mut img =
            RgbImage::from_pixel(self.width as u32, self.height as u32, Rgb([255, 255, 255]));
        for (index, cell) in self.cells.iter().enumerate() {
            let color = match cell {
                Some(label) if is_border_label(*label) => Rgb([60, 60, 60]),
                Some(_) => Rgb([150, 150, 150]),
                None => continue,
            };
            let (x, z) = self.coords(index);
            img.put_pixel(x as u32, (self.height - 1 - z) as u32, color);
        }
        for &index in highlight {
            if index < self.cells.len() {
                let (x, z) = self.coords(index);
                img.put_pixel(x as u32, (self.height - 1 - z) as u32, Rgb([220, 30, 30]));
            }
        }
        img
    }

    /// Speichert das Debug-Bild als PNG
    pub fn save_debug_image(&self, highlight: &[usize], path: &Path) -> Result<()> {
        self.to_debug_image(highlight)
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("Debug-Bild nicht schreibbar: {}", path.display()))?;
        log::info!("Debug-Bild gespeichert: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldBounds;
    use crate::creator::scene::{CollisionEntity, ObstacleShape};
    use crate::creator::settings::HeightRange;

    fn settings(size: f32, cell: f32) -> LaneWorldCreationSettings {
        let mut s = LaneWorldCreationSettings::for_bounds(WorldBounds::new(
            Vec2::ZERO,
            Vec2::splat(size),
        ));
        s.cell_size = cell;
        s
    }

    #[test]
    fn test_grid_dimensions_round_up() {
        let grid = ObstacleGrid::empty(&settings(10.0, 3.0)).expect("Raster erwartet");
        assert_eq!((grid.width(), grid.height()), (4, 4));
        assert_eq!(grid.cell_center(0), Vec2::new(1.5, 1.5));
        assert_eq!(grid.world_to_cell(Vec2::new(4.0, 7.0)), Some(2 * 4 + 1));
        assert_eq!(grid.world_to_cell(Vec2::new(-1.0, 1.0)), None);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        assert!(ObstacleGrid::empty(&settings(10.0, 0.0)).is_err());
        assert!(ObstacleGrid::empty(&settings(10.0, f32::NAN)).is_err());
        assert!(ObstacleGrid::empty(&settings(1.0e6, 0.01)).is_err());

        let mut degenerate = settings(10.0, 1.0);
        degenerate.bounds = WorldBounds::new(Vec2::ZERO, Vec2::new(0.0, 5.0));
        assert!(ObstacleGrid::empty(&degenerate).is_err());
    }

    #[test]
    fn test_rasterize_labels_and_first_writer_wins() {
        let scene = MapScene {
            name: None,
            bounds: None,
            entities: vec![
                CollisionEntity::new(
                    "a",
                    ObstacleShape::Rect {
                        min: Vec2::new(0.0, 0.0),
                        max: Vec2::new(4.0, 4.0),
                    },
                ),
                CollisionEntity::new(
                    "b",
                    ObstacleShape::Rect {
                        min: Vec2::new(2.0, 2.0),
                        max: Vec2::new(6.0, 6.0),
                    },
                ),
            ],
        };
        let (grid, stats) =
            ObstacleGrid::rasterize(&scene, &settings(10.0, 1.0)).expect("Raster erwartet");

        // Überlappung (2..4) gehört zum ersten Entity
        let overlap = grid.world_to_cell(Vec2::new(3.5, 3.5)).expect("Zelle erwartet");
        assert_eq!(grid.label(overlap), Some(0));
        let only_b = grid.world_to_cell(Vec2::new(5.5, 5.5)).expect("Zelle erwartet");
        assert_eq!(grid.label(only_b), Some(1));
        let free = grid.world_to_cell(Vec2::new(8.5, 1.5)).expect("Zelle erwartet");
        assert!(!grid.is_blocked(free));
        assert_eq!(stats.obstacle_cells, 16 + 16 - 4);
    }

    #[test]
    fn test_height_filter_and_invalid_shapes() {
        let scene = MapScene {
            name: None,
            bounds: None,
            entities: vec![
                CollisionEntity::new(
                    "bruecke",
                    ObstacleShape::Circle {
                        center: Vec2::splat(5.0),
                        radius: 2.0,
                    },
                )
                .with_height(HeightRange::new(10.0, 12.0)),
                CollisionEntity::new("kaputt", ObstacleShape::Polygon { points: vec![] }),
            ],
        };
        let mut s = settings(10.0, 1.0);
        s.height_filter = Some(HeightRange::new(0.0, 3.0));

        let (grid, stats) = ObstacleGrid::rasterize(&scene, &s).expect("Raster erwartet");
        assert_eq!(stats.filtered_entities, 1);
        assert_eq!(stats.skipped_entities, 1);
        assert_eq!(stats.obstacle_cells, 0);
        assert!(!grid.is_blocked(grid.world_to_cell(Vec2::splat(5.0)).expect("Zelle erwartet")));
    }

    #[test]
    fn test_border_cells_get_side_labels() {
        let mut s = settings(4.0, 1.0);
        s.border_as_obstacle = true;
        let (grid, stats) = ObstacleGrid::rasterize(&MapScene::default(), &s)
            .expect("Raster erwartet");

        assert_eq!(stats.obstacle_cells, 12);
        assert_eq!(grid.label(1), Some(BORDER_SOUTH));
        assert_eq!(grid.label(4), Some(BORDER_WEST));
        assert_eq!(grid.label(7), Some(BORDER_EAST));
        assert_eq!(grid.label(13), Some(BORDER_NORTH));
        assert_eq!(grid.label(5), None);
    }

    #[test]
    fn test_neighbors_respect_edges() {
        let grid = ObstacleGrid::empty(&settings(3.0, 1.0)).expect("Raster erwartet");
        assert_eq!(grid.neighbors8(0).count(), 3);
        assert_eq!(grid.neighbors8(4).count(), 8);
    }

    #[test]
    fn test_debug_image_dimensions() {
        let mut s = settings(4.0, 1.0);
        s.border_as_obstacle = true;
        let (grid, _) = ObstacleGrid::rasterize(&MapScene::default(), &s).expect("Raster erwartet");
        let img = grid.to_debug_image(&[5]);
        assert_eq!(img.dimensions(), (4, 4));
        // Zelle 5 = (1,1) liegt im Bild in Zeile 2
        assert_eq!(img.get_pixel(1, 2), &Rgb([220, 30, 30]));
    }
}
