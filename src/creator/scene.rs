//! Eingabe der Lane-Welt-Erzeugung: Map-Entities mit Kollisionsform.

use anyhow::{Context, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::settings::HeightRange;
use crate::core::WorldBounds;

/// 2D-Kollisionsform eines Entities (Grundriss in der X/Z-Ebene)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObstacleShape {
    /// Kreis
    Circle {
        /// Mittelpunkt
        center: Vec2,
        /// Radius
        radius: f32,
    },
    /// Achsparalleles Rechteck
    Rect {
        /// Linke untere Ecke
        min: Vec2,
        /// Rechte obere Ecke
        max: Vec2,
    },
    /// Einfaches Polygon (Even-Odd-Regel)
    Polygon {
        /// Eckpunkte in Umlaufreihenfolge
        points: Vec<Vec2>,
    },
}

impl ObstacleShape {
    /// Umschließendes Rechteck. `None` bei ungültiger Form.
    pub fn aabb(&self) -> Option<(Vec2, Vec2)> {
        let (min, max) = match self {
            ObstacleShape::Circle { center, radius } => {
                if *radius <= 0.0 {
                    return None;
                }
                (*center - Vec2::splat(*radius), *center + Vec2::splat(*radius))
            }
            ObstacleShape::Rect { min, max } => (min.min(*max), min.max(*max)),
            ObstacleShape::Polygon { points } => {
                if points.len() < 3 {
                    return None;
                }
                points
                    .iter()
                    .skip(1)
                    .fold((points[0], points[0]), |(lo, hi), p| (lo.min(*p), hi.max(*p)))
            }
        };
        (min.is_finite() && max.is_finite()).then_some((min, max))
    }

    /// Liegt der Punkt innerhalb der Form?
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            ObstacleShape::Circle { center, radius } => {
                point.distance_squared(*center) <= radius * radius
            }
            ObstacleShape::Rect { min, max } => {
                let lo = min.min(*max);
                let hi = min.max(*max);
                point.x >= lo.x && point.x <= hi.x && point.y >= lo.y && point.y <= hi.y
            }
            ObstacleShape::Polygon { points } => polygon_contains(points, point),
        }
    }
}

fn polygon_contains(points: &[Vec2], point: Vec2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let t = (point.y - a.y) / (b.y - a.y);
            if point.x < a.x + t * (b.x - a.x) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Map-Entity mit Kollisionsform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionEntity {
    /// Name (nur für Logging)
    pub name: String,
    /// Grundriss
    pub shape: ObstacleShape,
    /// Vertikale Ausdehnung (ohne Angabe: immer relevant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<HeightRange>,
}

impl CollisionEntity {
    /// Erstellt ein Entity ohne Höhenangabe
    pub fn new(name: impl Into<String>, shape: ObstacleShape) -> Self {
        Self {
            name: name.into(),
            shape,
            height: None,
        }
    }

    /// Setzt die vertikale Ausdehnung
    pub fn with_height(mut self, height: HeightRange) -> Self {
        self.height = Some(height);
        self
    }
}

/// Eine Map mit allen kollisionsrelevanten Entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapScene {
    /// Name der Map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Weltbereich der Map (ohne Angabe: aus den Einstellungen)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<WorldBounds>,
    /// Alle Entities
    #[serde(default)]
    pub entities: Vec<CollisionEntity>,
}

impl MapScene {
    /// Parsed eine Szene aus TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Fehler beim Parsen der Szenen-Beschreibung")
    }

    /// Lädt eine Szene aus einer TOML-Datei
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Szene nicht lesbar: {}", path.display()))?;
        let scene = Self::from_toml_str(&content)
            .with_context(|| format!("Szene fehlerhaft: {}", path.display()))?;
        log::info!(
            "Szene geladen: {} ({} Entities)",
            path.display(),
            scene.entities.len()
        );
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_containment() {
        let circle = ObstacleShape::Circle {
            center: Vec2::new(1.0, 1.0),
            radius: 2.0,
        };
        assert!(circle.contains(Vec2::new(2.0, 2.0)));
        assert!(!circle.contains(Vec2::new(3.5, 1.0)));

        let rect = ObstacleShape::Rect {
            min: Vec2::new(4.0, 4.0),
            max: Vec2::new(0.0, 0.0),
        };
        assert!(rect.contains(Vec2::new(1.0, 3.0)));
        assert_eq!(rect.aabb(), Some((Vec2::ZERO, Vec2::new(4.0, 4.0))));

        // L-förmiges Polygon
        let poly = ObstacleShape::Polygon {
            points: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(4.0, 0.0),
                Vec2::new(4.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 4.0),
                Vec2::new(0.0, 4.0),
            ],
        };
        assert!(poly.contains(Vec2::new(0.5, 3.0)));
        assert!(poly.contains(Vec2::new(3.0, 0.5)));
        assert!(!poly.contains(Vec2::new(3.0, 3.0)));
    }

    #[test]
    fn test_invalid_shapes_have_no_aabb() {
        let degenerate = ObstacleShape::Polygon {
            points: vec![Vec2::ZERO, Vec2::X],
        };
        assert!(degenerate.aabb().is_none());
        assert!(!degenerate.contains(Vec2::ZERO));

        let zero_circle = ObstacleShape::Circle {
            center: Vec2::ZERO,
            radius: 0.0,
        };
        assert!(zero_circle.aabb().is_none());
    }

    #[test]
    fn test_scene_from_toml() {
        let scene = MapScene::from_toml_str(
            r#"
            name = "Testmap"

            [[entities]]
            name = "Haus"
            shape = { type = "rect", min = [0.0, 0.0], max = [4.0, 6.0] }
            height = { min = 0.0, max = 8.0 }

            [[entities]]
            name = "Baum"
            shape = { type = "circle", center = [10.0, 2.0], radius = 1.5 }
            "#,
        )
        .expect("Szene erwartet");

        assert_eq!(scene.name.as_deref(), Some("Testmap"));
        assert_eq!(scene.entities.len(), 2);
        assert_eq!(scene.entities[0].height, Some(HeightRange::new(0.0, 8.0)));
        assert!(matches!(scene.entities[1].shape, ObstacleShape::Circle { .. }));
    }

    #[test]
    fn test_scene_parse_error_has_context() {
        let err = MapScene::from_toml_str("[[entities]]\nname = 3").expect_err("Fehler erwartet");
        assert!(format!("{err:#}").contains("Szenen-Beschreibung"));
    }
}
