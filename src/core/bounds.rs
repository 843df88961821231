//! Weltkoordinaten-Begrenzungen in der X/Z-Ebene.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned Weltbereich (X nach rechts, Z nach oben)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Minimale X-Koordinate (links)
    pub min_x: f32,
    /// Minimale Z-Koordinate (unten)
    pub min_z: f32,
    /// Maximale X-Koordinate (rechts)
    pub max_x: f32,
    /// Maximale Z-Koordinate (oben)
    pub max_z: f32,
}

impl WorldBounds {
    /// Erstellt Bounds aus zwei Eckpunkten (Reihenfolge egal)
    pub fn new(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            min_x: min.x,
            min_z: min.y,
            max_x: max.x,
            max_z: max.y,
        }
    }

    /// Erstellt Bounds aus Map-Größe (zentriert bei 0,0)
    pub fn from_map_size(size: f32) -> Self {
        let half = size / 2.0;
        Self {
            min_x: -half,
            min_z: -half,
            max_x: half,
            max_z: half,
        }
    }

    /// Kleinste Bounds, die alle Punkte enthalten. `None` bei leerer Eingabe.
    pub fn enclosing(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::new(min, max))
    }

    /// Ausdehnung in X-Richtung
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Ausdehnung in Z-Richtung
    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    /// Linke untere Ecke
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.min_x, self.min_z)
    }

    /// Rechte obere Ecke
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.max_x, self.max_z)
    }

    /// Prüft ob ein Punkt innerhalb liegt (Ränder inklusive)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_z
            && point.y <= self.max_z
    }

    /// Endliche Werte und positive Fläche
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_z, self.max_x, self.max_z]
            .iter()
            .all(|v| v.is_finite())
            && self.width() > 0.0
            && self.depth() > 0.0
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::from_map_size(1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_bounds_from_size() {
        let bounds = WorldBounds::from_map_size(4096.0);
        assert_eq!(bounds.min_x, -2048.0);
        assert_eq!(bounds.min_z, -2048.0);
        assert_eq!(bounds.max_x, 2048.0);
        assert_eq!(bounds.max_z, 2048.0);
        assert!(bounds.is_valid());
    }

    #[test]
    fn test_enclosing_and_contains() {
        let bounds = WorldBounds::enclosing([
            Vec2::new(3.0, -1.0),
            Vec2::new(-2.0, 4.0),
            Vec2::new(0.0, 0.0),
        ])
        .expect("Bounds erwartet");

        assert_eq!(bounds.min(), Vec2::new(-2.0, -1.0));
        assert_eq!(bounds.max(), Vec2::new(3.0, 4.0));
        assert!(bounds.contains(Vec2::new(3.0, 4.0)));
        assert!(!bounds.contains(Vec2::new(3.1, 0.0)));
        assert!(WorldBounds::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn test_degenerate_bounds_are_invalid() {
        let flat = WorldBounds::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        assert!(!flat.is_valid());

        let nan = WorldBounds {
            min_x: f32::NAN,
            ..WorldBounds::default()
        };
        assert!(!nan.is_valid());
    }
}
