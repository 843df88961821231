//! Zentrale Konfiguration für Erzeugung, Pfadsuche und Serialisierung.
//!
//! `NavigationOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

use crate::creator::LaneWorldCreationSettings;
use crate::serialization::WorldModelFormat;

// ── Rasterung ───────────────────────────────────────────────────────

/// Kantenlänge einer Rasterzelle in Welteinheiten (Meter).
pub const DEFAULT_CELL_SIZE: f32 = 0.5;
/// Obergrenze der Rastergröße (Zellen gesamt), schützt vor riesigen Allokationen.
pub const MAX_GRID_CELLS: usize = 16 * 1024 * 1024;

// ── Segmente und Lanes ──────────────────────────────────────────────

/// Mindestabstand einer Lane zum nächsten Hindernis.
pub const MIN_CLEARANCE: f32 = 1.0;
/// Segmente mit weniger Zellen werden verworfen.
pub const MIN_SEGMENT_CELLS: usize = 4;
/// Abstand zwischen zwei Lane-Nodes entlang eines Segments (in Zellen).
pub const NODE_SPACING_CELLS: usize = 8;
/// Segment-Endpunkte innerhalb dieses Radius werden verbunden.
pub const CONNECTION_RADIUS: f32 = 3.0;
/// Obergrenze der Lane-Breite.
pub const MAX_LANE_WIDTH: f32 = 8.0;
/// Suchradius für das Zusammenfügen zweier Lane-Welten.
pub const STITCH_RADIUS: f32 = 10.0;

// ── Abbiege-Vorgaben ────────────────────────────────────────────────

/// Maximale Richtungsänderung an einem Node (Grad).
pub const MAX_TURN_ANGLE_DEG: f32 = 120.0;
/// Minimale Lane-Länge.
pub const MIN_LANE_LENGTH: f32 = 1.0;
/// Minimale Lane-Breite.
pub const MIN_LANE_WIDTH: f32 = 1.5;

// ── Pfadsuche ───────────────────────────────────────────────────────

/// Maximale Anzahl expandierter Zustände pro Suche.
pub const PATHFINDER_MAX_EXPANSIONS: usize = 200_000;
/// Radius, in dem Start/Ziel auf den nächsten Lane-Node einrasten.
pub const PATHFINDER_SNAP_RADIUS: f32 = 25.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Optionen der Pfadsuche
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathfinderOptions {
    /// Maximale Anzahl expandierter Zustände
    pub max_expansions: usize,
    /// Einrast-Radius für freie Start-/Zielpositionen
    pub snap_radius: f32,
}

impl Default for PathfinderOptions {
    fn default() -> Self {
        Self {
            max_expansions: PATHFINDER_MAX_EXPANSIONS,
            snap_radius: PATHFINDER_SNAP_RADIUS,
        }
    }
}

/// Optionen beim Schreiben von Weltmodellen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Format neu geschriebener Dateien ohne eindeutige Endung
    pub format: WorldModelFormat,
    /// Veraltete Dateien beim Laden automatisch neu schreiben
    #[serde(default)]
    pub upgrade_on_load: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: WorldModelFormat::Binary,
            upgrade_on_load: false,
        }
    }
}

/// Alle zur Laufzeit änderbaren Optionen.
/// Wird als `lane_navigation.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationOptions {
    /// Erzeugung der Lane-Welt
    #[serde(default)]
    pub creation: LaneWorldCreationSettings,
    /// Pfadsuche
    #[serde(default)]
    pub pathfinder: PathfinderOptions,
    /// Serialisierung
    #[serde(default)]
    pub output: OutputOptions,
}

impl NavigationOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("lane-world-tool"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("lane_navigation.toml")
    }
}
