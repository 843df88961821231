//! Use-Case-Funktionen für Dateiaktionen des Werkzeugs.
//! Alle Dateisystem-Operationen (I/O) sind hier zentralisiert.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::core::{TrafficLaneWorld, WorldModel, WorldSummary};
use crate::creator::{
    validate_turning_constraints, CreationReport, MapScene, ValidationReport,
    VoronoiLaneWorldCreator,
};
use crate::serialization::{
    AssetProxy, DeserializedWorldModel, TrafficLaneWorldBinarySerializer, WorldModelFormat,
    WorldModelSerializer,
};
use crate::shared::NavigationOptions;

/// Eingaben für das Erzeugen einer Lane-Welt
#[derive(Debug, Clone, Default)]
pub struct BakeRequest {
    /// Szene (TOML)
    pub scene_path: PathBuf,
    /// Ziel; ohne Endung wird das Standardformat angehängt
    pub output_path: PathBuf,
    /// Bestehende Lane-Welt, die angebunden wird
    pub merge_with: Option<PathBuf>,
    /// Optionales Debug-Bild des Rasters (PNG)
    pub debug_image: Option<PathBuf>,
}

/// Ergebnis von `bake_lane_world`
#[derive(Debug, Clone)]
pub struct BakeOutcome {
    /// Tatsächlich geschriebene Datei
    pub output_path: PathBuf,
    pub report: CreationReport,
    pub summary: WorldSummary,
}

/// Erzeugt eine Lane-Welt aus einer Szene und speichert sie.
pub fn bake_lane_world(options: &NavigationOptions, request: &BakeRequest) -> Result<BakeOutcome> {
    let scene = MapScene::load_from_file(&request.scene_path)?;

    let mut settings = options.creation.clone();
    if let Some(bounds) = scene.bounds {
        settings.bounds = bounds;
    }
    let creator = VoronoiLaneWorldCreator::new(settings);

    let created = match &request.merge_with {
        Some(path) => {
            let secondary = load_lane_world(options, path)?;
            creator.create_merged_traffic_lane_world(&scene, &secondary)?
        }
        None => creator.create_with_report(&scene)?,
    };

    if let Some(image_path) = &request.debug_image {
        created
            .save_debug_image(image_path)
            .with_context(|| format!("Debug-Bild nicht speicherbar: {}", image_path.display()))?;
    }

    for violation in &created.report.validation.violations {
        log::warn!("Abbiege-Vorgabe verletzt: {}", violation);
    }

    let output_path = resolve_output_path(&request.output_path, options.output.format);
    let summary = created.world.summary();
    WorldModelSerializer::serialize_to_file(&WorldModel::from(created.world), &output_path)
        .with_context(|| format!("Lane-Welt nicht speicherbar: {}", output_path.display()))?;

    Ok(BakeOutcome {
        output_path,
        report: created.report,
        summary,
    })
}

/// Hängt die Endung des Standardformats an, wenn keine angegeben ist
pub fn resolve_output_path(path: &Path, default_format: WorldModelFormat) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(default_format.extension())
    }
}

/// Lädt eine Lane-Welt; veraltete Dateien werden bei `upgrade_on_load`
/// sofort neu geschrieben.
pub fn load_lane_world(options: &NavigationOptions, path: &Path) -> Result<TrafficLaneWorld> {
    let loaded = load_world_model(path)?;
    if loaded.needs_reserialize && options.output.upgrade_on_load {
        WorldModelSerializer::reserialize_to_file(&AssetProxy::from_path(path), &loaded.model)
            .with_context(|| format!("Aktualisieren fehlgeschlagen: {}", path.display()))?;
    }
    into_lane_world(loaded, path)
}

fn load_world_model(path: &Path) -> Result<DeserializedWorldModel> {
    WorldModelSerializer::deserialize_from_file(&AssetProxy::from_path(path))
        .with_context(|| format!("Lane-Welt nicht ladbar: {}", path.display()))
}

fn into_lane_world(loaded: DeserializedWorldModel, path: &Path) -> Result<TrafficLaneWorld> {
    loaded
        .model
        .into_traffic_lane_world()
        .with_context(|| format!("Keine Lane-Welt: {}", path.display()))
}

/// Kennzahlen einer gespeicherten Lane-Welt
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub format: WorldModelFormat,
    pub version: u32,
    pub needs_reserialize: bool,
    pub map_name: Option<String>,
    pub summary: WorldSummary,
    pub validation: ValidationReport,
}

/// Liest eine Lane-Welt und prüft sie gegen die Abbiege-Vorgaben
pub fn inspect_lane_world(options: &NavigationOptions, path: &Path) -> Result<InspectReport> {
    let loaded = load_world_model(path)?;
    let (format, version, needs_reserialize) =
        (loaded.format, loaded.version, loaded.needs_reserialize);
    let world = into_lane_world(loaded, path)?;

    Ok(InspectReport {
        format,
        version,
        needs_reserialize,
        map_name: world.map_name.clone(),
        summary: world.summary(),
        validation: validate_turning_constraints(&world, &options.creation.turning),
    })
}

/// Schreibt eine Lane-Welt in der aktuellen Version neu.
///
/// Gibt `false` zurück, wenn die Datei schon aktuell war und `force` nicht
/// gesetzt ist.
pub fn reserialize_lane_world(path: &Path, force: bool) -> Result<bool> {
    let asset = AssetProxy::from_path(path);
    let loaded = load_world_model(path)?;
    if !loaded.needs_reserialize && !force {
        log::info!(
            "{} ist bereits in Version {}",
            path.display(),
            TrafficLaneWorldBinarySerializer::CURRENT_VERSION
        );
        return Ok(false);
    }
    WorldModelSerializer::reserialize_to_file(&asset, &loaded.model)
        .with_context(|| format!("Neu speichern fehlgeschlagen: {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
        name = "Hof"
        bounds = { min_x = 0.0, min_z = 0.0, max_x = 40.0, max_z = 40.0 }

        [[entities]]
        name = "links"
        shape = { type = "rect", min = [0.0, 0.0], max = [10.0, 40.0] }

        [[entities]]
        name = "rechts"
        shape = { type = "rect", min = [20.0, 0.0], max = [40.0, 40.0] }
    "#;

    fn options() -> NavigationOptions {
        let mut options = NavigationOptions::default();
        options.creation.cell_size = 1.0;
        options
    }

    #[test]
    fn test_bake_inspect_and_reserialize() {
        let dir = tempfile::tempdir().expect("Temp-Verzeichnis erwartet");
        let scene_path = dir.path().join("hof.toml");
        std::fs::write(&scene_path, SCENE).expect("Schreiben erwartet");

        let outcome = bake_lane_world(
            &options(),
            &BakeRequest {
                scene_path,
                output_path: dir.path().join("out/hof"),
                merge_with: None,
                debug_image: Some(dir.path().join("hof.png")),
            },
        )
        .expect("Erzeugung erwartet");

        assert_eq!(outcome.output_path, dir.path().join("out/hof.tlw"));
        assert!(outcome.summary.lane_count > 0);
        assert!(dir.path().join("hof.png").exists());

        let report = inspect_lane_world(&options(), &outcome.output_path)
            .expect("Bericht erwartet");
        assert_eq!(report.format, WorldModelFormat::Binary);
        assert!(!report.needs_reserialize);
        assert_eq!(report.map_name.as_deref(), Some("Hof"));
        assert_eq!(report.summary.node_count, outcome.summary.node_count);
        assert_eq!(report.summary.lane_count, outcome.summary.lane_count);

        assert!(!reserialize_lane_world(&outcome.output_path, false).expect("Ergebnis erwartet"));
        assert!(reserialize_lane_world(&outcome.output_path, true).expect("Ergebnis erwartet"));
    }

    #[test]
    fn test_upgrade_on_load_rewrites_old_file() {
        let dir = tempfile::tempdir().expect("Temp-Verzeichnis erwartet");
        let path = dir.path().join("alt.tlw");
        let mut bytes = TrafficLaneWorldBinarySerializer::serialize(&TrafficLaneWorld::default())
            .expect("Bytes erwartet");
        bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
        std::fs::write(&path, &bytes).expect("Schreiben erwartet");

        let mut options = options();
        options.output.upgrade_on_load = true;
        load_lane_world(&options, &path).expect("Welt erwartet");

        let upgraded = std::fs::read(&path).expect("Lesen erwartet");
        assert_eq!(
            TrafficLaneWorldBinarySerializer::peek_version(&upgraded).ok(),
            Some(TrafficLaneWorldBinarySerializer::CURRENT_VERSION)
        );
    }

    #[test]
    fn test_resolve_output_path() {
        assert_eq!(
            resolve_output_path(Path::new("a/welt"), WorldModelFormat::Json),
            PathBuf::from("a/welt.json")
        );
        assert_eq!(
            resolve_output_path(Path::new("welt.tlw"), WorldModelFormat::Json),
            PathBuf::from("welt.tlw")
        );
    }
}
