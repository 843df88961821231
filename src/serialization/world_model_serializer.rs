//! Laden und Speichern von Weltmodellen als Dateien.
//!
//! Beim Laden entscheidet der Inhalt (Binärkennung oder JSON-Objekt), beim
//! Speichern der Dateiname. Ältere Versionen werden geladen und über
//! `needs_reserialize` gemeldet.

use std::path::Path;

use super::asset::{AssetProxy, WorldModelFormat};
use super::binary::{TrafficLaneWorldBinarySerializer, MAGIC};
use super::error::SerializationError;
use super::json::TrafficLaneWorldJsonSerializer;
use crate::core::WorldModel;

/// Ergebnis eines Ladevorgangs. Das Modell gehört allein dem Aufrufer.
#[derive(Debug, Clone)]
pub struct DeserializedWorldModel {
    /// Geladenes Modell
    pub model: WorldModel,
    /// Erkanntes Format
    pub format: WorldModelFormat,
    /// Gespeicherte Version
    pub version: u32,
    /// Gespeicherte Version ist älter als die aktuelle
    pub needs_reserialize: bool,
}

/// Datei-Ein-/Ausgabe für Weltmodelle
pub struct WorldModelSerializer;

impl WorldModelSerializer {
    /// Erkennt das Format am Inhalt
    pub fn detect_format(bytes: &[u8]) -> Option<WorldModelFormat> {
        if bytes.starts_with(&MAGIC) {
            return Some(WorldModelFormat::Binary);
        }
        let first = bytes.iter().find(|b| !b.is_ascii_whitespace())?;
        (*first == b'{').then_some(WorldModelFormat::Json)
    }

    /// Lädt ein Weltmodell aus einem Byte-Puffer
    pub fn deserialize_bytes(bytes: &[u8]) -> Result<DeserializedWorldModel, SerializationError> {
        let format = Self::detect_format(bytes).ok_or(SerializationError::UnknownFormat)?;
        let (world, version) = match format {
            WorldModelFormat::Binary => TrafficLaneWorldBinarySerializer::deserialize(bytes)?,
            WorldModelFormat::Json => TrafficLaneWorldJsonSerializer::deserialize(bytes)?,
        };
        Ok(DeserializedWorldModel {
            model: WorldModel::from(world),
            format,
            version,
            needs_reserialize: version < TrafficLaneWorldBinarySerializer::CURRENT_VERSION,
        })
    }

    /// Lädt das Weltmodell eines Assets
    pub fn deserialize_from_file(
        asset: &AssetProxy,
    ) -> Result<DeserializedWorldModel, SerializationError> {
        let path = asset.local_path();
        let bytes = std::fs::read(&path).map_err(|e| with_path(e, &path))?;
        let loaded = Self::deserialize_bytes(&bytes)?;

        if loaded.format != asset.format() {
            log::warn!(
                "Asset '{}' ist {} gespeichert, der Dateiname erwartet {}",
                asset.asset_id(),
                loaded.format,
                asset.format()
            );
        }
        if loaded.needs_reserialize {
            log::info!(
                "Asset '{}' hat Version {} (aktuell {}), sollte neu gespeichert werden",
                asset.asset_id(),
                loaded.version,
                TrafficLaneWorldBinarySerializer::CURRENT_VERSION
            );
        }
        log::info!(
            "{} geladen: {} ({}, v{})",
            loaded.model.kind(),
            path.display(),
            loaded.format,
            loaded.version
        );
        Ok(loaded)
    }

    /// Serialisiert ein Modell im gewünschten Format
    pub fn serialize_bytes(
        model: &WorldModel,
        format: WorldModelFormat,
    ) -> Result<Vec<u8>, SerializationError> {
        match (model, format) {
            (WorldModel::TrafficLanes(world), WorldModelFormat::Binary) => {
                TrafficLaneWorldBinarySerializer::serialize(world)
            }
            (WorldModel::TrafficLanes(world), WorldModelFormat::Json) => {
                TrafficLaneWorldJsonSerializer::serialize(world)
            }
        }
    }

    /// Schreibt ein Modell; das Format folgt aus dem Dateinamen.
    ///
    /// Fehlende Verzeichnisse werden angelegt. Geschrieben wird in eine
    /// `.tmp`-Datei, die danach umbenannt wird.
    pub fn serialize_to_file(model: &WorldModel, path: &Path) -> Result<(), SerializationError> {
        let format = WorldModelFormat::from_path(path);
        let bytes = Self::serialize_bytes(model, format)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| with_path(e, parent))?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);

        std::fs::write(&tmp, &bytes).map_err(|e| with_path(e, &tmp))?;
        std::fs::rename(&tmp, path).map_err(|e| with_path(e, path))?;

        log::info!(
            "{} gespeichert: {} ({}, v{}, {} Bytes)",
            model.kind(),
            path.display(),
            format,
            TrafficLaneWorldBinarySerializer::CURRENT_VERSION,
            bytes.len()
        );
        Ok(())
    }

    /// Schreibt ein Asset in der aktuellen Version neu
    pub fn reserialize_to_file(
        asset: &AssetProxy,
        model: &WorldModel,
    ) -> Result<(), SerializationError> {
        log::info!("Asset '{}' wird neu gespeichert", asset.asset_id());
        Self::serialize_to_file(model, &asset.local_path())
    }
}

fn with_path(error: std::io::Error, path: &Path) -> SerializationError {
    SerializationError::Io(std::io::Error::new(
        error.kind(),
        format!("{}: {}", path.display(), error),
    ))
}
