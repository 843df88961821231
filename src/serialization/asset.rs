//! Asset-Referenzen und Formatwahl per Dateiname.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Dateiformat eines Weltmodells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldModelFormat {
    /// Kompaktes Binärformat (Standard)
    Binary,
    /// Lesbares JSON
    Json,
}

impl WorldModelFormat {
    /// Namenskonvention: Endung `.json` → JSON, alles andere → Binär
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => WorldModelFormat::Json,
            _ => WorldModelFormat::Binary,
        }
    }

    /// Übliche Dateiendung
    pub fn extension(self) -> &'static str {
        match self {
            WorldModelFormat::Binary => "tlw",
            WorldModelFormat::Json => "json",
        }
    }
}

impl fmt::Display for WorldModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldModelFormat::Binary => f.write_str("BINARY"),
            WorldModelFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Logischer Verweis auf eine Asset-Datei
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetProxy {
    asset_id: String,
    base_directory: PathBuf,
    relative_path: PathBuf,
}

impl AssetProxy {
    /// Asset innerhalb eines Basisverzeichnisses
    pub fn new(
        asset_id: impl Into<String>,
        base_directory: impl Into<PathBuf>,
        relative_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            base_directory: base_directory.into(),
            relative_path: relative_path.into(),
        }
    }

    /// Lose Datei: ID ist der Dateiname ohne Endung
    pub fn from_path(path: &Path) -> Self {
        let asset_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base_directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let relative_path = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf());
        Self {
            asset_id,
            base_directory,
            relative_path,
        }
    }

    /// Asset-ID
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// Aufgelöster Dateipfad
    pub fn local_path(&self) -> PathBuf {
        self.base_directory.join(&self.relative_path)
    }

    /// Format laut Namenskonvention
    pub fn format(&self) -> WorldModelFormat {
        WorldModelFormat::from_path(&self.relative_path)
    }
}
