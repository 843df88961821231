//! Fehlertypen der Serialisierung.

use thiserror::Error;

/// Fehler beim Lesen oder Schreiben eines Weltmodells.
///
/// Jeder Fehler bricht das Laden vollständig ab, es gibt kein Teilergebnis.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Datei- oder Stream-Fehler
    #[error("E/A-Fehler: {0}")]
    Io(#[from] std::io::Error),
    /// Binärdaten beginnen nicht mit der erwarteten Kennung
    #[error("Unbekannte Kennung {found:?}")]
    InvalidMagic {
        /// Gelesene Bytes
        found: [u8; 4],
    },
    /// Version wird nicht unterstützt (0 oder neuer als die aktuelle)
    #[error("Version {found} nicht unterstuetzt (unterstuetzt {min} bis {max})")]
    UnsupportedVersion {
        /// Gespeicherte Version
        found: u32,
        /// Älteste lesbare Version
        min: u32,
        /// Aktuelle Version
        max: u32,
    },
    /// Eingabe endet vorzeitig
    #[error("Daten abgeschnitten bei {context}: {needed} Bytes benoetigt, {remaining} vorhanden")]
    Truncated {
        /// Was gerade gelesen wurde
        context: &'static str,
        /// Benötigte Bytes
        needed: usize,
        /// Verbleibende Bytes
        remaining: usize,
    },
    /// Nach dem letzten Abschnitt folgen weitere Bytes
    #[error("{0} ueberzaehlige Bytes am Ende")]
    TrailingBytes(usize),
    /// Inhaltlich fehlerhafte Daten
    #[error("Fehlerhafte Daten: {0}")]
    Malformed(String),
    /// JSON nicht lesbar oder nicht schreibbar
    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),
    /// Weder Binärkennung noch JSON-Objekt
    #[error("Unbekanntes Dateiformat")]
    UnknownFormat,
}

impl SerializationError {
    /// Kurzform für [`SerializationError::Malformed`]
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
