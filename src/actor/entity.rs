//! Spielobjekte mit ihren Komponenten, wie sie aus der Szene kommen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Eindeutige Kennung eines Spielobjekts
pub type EntityId = u64;

/// Art einer Komponente (ohne Daten), für Zuordnungsregeln
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Person,
    Vehicle,
    Collision,
    Movable,
}

/// An ein Spielobjekt angehängte Komponente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityComponent {
    /// Fußgänger-Rolle
    Person,
    /// Fahrzeug mit Karosseriebreite
    Vehicle {
        width: f32,
        /// Einsatzfahrzeug (darf Einsatz-Lanes benutzen)
        #[serde(default)]
        emergency: bool,
    },
    /// Kollisionskreis
    Collision { radius: f32 },
    /// Objekt kann sich bewegen
    Movable,
}

impl EntityComponent {
    /// Art der Komponente
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Person => ComponentKind::Person,
            Self::Vehicle { .. } => ComponentKind::Vehicle,
            Self::Collision { .. } => ComponentKind::Collision,
            Self::Movable => ComponentKind::Movable,
        }
    }
}

/// Spielobjekt mit Position und Komponenten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub position: Vec2,
    #[serde(default)]
    pub components: Vec<EntityComponent>,
}

impl Entity {
    /// Erstellt ein Objekt ohne Komponenten
    pub fn new(id: EntityId, name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            components: Vec::new(),
        }
    }

    /// Hängt eine Komponente an (Builder)
    pub fn with_component(mut self, component: EntityComponent) -> Self {
        self.components.push(component);
        self
    }

    /// Prüft, ob eine Komponente dieser Art vorhanden ist
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.component(kind).is_some()
    }

    /// Erste Komponente dieser Art
    pub fn component(&self, kind: ComponentKind) -> Option<&EntityComponent> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    /// Radius des Kollisionskreises, falls vorhanden
    pub fn collision_radius(&self) -> Option<f32> {
        self.components.iter().find_map(|c| match c {
            EntityComponent::Collision { radius } => Some(*radius),
            _ => None,
        })
    }

    /// Breite und Einsatz-Status der Fahrzeug-Komponente
    pub fn vehicle(&self) -> Option<(f32, bool)> {
        self.components.iter().find_map(|c| match c {
            EntityComponent::Vehicle { width, emergency } => Some((*width, *emergency)),
            _ => None,
        })
    }
}
