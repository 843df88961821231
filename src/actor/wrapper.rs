//! Navigierbare Akteure: Personen, Fahrzeuge und sonstige Objekte.

use std::fmt;

use glam::Vec2;

use super::entity::{Entity, EntityId};
use crate::core::LaneFlags;
use crate::search::{LanePath, LanePathfinder, PathRequest};

/// Radius, wenn ein Objekt keine Kollisions-Komponente hat
pub const DEFAULT_PERSON_RADIUS: f32 = 0.4;
/// Radius sonstiger Objekte ohne Kollisions-Komponente
pub const DEFAULT_OBJECT_RADIUS: f32 = 0.5;

/// Art eines Akteurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Person,
    Vehicle,
    GenericObject,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person => write!(f, "Person"),
            Self::Vehicle => write!(f, "Fahrzeug"),
            Self::GenericObject => write!(f, "Objekt"),
        }
    }
}

/// Gemeinsame Schnittstelle aller Akteure gegenüber der Pfadsuche
pub trait EActor {
    /// Zugehöriges Spielobjekt
    fn entity_id(&self) -> EntityId;
    fn kind(&self) -> ActorKind;
    fn position(&self) -> Vec2;
    fn radius(&self) -> f32;
    /// Lanes, die der Akteur benutzen darf (leer = nicht navigierbar)
    fn allowed_lanes(&self) -> LaneFlags;
    fn path_request(&self) -> PathRequest;

    fn is_navigable(&self) -> bool {
        !self.allowed_lanes().is_empty()
    }
}

/// Fußgänger
#[derive(Debug, Clone, PartialEq)]
pub struct EPerson {
    entity_id: EntityId,
    position: Vec2,
    radius: f32,
}

impl EPerson {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            entity_id: entity.id,
            position: entity.position,
            radius: entity.collision_radius().unwrap_or(DEFAULT_PERSON_RADIUS),
        }
    }
}

impl EActor for EPerson {
    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Person
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn allowed_lanes(&self) -> LaneFlags {
        LaneFlags::PEDESTRIAN
    }

    fn path_request(&self) -> PathRequest {
        PathRequest::pedestrian()
    }
}

/// Fahrzeug; die Karosseriebreite ist die minimale Lane-Breite.
#[derive(Debug, Clone, PartialEq)]
pub struct EVehicle {
    entity_id: EntityId,
    position: Vec2,
    width: f32,
    emergency: bool,
    radius: f32,
}

impl EVehicle {
    pub fn from_entity(entity: &Entity) -> Self {
        let (width, emergency) = entity.vehicle().unwrap_or((0.0, false));
        Self {
            entity_id: entity.id,
            position: entity.position,
            width,
            emergency,
            radius: entity.collision_radius().unwrap_or(width * 0.5),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency
    }
}

impl EActor for EVehicle {
    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn kind(&self) -> ActorKind {
        ActorKind::Vehicle
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn allowed_lanes(&self) -> LaneFlags {
        self.path_request().allowed
    }

    fn path_request(&self) -> PathRequest {
        if self.emergency {
            PathRequest::emergency_vehicle(self.width)
        } else {
            PathRequest::vehicle(self.width)
        }
    }
}

/// Objekt ohne Navigationsrolle (Kisten, Trümmer, Deko)
#[derive(Debug, Clone, PartialEq)]
pub struct EGenericObject {
    entity_id: EntityId,
    position: Vec2,
    radius: f32,
}

impl EGenericObject {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            entity_id: entity.id,
            position: entity.position,
            radius: entity.collision_radius().unwrap_or(DEFAULT_OBJECT_RADIUS),
        }
    }
}

impl EActor for EGenericObject {
    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn kind(&self) -> ActorKind {
        ActorKind::GenericObject
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn allowed_lanes(&self) -> LaneFlags {
        LaneFlags::NONE
    }

    fn path_request(&self) -> PathRequest {
        PathRequest {
            allowed: LaneFlags::NONE,
            min_width: f32::INFINITY,
        }
    }
}

/// Von der Factory verwalteter Akteur
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Person(EPerson),
    Vehicle(EVehicle),
    GenericObject(EGenericObject),
}

impl Actor {
    fn inner(&self) -> &dyn EActor {
        match self {
            Self::Person(a) => a,
            Self::Vehicle(a) => a,
            Self::GenericObject(a) => a,
        }
    }

    /// Versetzt den Akteur (z.B. nach einem Simulationsschritt)
    pub fn set_position(&mut self, position: Vec2) {
        match self {
            Self::Person(a) => a.position = position,
            Self::Vehicle(a) => a.position = position,
            Self::GenericObject(a) => a.position = position,
        }
    }
}

impl EActor for Actor {
    fn entity_id(&self) -> EntityId {
        self.inner().entity_id()
    }

    fn kind(&self) -> ActorKind {
        self.inner().kind()
    }

    fn position(&self) -> Vec2 {
        self.inner().position()
    }

    fn radius(&self) -> f32 {
        self.inner().radius()
    }

    fn allowed_lanes(&self) -> LaneFlags {
        self.inner().allowed_lanes()
    }

    fn path_request(&self) -> PathRequest {
        self.inner().path_request()
    }
}

/// Plant einen Pfad von der Akteur-Position zum Ziel.
///
/// Nicht navigierbare Akteure bekommen nie einen Pfad.
pub fn request_path(
    actor: &dyn EActor,
    pathfinder: &mut LanePathfinder,
    goal: Vec2,
) -> Option<LanePath> {
    if !actor.is_navigable() {
        log::debug!(
            "{} {} ist nicht navigierbar, keine Pfadsuche",
            actor.kind(),
            actor.entity_id()
        );
        return None;
    }
    let path = pathfinder.find_path_between(actor.position(), goal, &actor.path_request());
    if path.is_none() {
        log::debug!(
            "Kein Pfad für {} {} nach ({:.1}, {:.1})",
            actor.kind(),
            actor.entity_id(),
            goal.x,
            goal.y
        );
    }
    path
}
