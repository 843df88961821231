//! Akteure für die Pfadsuche und ihre Factory.
//!
//! - Entity: Spielobjekt mit Komponenten
//! - EActor: Schnittstelle gegenüber der Pfadsuche (EPerson, EVehicle, EGenericObject)
//! - ActorFactory: einziger Besitzer aller Akteure

pub mod entity;
pub mod factory;
pub mod wrapper;

pub use entity::{ComponentKind, Entity, EntityComponent, EntityId};
pub use factory::{ActorError, ActorFactory, ActorHandle, ActorLifecycleObserver, ActorRule};
pub use wrapper::{request_path, Actor, ActorKind, EActor, EGenericObject, EPerson, EVehicle};
