//! Erzeugung und Freigabe von Akteuren.
//!
//! Die Factory besitzt jeden Akteur, den sie erzeugt. Aufrufer halten nur ein
//! [`ActorHandle`]; freigegeben wird ausschließlich über
//! [`ActorFactory::destruct_actor`]. Handles tragen die Kennung ihrer Factory
//! und eine Generation, damit weder eine fremde Factory noch ein
//! wiederverwendeter Slot über ein altes Handle erreichbar ist.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;

use super::entity::{ComponentKind, Entity};
use super::wrapper::{Actor, EActor, EGenericObject, EPerson, EVehicle};

/// Verweis auf einen Akteur in der Factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorHandle {
    factory: u32,
    index: u32,
    generation: u32,
}

impl fmt::Display for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}@{}", self.index, self.generation, self.factory)
    }
}

/// Fortlaufende Kennung je Factory-Instanz
static NEXT_FACTORY_ID: AtomicU32 = AtomicU32::new(1);

/// Fehler beim Zugriff über ein Handle
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActorError {
    #[error("Akteur {0} wurde bereits freigegeben")]
    AlreadyDestroyed(ActorHandle),
    #[error("Akteur {0} stammt nicht aus dieser Factory")]
    UnknownHandle(ActorHandle),
}

type ActorMatcher = Box<dyn Fn(&Entity) -> bool>;
type ActorBuilder = Box<dyn Fn(&Entity) -> Actor>;

/// Zuordnung Spielobjekt → Akteur-Typ
pub struct ActorRule {
    name: String,
    matches: ActorMatcher,
    build: ActorBuilder,
}

impl ActorRule {
    pub fn new(
        name: impl Into<String>,
        matches: impl Fn(&Entity) -> bool + 'static,
        build: impl Fn(&Entity) -> Actor + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            matches: Box::new(matches),
            build: Box::new(build),
        }
    }

    /// Regel, die auf eine Komponenten-Art anspricht
    pub fn for_component(kind: ComponentKind, build: impl Fn(&Entity) -> Actor + 'static) -> Self {
        Self::new(format!("{kind:?}"), move |e| e.has(kind), build)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ActorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRule").field("name", &self.name).finish()
    }
}

/// Beobachter für Erzeugung und Freigabe (Instrumentierung, Tests)
pub trait ActorLifecycleObserver {
    fn on_constructed(&mut self, handle: ActorHandle, actor: &Actor);
    fn on_destructed(&mut self, handle: ActorHandle, actor: &Actor);
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
}

/// Interner Zustand: Regeltabelle, Slots, Freiliste, Beobachter
struct Internal {
    id: u32,
    rules: Vec<ActorRule>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    observer: Option<Box<dyn ActorLifecycleObserver>>,
}

impl Internal {
    fn build(&self, entity: &Entity) -> Actor {
        match self.rules.iter().find(|rule| (rule.matches)(entity)) {
            Some(rule) => {
                log::trace!("Entity {} '{}' → Regel {}", entity.id, entity.name, rule.name);
                (rule.build)(entity)
            }
            None => Actor::GenericObject(EGenericObject::from_entity(entity)),
        }
    }

    fn allocate(&mut self, actor: Actor) -> ActorHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.actor = Some(actor);
            return ActorHandle {
                factory: self.id,
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            actor: Some(actor),
        });
        ActorHandle {
            factory: self.id,
            index,
            generation: 0,
        }
    }

    fn slot(&self, handle: ActorHandle) -> Result<&Slot, ActorError> {
        if handle.factory != self.id {
            return Err(ActorError::UnknownHandle(handle));
        }
        self.slots
            .get(handle.index as usize)
            .ok_or(ActorError::UnknownHandle(handle))
    }

    fn slot_mut(&mut self, handle: ActorHandle) -> Result<&mut Slot, ActorError> {
        if handle.factory != self.id {
            return Err(ActorError::UnknownHandle(handle));
        }
        self.slots
            .get_mut(handle.index as usize)
            .ok_or(ActorError::UnknownHandle(handle))
    }
}

/// Erzeugt Akteure aus Spielobjekten und gibt sie wieder frei
pub struct ActorFactory {
    inner: Internal,
}

impl ActorFactory {
    /// Factory mit Standardregeln: Person → EPerson, Fahrzeug → EVehicle,
    /// alles andere EGenericObject
    pub fn new() -> Self {
        Self {
            inner: Internal {
                id: NEXT_FACTORY_ID.fetch_add(1, Ordering::Relaxed),
                rules: vec![
                    ActorRule::for_component(ComponentKind::Person, |e| {
                        Actor::Person(EPerson::from_entity(e))
                    }),
                    ActorRule::for_component(ComponentKind::Vehicle, |e| {
                        Actor::Vehicle(EVehicle::from_entity(e))
                    }),
                ],
                slots: Vec::new(),
                free: Vec::new(),
                live: 0,
                observer: None,
            },
        }
    }

    /// Setzt den Beobachter (Builder)
    pub fn with_observer(mut self, observer: Box<dyn ActorLifecycleObserver>) -> Self {
        self.inner.observer = Some(observer);
        self
    }

    /// Registriert eine Regel vor allen bestehenden
    pub fn register_rule(&mut self, rule: ActorRule) {
        log::debug!("Akteur-Regel registriert: {}", rule.name);
        self.inner.rules.insert(0, rule);
    }

    /// Erzeugt den Akteur zu einem Spielobjekt; die erste passende Regel gewinnt.
    pub fn construct_actor(&mut self, entity: &Entity) -> ActorHandle {
        let actor = self.inner.build(entity);
        let kind = actor.kind();
        let handle = self.inner.allocate(actor);
        if let (Some(observer), Some(actor)) = (
            self.inner.observer.as_mut(),
            self.inner.slots[handle.index as usize].actor.as_ref(),
        ) {
            observer.on_constructed(handle, actor);
        }
        log::debug!("{} {} für Entity {} erzeugt", kind, handle, entity.id);
        handle
    }

    /// Gibt einen Akteur frei und übergibt ihn dem Aufrufer.
    ///
    /// Ein zweiter Aufruf mit demselben Handle schlägt fehl.
    pub fn destruct_actor(&mut self, handle: ActorHandle) -> Result<Actor, ActorError> {
        let slot = self.inner.slot_mut(handle)?;
        if slot.generation != handle.generation {
            return Err(ActorError::AlreadyDestroyed(handle));
        }
        let actor = slot.actor.take().ok_or(ActorError::AlreadyDestroyed(handle))?;

        self.inner.free.push(handle.index);
        self.inner.live -= 1;
        if let Some(observer) = self.inner.observer.as_mut() {
            observer.on_destructed(handle, &actor);
        }
        log::debug!("{} {} freigegeben", actor.kind(), handle);
        Ok(actor)
    }

    pub fn actor(&self, handle: ActorHandle) -> Result<&Actor, ActorError> {
        let slot = self.inner.slot(handle)?;
        slot.actor
            .as_ref()
            .filter(|_| slot.generation == handle.generation)
            .ok_or(ActorError::AlreadyDestroyed(handle))
    }

    pub fn actor_mut(&mut self, handle: ActorHandle) -> Result<&mut Actor, ActorError> {
        let slot = self.inner.slot_mut(handle)?;
        if slot.generation != handle.generation {
            return Err(ActorError::AlreadyDestroyed(handle));
        }
        slot.actor.as_mut().ok_or(ActorError::AlreadyDestroyed(handle))
    }

    /// Anzahl noch nicht freigegebener Akteure
    pub fn live_actor_count(&self) -> usize {
        self.inner.live
    }

    /// Lebende Akteure mit ihren Handles
    pub fn iter(&self) -> impl Iterator<Item = (ActorHandle, &Actor)> {
        self.inner.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.actor.as_ref().map(|actor| {
                (
                    ActorHandle {
                        factory: self.inner.id,
                        index: index as u32,
                        generation: slot.generation,
                    },
                    actor,
                )
            })
        })
    }
}

impl Default for ActorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ActorFactory {
    fn drop(&mut self) {
        if self.inner.live > 0 {
            log::warn!(
                "ActorFactory wird mit {} nicht freigegebenen Akteuren verworfen",
                self.inner.live
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::entity::EntityComponent;
    use crate::actor::wrapper::ActorKind;
    use glam::Vec2;

    fn person(id: u64) -> Entity {
        Entity::new(id, "Passant", Vec2::ZERO).with_component(EntityComponent::Person)
    }

    #[test]
    fn test_default_rules() {
        let mut factory = ActorFactory::new();
        let vehicle = Entity::new(2, "LF", Vec2::ZERO)
            .with_component(EntityComponent::Movable)
            .with_component(EntityComponent::Vehicle {
                width: 2.5,
                emergency: true,
            });
        let debris = Entity::new(3, "Trümmer", Vec2::ZERO);

        let handles = [
            factory.construct_actor(&person(1)),
            factory.construct_actor(&vehicle),
            factory.construct_actor(&debris),
        ];
        let kinds: Vec<ActorKind> = handles
            .iter()
            .map(|h| factory.actor(*h).expect("Akteur erwartet").kind())
            .collect();
        assert_eq!(
            kinds,
            vec![ActorKind::Person, ActorKind::Vehicle, ActorKind::GenericObject]
        );
        assert_eq!(factory.live_actor_count(), 3);
        assert_eq!(factory.iter().count(), 3);

        for handle in handles {
            factory.destruct_actor(handle).expect("Freigabe erwartet");
        }
        assert_eq!(factory.live_actor_count(), 0);
    }

    #[test]
    fn test_registered_rule_wins() {
        let mut factory = ActorFactory::new();
        factory.register_rule(ActorRule::new(
            "Person als Objekt",
            |e| e.name == "Statue",
            |e| Actor::GenericObject(EGenericObject::from_entity(e)),
        ));

        let mut statue = person(5);
        statue.name = "Statue".into();
        let handle = factory.construct_actor(&statue);
        let actor = factory.destruct_actor(handle).expect("Akteur erwartet");
        assert_eq!(actor.kind(), ActorKind::GenericObject);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut factory = ActorFactory::new();
        let first = factory.construct_actor(&person(1));
        factory.destruct_actor(first).expect("Freigabe erwartet");

        let second = factory.construct_actor(&person(2));
        assert_ne!(first, second);
        assert_eq!(
            factory.actor(first).err(),
            Some(ActorError::AlreadyDestroyed(first))
        );
        assert_eq!(
            factory.destruct_actor(first).err(),
            Some(ActorError::AlreadyDestroyed(first))
        );
        assert_eq!(
            factory.actor(second).map(|a| a.entity_id()).ok(),
            Some(2)
        );

        factory
            .actor_mut(second)
            .expect("Akteur erwartet")
            .set_position(Vec2::new(3.0, 4.0));
        assert_eq!(
            factory.destruct_actor(second).map(|a| a.position()).ok(),
            Some(Vec2::new(3.0, 4.0))
        );
    }

    #[test]
    fn test_foreign_handle_is_unknown() {
        let mut other = ActorFactory::new();
        let foreign = other.construct_actor(&person(1));

        // Gleicher Slot und gleiche Generation in der zweiten Factory
        let mut factory = ActorFactory::new();
        let own = factory.construct_actor(&person(2));
        assert_ne!(foreign, own);

        assert_eq!(
            factory.actor(foreign).err(),
            Some(ActorError::UnknownHandle(foreign))
        );
        assert_eq!(
            factory.actor_mut(foreign).err(),
            Some(ActorError::UnknownHandle(foreign))
        );
        assert_eq!(
            factory.destruct_actor(foreign).err(),
            Some(ActorError::UnknownHandle(foreign))
        );
        assert_eq!(factory.live_actor_count(), 1);
        assert_eq!(factory.actor(own).map(|a| a.entity_id()).ok(), Some(2));

        other.destruct_actor(foreign).expect("Freigabe erwartet");
        factory.destruct_actor(own).expect("Freigabe erwartet");
    }
}
