//! Use-Case: Pfad für einen Akteur in einer gespeicherten Lane-Welt planen.

use anyhow::Result;
use glam::Vec2;
use std::path::Path;

use super::file_io::load_lane_world;
use crate::actor::{request_path, ActorFactory, EActor, Entity};
use crate::core::{LaneFlags, TrafficLaneWorld};
use crate::search::{LanePath, LanePathfinder};
use crate::shared::NavigationOptions;

/// Ergebnis einer Routenplanung
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    /// Gefundener Pfad, `None` wenn das Ziel unerreichbar ist
    pub path: Option<LanePath>,
    /// Lanes, die der Akteur benutzen durfte
    pub allowed_lanes: LaneFlags,
}

/// Pathfinder mit den Grenzen aus den Optionen
pub fn pathfinder_for(options: &NavigationOptions, world: &TrafficLaneWorld) -> LanePathfinder {
    LanePathfinder::new(world)
        .with_max_expansions(options.pathfinder.max_expansions)
        .with_snap_radius(options.pathfinder.snap_radius)
}

/// Plant einen Pfad von der Position des Spielobjekts zum Ziel.
///
/// Der Akteur wird über die Factory erzeugt und danach wieder freigegeben.
pub fn plan_route_in_world(
    options: &NavigationOptions,
    world: &TrafficLaneWorld,
    entity: &Entity,
    goal: Vec2,
) -> Result<RouteOutcome> {
    let mut pathfinder = pathfinder_for(options, world);
    let mut factory = ActorFactory::new();

    let handle = factory.construct_actor(entity);
    let actor = factory.actor(handle)?;
    let outcome = RouteOutcome {
        path: request_path(actor, &mut pathfinder, goal),
        allowed_lanes: actor.allowed_lanes(),
    };
    factory.destruct_actor(handle)?;

    match &outcome.path {
        Some(path) => log::info!(
            "Pfad gefunden: {} Lanes, Länge {:.1}",
            path.lane_ids.len(),
            path.length
        ),
        None => log::info!("Kein Pfad für '{}' gefunden", entity.name),
    }
    Ok(outcome)
}

/// Lädt die Lane-Welt und plant den Pfad
pub fn plan_route(
    options: &NavigationOptions,
    world_path: &Path,
    entity: &Entity,
    goal: Vec2,
) -> Result<RouteOutcome> {
    let world = load_lane_world(options, world_path)?;
    plan_route_in_world(options, &world, entity, goal)
}
