//! EMERGENCY-5 Lane-Navigation.
//! Lane-Welt-Erzeugung, Serialisierung, Suchraum und Akteure als Library für
//! Werkzeug, Tests und Benchmarks.

pub mod actor;
pub mod app;
pub mod core;
pub mod creator;
pub mod search;
pub mod serialization;
pub mod shared;

pub use actor::{
    request_path, Actor, ActorError, ActorFactory, ActorHandle, EActor, EGenericObject, EPerson,
    EVehicle, Entity, EntityComponent,
};
pub use core::{
    Lane, LaneDirection, LaneFlags, LaneNode, SpatialIndex, SpatialMatch, StreetCrossing,
    TrafficLaneWorld, WorldBounds, WorldModel,
};
pub use creator::{LaneWorldCreationSettings, MapScene, VoronoiLaneWorldCreator};
pub use search::{LanePath, LanePathfinder, PathRequest, SearchSpaceError, StaticSearchSpace};
pub use serialization::{
    AssetProxy, DeserializedWorldModel, SerializationError, TrafficLaneWorldBinarySerializer,
    WorldModelFormat, WorldModelSerializer,
};
pub use shared::NavigationOptions;
