//! Persistenz von Weltmodellen: versioniertes Binärformat und JSON.

pub mod asset;
pub mod binary;
pub mod error;
pub mod json;
mod world_data;
pub mod world_model_serializer;

pub use asset::{AssetProxy, WorldModelFormat};
pub use binary::TrafficLaneWorldBinarySerializer;
pub use error::SerializationError;
pub use json::TrafficLaneWorldJsonSerializer;
pub use world_data::FULL_FLAGS_VERSION;
pub use world_model_serializer::{DeserializedWorldModel, WorldModelSerializer};
