//! Versioniertes Binärformat für `TrafficLaneWorld`.
//!
//! Aufbau (Little-Endian):
//!
//! ```text
//! "TLWB"  u32 version
//! u32 len + UTF-8             Map-Name (len 0 = keiner)
//! 4 x f32                     min_x, min_z, max_x, max_z
//! u32 n, n x (u64 id, f32 x, f32 z)
//! u32 n, n x (u64 id, u64 start, u64 end, u8 direction, f32 width, u32 flags)
//! ab v2: u32 n, n x (u64 id, f32 cx, f32 cz, u32 k, k x u64 node)
//! ```
//!
//! Versionen: v1 ohne Kreuzungen, v2 mit Kreuzungen, v3 wie v2 mit allen
//! Lane-Flags (ältere Dateien nur Fahrzeug/Fußgänger). Jede Änderung am
//! Aufbau erhöht [`TrafficLaneWorldBinarySerializer::CURRENT_VERSION`].

mod reader;
#[cfg(test)]
mod tests;

use glam::Vec2;
use std::io::Write;

use self::reader::ByteReader;
use super::error::SerializationError;
use super::world_data::{RawLane, WorldData};
use crate::core::{LaneDirection, StreetCrossing, TrafficLaneWorld};

/// Dateikennung
pub const MAGIC: [u8; 4] = *b"TLWB";

/// Ab dieser Version gibt es den Kreuzungs-Abschnitt
const CROSSINGS_VERSION: u32 = 2;

const NODE_SIZE: usize = 8 + 4 + 4;
const LANE_SIZE: usize = 8 + 8 + 8 + 1 + 4 + 4;
const CROSSING_MIN_SIZE: usize = 8 + 4 + 4 + 4;

/// Binär-(De-)Serialisierer für Lane-Welten
pub struct TrafficLaneWorldBinarySerializer;

impl TrafficLaneWorldBinarySerializer {
    /// Version, in der geschrieben wird
    pub const CURRENT_VERSION: u32 = 3;
    /// Älteste noch lesbare Version
    pub const MIN_SUPPORTED_VERSION: u32 = 1;

    /// Serialisiert in einen neuen Puffer
    pub fn serialize(world: &TrafficLaneWorld) -> Result<Vec<u8>, SerializationError> {
        let mut out = Vec::with_capacity(
            32 + world.node_count() * NODE_SIZE + world.lane_count() * LANE_SIZE,
        );
        Self::serialize_into(world, &mut out)?;
        Ok(out)
    }

    /// Serialisiert in einen beliebigen Writer (immer in der aktuellen Version)
    pub fn serialize_into<W: Write>(
        world: &TrafficLaneWorld,
        out: &mut W,
    ) -> Result<(), SerializationError> {
        let data = WorldData::from_world(world);

        out.write_all(&MAGIC)?;
        out.write_all(&Self::CURRENT_VERSION.to_le_bytes())?;

        let name = data.map_name.as_deref().unwrap_or("");
        write_len(out, name.len(), "Map-Name")?;
        out.write_all(name.as_bytes())?;

        for v in [
            data.bounds.min_x,
            data.bounds.min_z,
            data.bounds.max_x,
            data.bounds.max_z,
        ] {
            out.write_all(&v.to_le_bytes())?;
        }

        write_len(out, data.nodes.len(), "Nodes")?;
        for (id, position) in &data.nodes {
            out.write_all(&id.to_le_bytes())?;
            out.write_all(&position.x.to_le_bytes())?;
            out.write_all(&position.y.to_le_bytes())?;
        }

        write_len(out, data.lanes.len(), "Lanes")?;
        for lane in &data.lanes {
            out.write_all(&lane.id.to_le_bytes())?;
            out.write_all(&lane.start_id.to_le_bytes())?;
            out.write_all(&lane.end_id.to_le_bytes())?;
            out.write_all(&[lane.direction.to_u8()])?;
            out.write_all(&lane.width.to_le_bytes())?;
            out.write_all(&lane.flags.to_le_bytes())?;
        }

        write_len(out, data.crossings.len(), "Kreuzungen")?;
        for crossing in &data.crossings {
            out.write_all(&crossing.id.to_le_bytes())?;
            out.write_all(&crossing.center.x.to_le_bytes())?;
            out.write_all(&crossing.center.y.to_le_bytes())?;
            write_len(out, crossing.node_ids.len(), "Kreuzungs-Nodes")?;
            for node_id in &crossing.node_ids {
                out.write_all(&node_id.to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Liest eine Lane-Welt und die gespeicherte Version.
    ///
    /// Jede Abweichung vom Format ist ein Fehler; ältere Versionen werden
    /// gelesen und nicht als Fehler behandelt.
    pub fn deserialize(bytes: &[u8]) -> Result<(TrafficLaneWorld, u32), SerializationError> {
        let mut r = ByteReader::new(bytes);

        let version = read_header(&mut r)?;
        if !(Self::MIN_SUPPORTED_VERSION..=Self::CURRENT_VERSION).contains(&version) {
            return Err(SerializationError::UnsupportedVersion {
                found: version,
                min: Self::MIN_SUPPORTED_VERSION,
                max: Self::CURRENT_VERSION,
            });
        }

        let mut data = WorldData {
            map_name: r.string("Map-Name")?,
            ..WorldData::default()
        };
        data.bounds.min_x = r.f32("Weltbereich")?;
        data.bounds.min_z = r.f32("Weltbereich")?;
        data.bounds.max_x = r.f32("Weltbereich")?;
        data.bounds.max_z = r.f32("Weltbereich")?;

        let node_count = r.count(NODE_SIZE, "Nodes")?;
        data.nodes.reserve_exact(node_count);
        for _ in 0..node_count {
            let id = r.u64("Node")?;
            let x = r.f32("Node")?;
            let z = r.f32("Node")?;
            data.nodes.push((id, Vec2::new(x, z)));
        }

        let lane_count = r.count(LANE_SIZE, "Lanes")?;
        data.lanes.reserve_exact(lane_count);
        for _ in 0..lane_count {
            let id = r.u64("Lane")?;
            let start_id = r.u64("Lane")?;
            let end_id = r.u64("Lane")?;
            let raw_direction = r.u8("Lane")?;
            let direction = LaneDirection::from_u8(raw_direction).ok_or_else(|| {
                SerializationError::malformed(format!(
                    "Lane {id}: ungueltige Richtung {raw_direction}"
                ))
            })?;
            let width = r.f32("Lane")?;
            let flags = r.u32("Lane")?;
            data.lanes.push(RawLane {
                id,
                start_id,
                end_id,
                direction,
                width,
                flags,
            });
        }

        if version >= CROSSINGS_VERSION {
            let crossing_count = r.count(CROSSING_MIN_SIZE, "Kreuzungen")?;
            data.crossings.reserve_exact(crossing_count);
            for _ in 0..crossing_count {
                let id = r.u64("Kreuzung")?;
                let cx = r.f32("Kreuzung")?;
                let cz = r.f32("Kreuzung")?;
                let member_count = r.count(8, "Kreuzungs-Nodes")?;
                let mut node_ids = Vec::with_capacity(member_count);
                for _ in 0..member_count {
                    node_ids.push(r.u64("Kreuzungs-Nodes")?);
                }
                data.crossings
                    .push(StreetCrossing::new(id, Vec2::new(cx, cz), node_ids));
            }
        }

        r.finish()?;
        let world = data.into_world(version)?;
        log::debug!(
            "Binaere Lane-Welt gelesen: v{}, {} Nodes, {} Lanes, {} Kreuzungen",
            version,
            world.node_count(),
            world.lane_count(),
            world.crossing_count()
        );
        Ok((world, version))
    }

    /// Gespeicherte Version lesen, ohne den Rest zu prüfen
    pub fn peek_version(bytes: &[u8]) -> Result<u32, SerializationError> {
        read_header(&mut ByteReader::new(bytes))
    }
}

fn read_header(r: &mut ByteReader<'_>) -> Result<u32, SerializationError> {
    let mut found = [0u8; 4];
    found.copy_from_slice(r.take(4, "Kennung")?);
    if found != MAGIC {
        return Err(SerializationError::InvalidMagic { found });
    }
    r.u32("Version")
}

fn write_len<W: Write>(out: &mut W, len: usize, what: &str) -> Result<(), SerializationError> {
    let len = u32::try_from(len).map_err(|_| {
        SerializationError::malformed(format!("{what}: {len} Elemente passen nicht ins Format"))
    })?;
    out.write_all(&len.to_le_bytes())?;
    Ok(())
}
