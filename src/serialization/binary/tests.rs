use super::*;
use crate::core::{Lane, LaneFlags, LaneNode, WorldBounds};

fn sample_world() -> TrafficLaneWorld {
    let mut world = TrafficLaneWorld::new(WorldBounds::from_map_size(200.0));
    world.map_name = Some("Münchner Altstadt".into());
    world.extend_nodes([
        LaneNode::new(1, Vec2::new(0.0, 0.0)),
        LaneNode::new(2, Vec2::new(10.0, 0.0)),
        LaneNode::new(5, Vec2::new(10.0, 7.5)),
    ]);
    world
        .add_lane(Lane::new(
            10,
            1,
            2,
            LaneDirection::Dual,
            LaneFlags::VEHICLE | LaneFlags::PEDESTRIAN,
            4.0,
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
        ))
        .expect("Lane erwartet");
    world
        .add_lane(Lane::new(
            11,
            2,
            5,
            LaneDirection::Reverse,
            LaneFlags::VEHICLE | LaneFlags::EMERGENCY_ONLY,
            3.5,
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 7.5),
        ))
        .expect("Lane erwartet");
    world
        .add_crossing(StreetCrossing::new(1, Vec2::new(10.0, 0.0), vec![2, 5]))
        .expect("Kreuzung erwartet");
    world
}

fn with_version(mut bytes: Vec<u8>, version: u32) -> Vec<u8> {
    bytes[4..8].copy_from_slice(&version.to_le_bytes());
    bytes
}

#[test]
fn test_roundtrip_two_lanes_one_crossing() {
    let world = sample_world();
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&world)
        .expect("Serialisierung erwartet");

    let (loaded, version) =
        TrafficLaneWorldBinarySerializer::deserialize(&bytes).expect("Deserialisierung erwartet");

    assert_eq!(version, TrafficLaneWorldBinarySerializer::CURRENT_VERSION);
    assert!(loaded.structurally_equal(&world));
    assert_eq!(loaded.lane_count(), 2);
    assert_eq!(loaded.crossing_count(), 1);
    assert_eq!(loaded.find_lane(11).map(|l| l.length), Some(7.5));
    assert_eq!(loaded.nearest_node(Vec2::new(9.0, 7.0)).map(|m| m.node_id), Some(5));
}

#[test]
fn test_serialization_is_deterministic() {
    let a = TrafficLaneWorldBinarySerializer::serialize(&sample_world()).expect("Bytes erwartet");
    let b = TrafficLaneWorldBinarySerializer::serialize(&sample_world()).expect("Bytes erwartet");
    assert_eq!(a, b);
    assert_eq!(&a[..4], b"TLWB");
}

#[test]
fn test_empty_world_roundtrip() {
    let world = TrafficLaneWorld::default();
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&world).expect("Bytes erwartet");
    let (loaded, _) = TrafficLaneWorldBinarySerializer::deserialize(&bytes).expect("Welt erwartet");
    assert!(loaded.is_empty());
    assert!(loaded.map_name.is_none());
    assert_eq!(loaded.bounds, world.bounds);
}

#[test]
fn test_older_version_masks_new_flags() {
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&sample_world())
        .expect("Bytes erwartet");
    let (loaded, version) = TrafficLaneWorldBinarySerializer::deserialize(&with_version(bytes, 2))
        .expect("Welt erwartet");

    assert_eq!(version, 2);
    assert_eq!(loaded.find_lane(11).map(|l| l.flags), Some(LaneFlags::VEHICLE));
}

#[test]
fn test_version_one_has_no_crossing_section() {
    let mut world = TrafficLaneWorld::new(WorldBounds::from_map_size(50.0));
    world.extend_nodes([
        LaneNode::new(1, Vec2::ZERO),
        LaneNode::new(2, Vec2::new(0.0, 5.0)),
    ]);
    world
        .add_lane(Lane::new(
            1,
            1,
            2,
            LaneDirection::Regular,
            LaneFlags::PEDESTRIAN,
            2.0,
            Vec2::ZERO,
            Vec2::new(0.0, 5.0),
        ))
        .expect("Lane erwartet");
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&world).expect("Bytes erwartet");

    // v1: Kreuzungs-Zähler (4 Bytes, Wert 0) am Ende entfernen
    let mut v1 = with_version(bytes, 1);
    assert_eq!(&v1[v1.len() - 4..], &0u32.to_le_bytes());
    v1.truncate(v1.len() - 4);

    let (loaded, version) = TrafficLaneWorldBinarySerializer::deserialize(&v1)
        .expect("Welt erwartet");
    assert_eq!(version, 1);
    assert_eq!(loaded.lane_count(), 1);
    assert_eq!(loaded.crossing_count(), 0);
}

#[test]
fn test_rejects_bad_header() {
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&sample_world())
        .expect("Bytes erwartet");

    let mut bad_magic = bytes.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        TrafficLaneWorldBinarySerializer::deserialize(&bad_magic),
        Err(SerializationError::InvalidMagic { .. })
    ));

    for version in [0, TrafficLaneWorldBinarySerializer::CURRENT_VERSION + 1, u32::MAX] {
        assert!(matches!(
            TrafficLaneWorldBinarySerializer::deserialize(&with_version(bytes.clone(), version)),
            Err(SerializationError::UnsupportedVersion { found, .. }) if found == version
        ));
    }

    assert!(matches!(
        TrafficLaneWorldBinarySerializer::deserialize(b"TL"),
        Err(SerializationError::Truncated { .. })
    ));
}

#[test]
fn test_every_truncation_fails() {
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&sample_world())
        .expect("Bytes erwartet");
    for len in 0..bytes.len() {
        assert!(
            TrafficLaneWorldBinarySerializer::deserialize(&bytes[..len]).is_err(),
            "Abgeschnitten auf {len} Bytes muss fehlschlagen"
        );
    }
}

#[test]
fn test_trailing_bytes_fail() {
    let mut bytes = TrafficLaneWorldBinarySerializer::serialize(&sample_world())
        .expect("Bytes erwartet");
    bytes.push(0);
    assert!(matches!(
        TrafficLaneWorldBinarySerializer::deserialize(&bytes),
        Err(SerializationError::TrailingBytes(1))
    ));
}

#[test]
fn test_huge_count_does_not_allocate() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&3u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    for v in [0.0f32, 0.0, 1.0, 1.0] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());

    assert!(matches!(
        TrafficLaneWorldBinarySerializer::deserialize(&bytes),
        Err(SerializationError::Truncated { context: "Nodes", .. })
    ));
}

#[test]
fn test_invalid_direction_and_utf8_fail() {
    let world = sample_world();
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&world).expect("Bytes erwartet");

    // Map-Name beginnt bei Offset 12; erstes Byte durch ungültiges UTF-8 ersetzen
    let mut bad_name = bytes.clone();
    bad_name[12] = 0xFF;
    assert!(matches!(
        TrafficLaneWorldBinarySerializer::deserialize(&bad_name),
        Err(SerializationError::Malformed(_))
    ));

    // Richtungsbyte der ersten Lane
    let name_len = world.map_name.as_ref().map(|n| n.len()).unwrap_or(0);
    let lanes_start = 8 + 4 + name_len + 16 + 4 + 3 * NODE_SIZE + 4;
    let mut bad_direction = bytes;
    bad_direction[lanes_start + 24] = 7;
    assert!(matches!(
        TrafficLaneWorldBinarySerializer::deserialize(&bad_direction),
        Err(SerializationError::Malformed(_))
    ));
}

#[test]
fn test_non_finite_crossing_center_fails() {
    let mut world = TrafficLaneWorld::new(WorldBounds::from_map_size(200.0));
    world.extend_nodes([LaneNode::new(1, Vec2::new(0.0, 0.0))]);
    world
        .add_crossing(StreetCrossing::new(3, Vec2::new(f32::NAN, 2.0), vec![1]))
        .expect("Kreuzung erwartet");
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&world).expect("Bytes erwartet");

    match TrafficLaneWorldBinarySerializer::deserialize(&bytes) {
        Err(SerializationError::Malformed(message)) => assert!(message.contains("Kreuzung 3")),
        other => panic!("Malformed erwartet, erhalten: {other:?}"),
    }
}

#[test]
fn test_peek_version() {
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&sample_world())
        .expect("Bytes erwartet");
    assert_eq!(
        TrafficLaneWorldBinarySerializer::peek_version(&with_version(bytes, 42)).ok(),
        Some(42)
    );
}
