use em5_lane_navigation::core::WorldModelKind;
use em5_lane_navigation::{
    AssetProxy, Lane, LaneDirection, LaneFlags, LaneNode, StreetCrossing, TrafficLaneWorld,
    TrafficLaneWorldBinarySerializer, WorldBounds, WorldModel, WorldModelFormat,
    WorldModelSerializer,
};
use glam::Vec2;

/// Kleinste Welt mit zwei Lanes und einer Kreuzung
fn minimal_world() -> TrafficLaneWorld {
    let mut world = TrafficLaneWorld::new(WorldBounds::from_map_size(100.0));
    world.map_name = Some("Feuerwache".into());
    world.extend_nodes([
        LaneNode::new(1, Vec2::new(0.0, 0.0)),
        LaneNode::new(2, Vec2::new(20.0, 0.0)),
        LaneNode::new(3, Vec2::new(20.0, 15.0)),
    ]);
    world
        .add_lane(Lane::new(
            1,
            1,
            2,
            LaneDirection::Dual,
            LaneFlags::VEHICLE | LaneFlags::PEDESTRIAN,
            4.0,
            Vec2::ZERO,
            Vec2::ZERO,
        ))
        .expect("Lane erwartet");
    world
        .add_lane(Lane::new(
            2,
            2,
            3,
            LaneDirection::Regular,
            LaneFlags::VEHICLE | LaneFlags::EMERGENCY_ONLY,
            3.5,
            Vec2::ZERO,
            Vec2::ZERO,
        ))
        .expect("Lane erwartet");
    world
        .add_crossing(StreetCrossing::new(1, Vec2::new(20.0, 0.0), vec![2]))
        .expect("Kreuzung erwartet");
    world
}

#[test]
fn test_binary_roundtrip_two_lanes_one_crossing() {
    let world = minimal_world();
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&world)
        .expect("Serialisierung fehlgeschlagen");
    let (loaded, version) = TrafficLaneWorldBinarySerializer::deserialize(&bytes)
        .expect("Deserialisierung fehlgeschlagen");

    assert_eq!(version, TrafficLaneWorldBinarySerializer::CURRENT_VERSION);
    assert_eq!(loaded.node_count(), 3);
    assert_eq!(loaded.lane_count(), 2);
    assert_eq!(loaded.crossing_count(), 1);
    assert!(loaded.structurally_equal(&world));
}

#[test]
fn test_json_fixture_matches_built_world() {
    let loaded = WorldModelSerializer::deserialize_bytes(include_bytes!("fixtures/two_lanes.json"))
        .expect("Fixture sollte ladbar sein");

    assert_eq!(loaded.format, WorldModelFormat::Json);
    assert!(!loaded.needs_reserialize);
    assert_eq!(loaded.model.kind(), WorldModelKind::TrafficLanes);
    let world = loaded.model.into_traffic_lane_world().expect("Lane-Welt erwartet");
    assert!(world.structurally_equal(&minimal_world()));
}

#[test]
fn test_file_naming_selects_format() {
    let dir = tempfile::tempdir().expect("Temp-Verzeichnis erwartet");
    let model = WorldModel::from(minimal_world());

    let json_path = dir.path().join("welt.json");
    let binary_path = dir.path().join("welt.tlw");
    WorldModelSerializer::serialize_to_file(&model, &json_path)
        .expect("JSON-Speichern fehlgeschlagen");
    WorldModelSerializer::serialize_to_file(&model, &binary_path)
        .expect("Binär-Speichern fehlgeschlagen");

    let json = std::fs::read(&json_path).expect("Lesen erwartet");
    let binary = std::fs::read(&binary_path).expect("Lesen erwartet");
    assert_eq!(json.first(), Some(&b'{'));
    assert_eq!(&binary[..4], b"TLWB");

    for path in [json_path, binary_path] {
        let loaded = WorldModelSerializer::deserialize_from_file(&AssetProxy::from_path(&path))
            .expect("Laden fehlgeschlagen");
        let world = loaded.model.into_traffic_lane_world().expect("Lane-Welt erwartet");
        assert!(world.structurally_equal(&minimal_world()));
    }
}

#[test]
fn test_asset_in_base_directory() {
    let dir = tempfile::tempdir().expect("Temp-Verzeichnis erwartet");
    let asset = AssetProxy::new("em5/feuerwache", dir.path(), "navigation/feuerwache.tlw");

    WorldModelSerializer::serialize_to_file(&WorldModel::from(minimal_world()), &asset.local_path())
        .expect("Speichern fehlgeschlagen");
    let loaded = WorldModelSerializer::deserialize_from_file(&asset).expect("Laden fehlgeschlagen");

    assert_eq!(loaded.format, asset.format());
    assert_eq!(
        loaded.model.as_traffic_lane_world().map(|w| w.lane_count()),
        Some(2)
    );
}
