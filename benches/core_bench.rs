use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use em5_lane_navigation::creator::{CollisionEntity, ObstacleShape};
use em5_lane_navigation::{
    Lane, LaneDirection, LaneFlags, LaneNode, LaneWorldCreationSettings, LanePathfinder, MapScene,
    PathRequest, TrafficLaneWorld, TrafficLaneWorldBinarySerializer, VoronoiLaneWorldCreator,
    WorldBounds,
};
use glam::Vec2;
use std::hint::black_box;

/// Gitter aus `side` x `side` Nodes, Nachbarn mit Dual-Lanes verbunden
fn build_grid_world(side: u64) -> TrafficLaneWorld {
    let mut world = TrafficLaneWorld::new(WorldBounds::new(
        Vec2::ZERO,
        Vec2::splat(side as f32 * 10.0),
    ));
    let id = |x: u64, z: u64| z * side + x + 1;

    world.extend_nodes((0..side * side).map(|i| {
        let (x, z) = (i % side, i / side);
        LaneNode::new(i + 1, Vec2::new(x as f32 * 10.0, z as f32 * 10.0))
    }));

    let mut lane_id = 1;
    for z in 0..side {
        for x in 0..side {
            let mut neighbors = Vec::with_capacity(2);
            if x + 1 < side {
                neighbors.push(id(x + 1, z));
            }
            if z + 1 < side {
                neighbors.push(id(x, z + 1));
            }
            for other in neighbors {
                world
                    .add_lane(Lane::new(
                        lane_id,
                        id(x, z),
                        other,
                        LaneDirection::Dual,
                        LaneFlags::VEHICLE | LaneFlags::PEDESTRIAN,
                        3.0,
                        Vec2::ZERO,
                        Vec2::ZERO,
                    ))
                    .expect("Lane erwartet");
                lane_id += 1;
            }
        }
    }
    world
}

fn bench_pathfinding(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathfinding");

    for &side in &[32u64, 128u64] {
        let world = build_grid_world(side);
        let mut finder = LanePathfinder::new(&world);
        let goal = side * side;
        let request = PathRequest::vehicle(2.0);

        group.bench_with_input(BenchmarkId::new("corner_to_corner", side), &goal, |b, goal| {
            b.iter(|| {
                let path = finder.find_path(black_box(1), black_box(*goal), &request);
                black_box(path.map(|p| p.lane_ids.len()))
            })
        });
    }

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let world = build_grid_world(128);
    let bytes = TrafficLaneWorldBinarySerializer::serialize(&world).expect("Bytes erwartet");

    c.bench_function("binary_serialize_128", |b| {
        b.iter(|| {
            let bytes = TrafficLaneWorldBinarySerializer::serialize(black_box(&world))
                .expect("Bytes erwartet");
            black_box(bytes.len())
        })
    });

    c.bench_function("binary_deserialize_128", |b| {
        b.iter(|| {
            let (world, _) = TrafficLaneWorldBinarySerializer::deserialize(black_box(&bytes))
                .expect("Welt erwartet");
            black_box(world.lane_count())
        })
    });
}

fn bench_creation(c: &mut Criterion) {
    let mut settings =
        LaneWorldCreationSettings::for_bounds(WorldBounds::new(Vec2::ZERO, Vec2::splat(200.0)));
    settings.cell_size = 1.0;
    let creator = VoronoiLaneWorldCreator::new(settings);

    // Häuserblöcke im Raster mit 10m breiten Straßen
    let scene = MapScene {
        name: Some("Blöcke".into()),
        bounds: None,
        entities: (0..36)
            .map(|i| {
                let min = Vec2::new((i % 6) as f32 * 33.0 + 5.0, (i / 6) as f32 * 33.0 + 5.0);
                CollisionEntity::new(
                    format!("block_{i}"),
                    ObstacleShape::Rect {
                        min,
                        max: min + Vec2::splat(23.0),
                    },
                )
            })
            .collect(),
    };

    c.bench_function("voronoi_create_city_blocks", |b| {
        b.iter(|| {
            let world = creator
                .create_traffic_lane_world(black_box(&scene))
                .expect("Erzeugung erwartet");
            black_box(world.lane_count())
        })
    });
}

criterion_group!(
    core_benches,
    bench_pathfinding,
    bench_serialization,
    bench_creation
);
criterion_main!(core_benches);
