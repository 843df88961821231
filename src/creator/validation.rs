//! Prüfung einer Lane-Welt gegen Abbiege-Vorgaben.
//!
//! Die Prüfung verändert nichts, sie liefert nur einen Bericht.

use std::fmt;

use super::settings::TurningConstraintSettings;
use crate::core::{LaneFlags, TrafficLaneWorld};

/// Art einer Verletzung
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurningViolationKind {
    /// Richtungsänderung an einem Node zu groß
    SharpTurn {
        /// Winkel in Grad (0 = geradeaus)
        angle_deg: f32,
    },
    /// Lane kürzer als erlaubt
    ShortLane {
        /// Länge
        length: f32,
    },
    /// Lane schmaler als erlaubt
    NarrowLane {
        /// Breite
        width: f32,
    },
}

/// Eine einzelne Verletzung
#[derive(Debug, Clone, PartialEq)]
pub struct TurningViolation {
    /// Betroffener Node (nur bei Abbiegungen)
    pub node_id: Option<u64>,
    /// Betroffene Lanes
    pub lane_ids: Vec<u64>,
    /// Art
    pub kind: TurningViolationKind,
}

impl fmt::Display for TurningViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TurningViolationKind::SharpTurn { angle_deg } => write!(
                f,
                "Node {}: Abbiegung {:.1} Grad zwischen Lanes {:?}",
                self.node_id.unwrap_or_default(),
                angle_deg,
                self.lane_ids
            ),
            TurningViolationKind::ShortLane { length } => {
                write!(f, "Lane {:?}: zu kurz ({:.2})", self.lane_ids, length)
            }
            TurningViolationKind::NarrowLane { width } => {
                write!(f, "Lane {:?}: zu schmal ({:.2})", self.lane_ids, width)
            }
        }
    }
}

/// Ergebnis der Prüfung
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Alle Verletzungen, Lane-Prüfungen zuerst, dann Abbiegungen nach Node-ID
    pub violations: Vec<TurningViolation>,
    /// Anzahl geprüfter Lanes
    pub checked_lanes: usize,
    /// Anzahl geprüfter Abbiegungen
    pub checked_turns: usize,
}

impl ValidationReport {
    /// Keine Verletzungen?
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Nur die Abbiege-Verletzungen
    pub fn sharp_turns(&self) -> impl Iterator<Item = &TurningViolation> {
        self.violations
            .iter()
            .filter(|v| matches!(v.kind, TurningViolationKind::SharpTurn { .. }))
    }
}

/// Prüft alle nicht gesperrten Lanes und alle Abbiegungen zwischen ihnen
pub fn validate_turning_constraints(
    world: &TrafficLaneWorld,
    constraints: &TurningConstraintSettings,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for lane in world.sorted_lanes() {
        if lane.flags.contains(LaneFlags::BLOCKED) {
            continue;
        }
        report.checked_lanes += 1;
        if lane.length < constraints.min_lane_length {
            report.violations.push(TurningViolation {
                node_id: None,
                lane_ids: vec![lane.id],
                kind: TurningViolationKind::ShortLane {
                    length: lane.length,
                },
            });
        }
        if lane.width < constraints.min_lane_width {
            report.violations.push(TurningViolation {
                node_id: None,
                lane_ids: vec![lane.id],
                kind: TurningViolationKind::NarrowLane { width: lane.width },
            });
        }
    }

    let incidence = world.lane_incidence();
    for node_id in world.sorted_node_ids() {
        let (Some(node), Some(lanes)) = (world.node(node_id), incidence.get(&node_id)) else {
            continue;
        };
        let center = node.position;
        let lanes: Vec<_> = lanes
            .iter()
            .copied()
            .filter(|l| !l.flags.contains(LaneFlags::BLOCKED))
            .collect();

        for (i, first) in lanes.iter().enumerate() {
            for second in &lanes[i + 1..] {
                let (Some(a), Some(b)) = (first.other_end(node_id), second.other_end(node_id))
                else {
                    continue;
                };
                // a → node → b oder b → node → a muss befahrbar sein
                let forward = first.is_traversable_from(a) && second.is_traversable_from(node_id);
                let backward = second.is_traversable_from(b) && first.is_traversable_from(node_id);
                if !forward && !backward {
                    continue;
                }
                let (Some(pa), Some(pb)) = (world.node(a), world.node(b)) else {
                    continue;
                };
                let incoming = center - pa.position;
                let outgoing = pb.position - center;
                if incoming.length_squared() <= f32::EPSILON
                    || outgoing.length_squared() <= f32::EPSILON
                {
                    continue;
                }

                report.checked_turns += 1;
                let angle_deg = incoming.angle_to(outgoing).abs().to_degrees();
                if angle_deg > constraints.max_turn_angle_deg {
                    report.violations.push(TurningViolation {
                        node_id: Some(node_id),
                        lane_ids: vec![first.id, second.id],
                        kind: TurningViolationKind::SharpTurn { angle_deg },
                    });
                }
            }
        }
    }

    if !report.is_valid() {
        log::warn!(
            "{} Verletzungen der Abbiege-Vorgaben ({} Lanes, {} Abbiegungen geprueft)",
            report.violations.len(),
            report.checked_lanes,
            report.checked_turns
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Lane, LaneDirection, LaneNode, WorldBounds};
    use glam::Vec2;

    type LaneSpec = (u64, u64, u64, LaneDirection, f32);

    fn world(points: &[(u64, Vec2)], lanes: &[LaneSpec]) -> TrafficLaneWorld {
        let mut world = TrafficLaneWorld::new(WorldBounds::default());
        world.extend_nodes(points.iter().map(|(id, p)| LaneNode::new(*id, *p)));
        for &(id, a, b, dir, width) in lanes {
            let pa = world.node(a).map(|n| n.position).expect("Node a erwartet");
            let pb = world.node(b).map(|n| n.position).expect("Node b erwartet");
            world
                .add_lane(Lane::new(id, a, b, dir, LaneFlags::VEHICLE, width, pa, pb))
                .expect("Lane erwartet");
        }
        world
    }

    #[test]
    fn test_straight_line_is_valid() {
        let w = world(
            &[(1, Vec2::ZERO), (2, Vec2::new(10.0, 0.0)), (3, Vec2::new(20.0, 0.0))],
            &[(1, 1, 2, LaneDirection::Dual, 3.0), (2, 2, 3, LaneDirection::Dual, 3.0)],
        );
        let report = validate_turning_constraints(&w, &TurningConstraintSettings::default());
        assert!(report.is_valid());
        assert_eq!(report.checked_lanes, 2);
        assert_eq!(report.checked_turns, 1);
    }

    #[test]
    fn test_hairpin_is_reported() {
        let w = world(
            &[(1, Vec2::ZERO), (2, Vec2::new(10.0, 0.0)), (3, Vec2::new(1.0, 1.0))],
            &[(1, 1, 2, LaneDirection::Dual, 3.0), (2, 2, 3, LaneDirection::Dual, 3.0)],
        );
        let report = validate_turning_constraints(&w, &TurningConstraintSettings::default());
        let turns: Vec<_> = report.sharp_turns().collect();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].node_id, Some(2));
        assert_eq!(turns[0].lane_ids, vec![1, 2]);
    }

    #[test]
    fn test_opposing_one_way_lanes_are_not_a_turn() {
        // 1 → 2 ← 3: niemand fährt durch Node 2 hindurch
        let w = world(
            &[(1, Vec2::ZERO), (2, Vec2::new(10.0, 0.0)), (3, Vec2::new(1.0, 1.0))],
            &[(1, 1, 2, LaneDirection::Regular, 3.0), (2, 3, 2, LaneDirection::Regular, 3.0)],
        );
        let report = validate_turning_constraints(&w, &TurningConstraintSettings::default());
        assert_eq!(report.checked_turns, 0);
        assert!(report.is_valid());
    }

    #[test]
    fn test_short_and_narrow_lanes() {
        let w = world(
            &[(1, Vec2::ZERO), (2, Vec2::new(0.5, 0.0))],
            &[(1, 1, 2, LaneDirection::Dual, 1.0)],
        );
        let report = validate_turning_constraints(&w, &TurningConstraintSettings::default());
        assert_eq!(report.violations.len(), 2);
        assert!(matches!(report.violations[0].kind, TurningViolationKind::ShortLane { .. }));
        assert!(matches!(report.violations[1].kind, TurningViolationKind::NarrowLane { .. }));
        assert!(report.violations[0].to_string().contains("zu kurz"));
    }

    #[test]
    fn test_grid_counts_every_turn_once() {
        const N: u64 = 50;
        let id = |x: u64, z: u64| z * N + x + 1;
        let points: Vec<(u64, Vec2)> = (0..N)
            .flat_map(|z| (0..N).map(move |x| (x, z)))
            .map(|(x, z)| (id(x, z), Vec2::new(x as f32 * 10.0, z as f32 * 10.0)))
            .collect();
        let mut lanes: Vec<LaneSpec> = Vec::new();
        for z in 0..N {
            for x in 0..N {
                if x + 1 < N {
                    let next = lanes.len() as u64 + 1;
                    lanes.push((next, id(x, z), id(x + 1, z), LaneDirection::Dual, 3.0));
                }
                if z + 1 < N {
                    let next = lanes.len() as u64 + 1;
                    lanes.push((next, id(x, z), id(x, z + 1), LaneDirection::Dual, 3.0));
                }
            }
        }
        let w = world(&points, &lanes);

        let report = validate_turning_constraints(&w, &TurningConstraintSettings::default());
        // Ecken 1, Ränder 3, innen 6 Lane-Paare
        let inner = (N - 2) * (N - 2);
        assert_eq!(report.checked_turns as u64, 4 + 4 * (N - 2) * 3 + inner * 6);
        assert_eq!(report.checked_lanes as u64, 2 * N * (N - 1));
    }
}
