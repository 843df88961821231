//! Zusammenfügen zweier Lane-Welten.
//!
//! Die zweite Welt wird mit neu vergebenen IDs übernommen: Nodes, Lanes und
//! Kreuzungen werden dicht hinter die größte ID der ersten Welt gelegt.
//! Sackgassen der zweiten Welt werden an den nächsten Node der ersten Welt
//! angebunden; jede solche Anbindung ist eine Straßenkreuzung.

use anyhow::{anyhow, Result};
use std::collections::HashMap;

use crate::core::{
    Lane, LaneDirection, LaneFlags, LaneNode, StreetCrossing, TrafficLaneWorld, WorldBounds,
};

/// Kennzahlen einer Zusammenführung
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeResult {
    /// Übernommene Nodes
    pub added_nodes: usize,
    /// Übernommene Lanes (ohne Verbinder)
    pub added_lanes: usize,
    /// Angebundene Sackgassen
    pub stitched: usize,
    /// Neu angelegte Kreuzungen
    pub crossings: usize,
}

/// Vergibt `first, first + 1, ...` in der Reihenfolge von `old_ids`
fn renumber(
    old_ids: impl IntoIterator<Item = u64>,
    first: u64,
    kind: &str,
) -> Result<HashMap<u64, u64>> {
    old_ids
        .into_iter()
        .enumerate()
        .map(|(i, old)| Ok((old, offset_id(first, i, kind)?)))
        .collect()
}

fn offset_id(first: u64, offset: usize, kind: &str) -> Result<u64> {
    u64::try_from(offset)
        .ok()
        .and_then(|offset| first.checked_add(offset))
        .ok_or_else(|| anyhow!("{}-IDs reichen für die Zusammenführung nicht aus", kind))
}

fn mapped(ids: &HashMap<u64, u64>, old: u64) -> Result<u64> {
    ids.get(&old)
        .copied()
        .ok_or_else(|| anyhow!("Node {} fehlt in der angebundenen Welt", old))
}

/// Fügt `secondary` in `primary` ein.
///
/// Sackgassen der zweiten Welt (Grad 1) werden innerhalb von `stitch_radius`
/// mit dem nächsten ursprünglichen Node der ersten Welt verbunden. Der
/// Verbinder ist eine Dual-Lane mit den Flags der Sackgassen-Lane plus
/// `CROSSING`.
///
/// Alle IDs werden vor der ersten Änderung vergeben; reicht der ID-Raum
/// nicht, bleibt `primary` unverändert.
pub fn merge_lane_worlds(
    primary: &mut TrafficLaneWorld,
    secondary: &TrafficLaneWorld,
    stitch_radius: f32,
) -> Result<MergeResult> {
    let secondary_lanes = secondary.sorted_lanes();
    let node_ids = renumber(secondary.sorted_node_ids(), primary.next_node_id()?, "Node")?;
    let first_lane_id = primary.next_lane_id()?;
    offset_id(first_lane_id, secondary_lanes.len().saturating_sub(1), "Lane")?;
    let first_crossing_id = primary.next_crossing_id()?;
    offset_id(
        first_crossing_id,
        secondary.crossing_count().saturating_sub(1),
        "Kreuzungs",
    )?;

    let incidence = secondary.lane_incidence();
    let mut dead_ends = Vec::new();
    for node_id in secondary.sorted_node_ids() {
        if let (Some([lane]), Some(node)) = (
            incidence.get(&node_id).map(Vec::as_slice),
            secondary.node(node_id),
        ) {
            dead_ends.push((mapped(&node_ids, node_id)?, node.position, *lane));
        }
    }
    // Verbinder und ihre Kreuzungen liegen hinter den übernommenen IDs
    let (first_connector_id, first_stitch_crossing_id) = match dead_ends.len() {
        0 => (0, 0),
        count => {
            let lane = offset_id(first_lane_id, secondary_lanes.len(), "Lane")?;
            let crossing =
                offset_id(first_crossing_id, secondary.crossing_count(), "Kreuzungs")?;
            offset_id(lane, count - 1, "Lane")?;
            offset_id(crossing, count - 1, "Kreuzungs")?;
            (lane, crossing)
        }
    };

    let original_index = primary.spatial_index().clone();
    let mut result = MergeResult::default();

    let mut new_nodes = Vec::with_capacity(secondary.node_count());
    for node in secondary.nodes_iter() {
        new_nodes.push(LaneNode::new(mapped(&node_ids, node.id)?, node.position));
    }
    primary.extend_nodes(new_nodes);
    result.added_nodes = secondary.node_count();

    for (i, lane) in secondary_lanes.iter().enumerate() {
        primary.add_lane(Lane {
            id: first_lane_id + i as u64,
            start_id: mapped(&node_ids, lane.start_id)?,
            end_id: mapped(&node_ids, lane.end_id)?,
            ..(*lane).clone()
        })?;
    }
    result.added_lanes = secondary_lanes.len();

    for (i, crossing) in secondary.crossings().iter().enumerate() {
        let members = crossing
            .node_ids
            .iter()
            .map(|old| mapped(&node_ids, *old))
            .collect::<Result<Vec<_>>>()?;
        primary.add_crossing(StreetCrossing::new(
            first_crossing_id + i as u64,
            crossing.center,
            members,
        ))?;
    }

    let mut crossing_at: HashMap<u64, usize> = HashMap::new();
    let mut pending: Vec<StreetCrossing> = Vec::new();

    for (new_id, position, dead_end_lane) in dead_ends {
        let Some(target) = original_index
            .nearest(position)
            .filter(|hit| hit.distance <= stitch_radius)
        else {
            continue;
        };
        let target_pos = original_index.positions()[target.slot];

        primary.add_lane(Lane::new(
            first_connector_id + result.stitched as u64,
            target.node_id,
            new_id,
            LaneDirection::Dual,
            dead_end_lane.flags | LaneFlags::CROSSING,
            dead_end_lane.width,
            target_pos,
            position,
        ))?;
        result.stitched += 1;

        match crossing_at.get(&target.node_id) {
            Some(&slot) => pending[slot].node_ids.push(new_id),
            None => {
                crossing_at.insert(target.node_id, pending.len());
                pending.push(StreetCrossing::new(
                    first_stitch_crossing_id + pending.len() as u64,
                    target_pos,
                    vec![target.node_id, new_id],
                ));
            }
        }
    }

    result.crossings = pending.len();
    for crossing in pending {
        primary.add_crossing(crossing)?;
    }

    let (a, b) = (primary.bounds, secondary.bounds);
    primary.bounds = WorldBounds::new(a.min().min(b.min()), a.max().max(b.max()));

    log::info!(
        "Lane-Welten zusammengefuehrt: +{} Nodes, +{} Lanes, {} Anbindungen, {} Kreuzungen",
        result.added_nodes,
        result.added_lanes,
        result.stitched,
        result.crossings
    );
    Ok(result)
}
