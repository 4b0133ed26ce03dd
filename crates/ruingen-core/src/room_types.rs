//! Room-Type Assigner.
//!
//! `First`/`Last` types claim the shape nearest to / farthest from the
//! entrance, optionally stepping `placement_offset` shapes further along.
//! Everything left over draws uniformly from the matching `Any` pool.

use crate::catalog::{Placement, RoomTypeDef, RuinCatalog};
use crate::issues::GenerationIssue;
use rand::Rng;
use ruingen_logic::random;
use ruingen_logic::{RuinShape, ShapeId};
use std::cmp::Reverse;

fn class_name(is_corridor: bool) -> &'static str {
    if is_corridor {
        "corridor"
    } else {
        "room"
    }
}

fn open_slot(shape: &RuinShape, is_corridor: bool) -> bool {
    shape.room_type.is_none() && shape.is_corridor() == is_corridor
}

/// Nearest unvisited open shape at or beyond (`forward`) or at or before the
/// current distance. Graph distance first, then Euclidean, then index.
fn step_from(
    shapes: &[RuinShape],
    current: ShapeId,
    forward: bool,
    visited: &[ShapeId],
) -> Option<ShapeId> {
    let d0 = shapes[current].distance?;
    let c0 = shapes[current].rect.center();
    let is_corridor = shapes[current].is_corridor();
    shapes
        .iter()
        .enumerate()
        .filter(|(i, s)| open_slot(s, is_corridor) && !visited.contains(i))
        .filter_map(|(i, s)| {
            let d = s.distance?;
            let ok = if forward { d >= d0 } else { d <= d0 };
            ok.then(|| (i, d.abs_diff(d0), s.rect.center().distance_squared(c0)))
        })
        .min_by(|a, b| {
            a.1.cmp(&b.1)
                .then(a.2.total_cmp(&b.2))
                .then(a.0.cmp(&b.0))
        })
        .map(|(i, _, _)| i)
}

fn place_ordered(shapes: &[RuinShape], def: &RoomTypeDef) -> Option<ShapeId> {
    let labelled = shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| open_slot(s, def.is_corridor))
        .filter_map(|(i, s)| s.distance.map(|d| (i, d)));

    let forward = def.placement == Placement::First;
    let start = if forward {
        labelled.min_by_key(|&(i, d)| (d, i))
    } else {
        labelled.max_by_key(|&(i, d)| (d, Reverse(i)))
    }
    .map(|(i, _)| i)?;

    let mut visited = vec![start];
    let mut current = start;
    for _ in 0..def.placement_offset {
        match step_from(shapes, current, forward, &visited) {
            Some(next) => {
                visited.push(next);
                current = next;
            }
            None => {
                log::debug!(
                    "Room type '{}' offset stopped early at shape {}",
                    def.name,
                    current
                );
                break;
            }
        }
    }
    Some(current)
}

/// Assign a room type index to every shape it can. Returns soft failures.
pub fn assign_room_types(
    shapes: &mut [RuinShape],
    catalog: &RuinCatalog,
    rng: &mut impl Rng,
) -> Vec<GenerationIssue> {
    let mut issues = Vec::new();

    for (index, def) in catalog.room_types.iter().enumerate() {
        if def.placement == Placement::Any {
            continue;
        }
        match place_ordered(shapes, def) {
            Some(shape) => shapes[shape].room_type = Some(index),
            None => issues.push(GenerationIssue::ResolutionMiss(format!(
                "no free {} for {:?} room type '{}'",
                class_name(def.is_corridor),
                def.placement,
                def.name
            ))),
        }
    }

    let pool = |is_corridor: bool| -> Vec<usize> {
        catalog
            .room_types
            .iter()
            .enumerate()
            .filter(|(_, rt)| rt.placement == Placement::Any && rt.is_corridor == is_corridor)
            .map(|(i, _)| i)
            .collect()
    };
    let room_pool = pool(false);
    let corridor_pool = pool(true);

    for (i, shape) in shapes.iter_mut().enumerate() {
        if shape.room_type.is_some() {
            continue;
        }
        let candidates = if shape.is_corridor() {
            &corridor_pool
        } else {
            &room_pool
        };
        if candidates.is_empty() {
            issues.push(GenerationIssue::ResolutionMiss(format!(
                "no 'any' room type for {} shape {}",
                class_name(shape.is_corridor()),
                i
            )));
            continue;
        }
        shape.room_type = Some(candidates[random::index(rng, candidates.len())]);
    }

    let typed = shapes.iter().filter(|s| s.room_type.is_some()).count();
    log::debug!("Room types: {}/{} shapes typed", typed, shapes.len());
    issues
}
