//! Distance Labeler: entrance selection and BFS hop counts.

use crate::geometry::{mirror_axis2, mirror_point, Rect};
use crate::shape::{RuinShape, ShapeId, ShapeKind};
use glam::Vec2;
use std::collections::VecDeque;

/// Tolerance used when deciding whether two shapes touch.
const ADJACENCY_TOLERANCE: i32 = 1;

/// The room whose centre is nearest the external path point.
///
/// Layout is built unmirrored, so a mirrored ruin reflects the path point
/// into layout space before comparing. Ties go to the lower shape index.
pub fn choose_entrance(
    shapes: &[RuinShape],
    area: &Rect,
    path_point: Vec2,
    mirror: bool,
) -> Option<ShapeId> {
    let target = if mirror {
        mirror_point(path_point, mirror_axis2(area))
    } else {
        path_point
    };
    shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_corridor())
        .map(|(i, s)| (i, s.rect.center().distance_squared(target)))
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(i, _)| i)
}

/// Room↔corridor links plus any shapes whose rects touch or overlap.
/// Neighbour lists are sorted so traversal order is deterministic.
pub fn adjacency(shapes: &[RuinShape]) -> Vec<Vec<ShapeId>> {
    let mut adj: Vec<Vec<ShapeId>> = vec![Vec::new(); shapes.len()];
    for (i, shape) in shapes.iter().enumerate() {
        if let ShapeKind::Corridor { rooms, .. } = shape.kind {
            for room in rooms {
                adj[i].push(room);
                adj[room].push(i);
            }
        }
    }
    for i in 0..shapes.len() {
        for j in (i + 1)..shapes.len() {
            if shapes[i].rect.is_adjacent(&shapes[j].rect, ADJACENCY_TOLERANCE) {
                adj[i].push(j);
                adj[j].push(i);
            }
        }
    }
    for list in &mut adj {
        list.sort_unstable();
        list.dedup();
    }
    adj
}

/// Label every shape with its hop count from `entrance`.
/// Shapes the traversal cannot reach keep `distance == None`.
pub fn label_distances(shapes: &mut [RuinShape], entrance: ShapeId) {
    for shape in shapes.iter_mut() {
        shape.distance = None;
    }
    if entrance >= shapes.len() {
        return;
    }
    let adj = adjacency(shapes);
    let mut queue = VecDeque::new();
    shapes[entrance].distance = Some(0);
    queue.push_back(entrance);

    while let Some(current) = queue.pop_front() {
        let next_distance = shapes[current].distance.unwrap_or(0) + 1;
        for &next in &adj[current] {
            if shapes[next].distance.is_none() {
                shapes[next].distance = Some(next_distance);
                queue.push_back(next);
            }
        }
    }

    let unreachable = shapes.iter().filter(|s| s.distance.is_none()).count();
    if unreachable > 0 {
        log::warn!(
            "{} of {} shapes unreachable from entrance {}",
            unreachable,
            shapes.len(),
            entrance
        );
    }
}

/// Shapes of one class (rooms or corridors) ordered by distance from the
/// entrance, then by index. Unlabelled shapes sort last.
pub fn distance_order(shapes: &[RuinShape], corridors: bool) -> Vec<ShapeId> {
    let mut order: Vec<ShapeId> = (0..shapes.len())
        .filter(|&i| shapes[i].is_corridor() == corridors)
        .collect();
    order.sort_by_key(|&i| (shapes[i].distance.unwrap_or(u32::MAX), i));
    order
}
