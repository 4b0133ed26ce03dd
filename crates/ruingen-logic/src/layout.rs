//! Layout pipeline: splitter → scale → router → shapes → wall clipping.
//!
//! The order of RNG draws is fixed by this function; reordering any stage
//! changes every layout produced from a given seed.

use crate::bsp::{split_rooms, RoomTree, SplitParams};
use crate::corridor::{route_corridors, Corridor, CorridorParams, DroppedCorridor};
use crate::distance::{choose_entrance, label_distances};
use crate::geometry::Rect;
use crate::shape::{build_shapes, RuinShape, ShapeId};
use crate::walls::split_walls;
use glam::Vec2;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct RuinLayout {
    pub area: Rect,
    pub tree: RoomTree,
    pub corridors: Vec<Corridor>,
    /// Splits the router left unbridged.
    pub dropped_corridors: Vec<DroppedCorridor>,
    /// Rooms in leaf order, then corridors in routing order.
    pub shapes: Vec<RuinShape>,
}

impl RuinLayout {
    /// Pick the entrance room for `path_point` and label BFS distances.
    pub fn label_from(&mut self, path_point: Vec2, mirror: bool) -> Option<ShapeId> {
        let entrance = choose_entrance(&self.shapes, &self.area, path_point, mirror)?;
        label_distances(&mut self.shapes, entrance);
        Some(entrance)
    }

    pub fn room_count(&self) -> usize {
        self.shapes.iter().filter(|s| !s.is_corridor()).count()
    }

    pub fn corridor_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.is_corridor()).count()
    }
}

pub fn build_layout(
    area: Rect,
    split: &SplitParams,
    corridor: &CorridorParams,
    rng: &mut impl Rng,
) -> RuinLayout {
    let mut tree = split_rooms(area, split, rng);
    tree.scale_leaves(split, rng);
    let routing = route_corridors(&mut tree, corridor, rng);
    let corridors = routing.corridors;
    let mut shapes = build_shapes(&tree, &corridors);
    split_walls(&mut shapes);

    log::debug!(
        "Layout: {} rooms, {} corridors ({} dropped) in {:?}",
        tree.leaves().len(),
        corridors.len(),
        routing.dropped.len(),
        area
    );

    RuinLayout {
        area,
        tree,
        corridors,
        dropped_corridors: routing.dropped,
        shapes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_layout_is_deterministic() {
        let area = Rect::new(0, 0, 2000, 2000);
        let build = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            build_layout(area, &SplitParams::default(), &CorridorParams::default(), &mut rng).shapes
        };
        assert_eq!(build(5), build(5));
    }

    #[test]
    fn test_label_from_marks_entrance() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut layout = build_layout(
            Rect::new(0, 0, 2000, 2000),
            &SplitParams::default(),
            &CorridorParams::default(),
            &mut rng,
        );
        let entrance = layout.label_from(Vec2::new(-500.0, 1000.0), false).unwrap();
        assert_eq!(layout.shapes[entrance].distance, Some(0));
        assert!(!layout.shapes[entrance].is_corridor());
    }
}
