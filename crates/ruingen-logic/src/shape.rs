//! Rooms and corridors as one tagged shape type.

use crate::bsp::{NodeId, RoomTree};
use crate::corridor::Corridor;
use crate::geometry::{Line, Rect};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index into the ruin's shape list.
pub type ShapeId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// A BSP leaf.
    Room { node: NodeId },
    Corridor {
        is_horizontal: bool,
        /// The two room shapes this corridor joins.
        rooms: [ShapeId; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuinShape {
    pub rect: Rect,
    pub walls: Vec<Line>,
    /// Hop count from the entrance room; `None` if unreachable or unlabelled.
    pub distance: Option<u32>,
    /// Index into the room-type catalog, once assigned.
    pub room_type: Option<usize>,
    pub kind: ShapeKind,
}

impl RuinShape {
    pub fn room(rect: Rect, node: NodeId) -> Self {
        Self {
            rect,
            walls: Vec::new(),
            distance: None,
            room_type: None,
            kind: ShapeKind::Room { node },
        }
    }

    pub fn corridor(rect: Rect, is_horizontal: bool, rooms: [ShapeId; 2]) -> Self {
        Self {
            rect,
            walls: Vec::new(),
            distance: None,
            room_type: None,
            kind: ShapeKind::Corridor {
                is_horizontal,
                rooms,
            },
        }
    }

    pub fn is_corridor(&self) -> bool {
        matches!(self.kind, ShapeKind::Corridor { .. })
    }

    /// Travel axis for corridors; rooms report `None`.
    pub fn corridor_orientation(&self) -> Option<bool> {
        match self.kind {
            ShapeKind::Corridor { is_horizontal, .. } => Some(is_horizontal),
            ShapeKind::Room { .. } => None,
        }
    }

    /// Replace the wall list with the shape's boundary segments.
    ///
    /// Rooms get all four edges. Corridors get only the two edges parallel
    /// to their travel axis; their ends open into the connected rooms.
    pub fn create_walls(&mut self) {
        let r = self.rect;
        let bl = IVec2::new(r.x, r.y);
        let br = IVec2::new(r.right(), r.y);
        let tl = IVec2::new(r.x, r.top());
        let tr = IVec2::new(r.right(), r.top());
        let bottom = Line::new(bl, br);
        let top = Line::new(tl, tr);
        let left = Line::new(bl, tl);
        let right = Line::new(br, tr);

        self.walls = match self.kind {
            ShapeKind::Room { .. } => vec![bottom, top, left, right],
            ShapeKind::Corridor {
                is_horizontal: true,
                ..
            } => vec![bottom, top],
            ShapeKind::Corridor {
                is_horizontal: false,
                ..
            } => vec![left, right],
        };
    }
}

/// Rooms (one per leaf, in leaf order) followed by corridors.
pub fn build_shapes(tree: &RoomTree, corridors: &[Corridor]) -> Vec<RuinShape> {
    let leaves = tree.leaves();
    let shape_of: HashMap<NodeId, ShapeId> = leaves
        .iter()
        .enumerate()
        .map(|(shape, &node)| (node, shape))
        .collect();

    let mut shapes: Vec<RuinShape> = leaves
        .iter()
        .map(|&node| RuinShape::room(tree.rect(node), node))
        .collect();

    for corridor in corridors {
        let rooms = [shape_of[&corridor.rooms[0]], shape_of[&corridor.rooms[1]]];
        shapes.push(RuinShape::corridor(corridor.rect, corridor.is_horizontal, rooms));
    }

    for shape in &mut shapes {
        shape.create_walls();
    }
    shapes
}
