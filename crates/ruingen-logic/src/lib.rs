//! Pure layout logic for procedurally generated ruins.
//!
//! This crate holds every stage of ruin generation that works on plain
//! geometry: no ECS, no catalog, no prefabs. Functions take rectangles,
//! parameters and an RNG handle and return plain data, so each stage is
//! unit-testable on its own and the whole pipeline is deterministic for a
//! given seed.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`geometry`] | Integer `Rect` and wall `Line` primitives, clipping, ray casts |
//! | [`random`] | Range sampling helpers that tolerate degenerate ranges |
//! | [`bsp`] | Room Splitter: arena-backed binary space partition tree |
//! | [`corridor`] | Corridor Router: bridges sibling subtrees with corridors |
//! | [`shape`] | `RuinShape` (room or corridor) and per-shape wall creation |
//! | [`walls`] | Shape Geometry Builder: clips walls embedded in other shapes |
//! | [`distance`] | Entrance selection and BFS distance labelling |
//! | [`hull`] | Hull partitioning, door splits and gap synthesis |
//! | [`layout`] | Runs splitter → router → walls in a fixed RNG order |
//! | [`validate`] | Layout validation (overlaps, connectivity, bounds) |

pub mod bsp;
pub mod corridor;
pub mod distance;
pub mod geometry;
pub mod hull;
pub mod layout;
pub mod random;
pub mod shape;
pub mod validate;
pub mod walls;

pub use geometry::{Line, Rect};
pub use shape::{RuinShape, ShapeId, ShapeKind};
