//! Ruingen Core - Catalog-Driven Ruin Generation
//!
//! Turns the plain layouts from `ruingen-logic` into furnished ruins: room
//! types drawn from a JSON catalog, walls, doors and props spawned as ECS
//! entities, water-filled hulls with gaps, and wired connections between
//! placed entities.
//!
//! # Architecture
//!
//! Placed things are entities in a `hecs` world:
//! - **Entities**: walls, backgrounds, doors, hatches, props
//! - **Components**: pure data attached to them (Bounds, Placed, Tags, Wires, etc.)
//! - **Generation**: one pass in a fixed order, see [`ruin::generate_ruin`]
//!
//! # Example
//!
//! ```rust,no_run
//! use ruingen_core::prelude::*;
//! use glam::Vec2;
//!
//! let catalog = RuinCatalog::load("data/ruin_catalog.json").unwrap();
//! let mut site = RuinSite::new(catalog, GenerationParams::default()).unwrap();
//!
//! let request = GenerationRequest::new(Rect::new(0, 0, 2000, 2000), Vec2::new(1000.0, -200.0));
//! let ruin = site.generate(&request, 42);
//! println!("{:?}", ruin.stats());
//! ```

pub mod catalog;
pub mod components;
pub mod config;
pub mod engine;
pub mod hull_index;
pub mod issues;
pub mod persistence;
pub mod placement;
pub mod relative;
pub mod room_types;
pub mod ruin;
pub mod wiring;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalog::RuinCatalog;
    pub use crate::components::*;
    pub use crate::config::{GenerationParams, GenerationRequest};
    pub use crate::engine::RuinSite;
    pub use crate::issues::GenerationIssue;
    pub use crate::ruin::{generate_ruin, Ruin, RuinStats};
    pub use ruingen_logic::Rect;
}
