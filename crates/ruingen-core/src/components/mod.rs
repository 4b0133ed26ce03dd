//! Component definitions for placed ruin entities.
//!
//! Components are pure data structs attached to entities.
//! Placement and wiring write them; nothing else mutates them.

mod bounds;
mod links;
mod placed;

pub use bounds::*;
pub use links::*;
pub use placed::*;
