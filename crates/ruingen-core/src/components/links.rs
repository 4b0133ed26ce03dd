//! Cross-entity references written by nesting and connection wiring.

use hecs::Entity;
use serde::{Deserialize, Serialize};

/// Named wire endpoints an entity exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPanel {
    pub points: Vec<String>,
}

impl ConnectionPanel {
    pub fn has_point(&self, name: &str) -> bool {
        self.points.iter().any(|p| p == name)
    }
}

/// Items nested inside this entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    pub contents: Vec<Entity>,
}

/// This entity is stored inside another rather than placed in space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainedIn(pub Entity);

/// Bidirectional structural links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Links(pub Vec<Entity>);

/// One end of a wire, as seen from the entity holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub point: String,
    pub other: Entity,
    pub other_point: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wires(pub Vec<Wire>);
