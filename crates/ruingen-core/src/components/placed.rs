//! What was placed, and its prefab-derived traits.

use crate::catalog::EntityKind;
use serde::{Deserialize, Serialize};

/// Prefab identity of a placed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placed {
    pub prefab: String,
    pub kind: EntityKind,
}

impl Placed {
    pub fn new(prefab: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            prefab: prefab.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tags(pub Vec<String>);

impl Tags {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }
}

/// Initial state of a door or hatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorState {
    pub open: bool,
    /// Passage direction through the door.
    pub is_horizontal: bool,
}

/// Axes on which an expanding member may be stretched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resizable {
    pub horizontal: bool,
    pub vertical: bool,
}
