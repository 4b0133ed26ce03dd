//! Ruin catalog: prefab table and ordered room-type definitions, loaded from JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("room type '{room_type}' has water fill min {min} > max {max}")]
    WaterFill {
        room_type: String,
        min: f32,
        max: f32,
    },
    #[error("room type '{room_type}' entity '{prefab}' has amount min {min} > max {max}")]
    Amount {
        room_type: String,
        prefab: String,
        min: u32,
        max: u32,
    },
}

/// A placeable object template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabDef {
    pub identifier: String,
    /// Footprint. For walls, `y` is the wall thickness.
    pub size: Vec2,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Named wire endpoints.
    #[serde(default)]
    pub connection_points: Vec<String>,
    /// Whether other items can be nested inside.
    #[serde(default)]
    pub container: bool,
    #[serde(default)]
    pub resize_horizontal: bool,
    #[serde(default)]
    pub resize_vertical: bool,
}

impl PrefabDef {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Wall,
    Background,
    Door,
    Hatch,
    Prop,
}

impl EntityKind {
    /// Walls and backgrounds never take part in overlap displacement.
    pub fn is_structural(self) -> bool {
        matches!(self, EntityKind::Wall | EntityKind::Background)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

/// Room-type placement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    First,
    Last,
    Any,
}

/// A shape chosen relative to another shape in distance order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativePlacement {
    #[default]
    SameRoom,
    NextRoom,
    PreviousRoom,
    NextCorridor,
    PreviousCorridor,
    FirstRoom,
    LastRoom,
    FirstCorridor,
    LastCorridor,
}

/// Named wire endpoints on the source and the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEndpoints {
    pub source: String,
    pub target: String,
}

/// Target name that resolves to the entity's parent.
pub const PARENT_TARGET: &str = "parent";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Prefab identifier, or [`PARENT_TARGET`].
    pub target: String,
    /// Restrict the lookup to a room relative to the source's room.
    #[serde(default)]
    pub room: Option<RelativePlacement>,
    #[serde(default)]
    pub wire: Option<WireEndpoints>,
}

fn default_alignment() -> Vec<Alignment> {
    vec![Alignment::Center]
}

fn one() -> u32 {
    1
}

/// Declarative placement rule for one kind of entity in a room type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub prefab: String,
    pub kind: EntityKind,
    #[serde(default = "default_alignment")]
    pub alignment: Vec<Alignment>,
    /// Random offset from the anchor, as a fraction of the interior size.
    #[serde(default)]
    pub min_offset: f32,
    #[serde(default)]
    pub max_offset: f32,
    #[serde(default = "one")]
    pub min_amount: u32,
    #[serde(default = "one")]
    pub max_amount: u32,
    /// Nest inside an already placed container carrying this tag.
    #[serde(default)]
    pub container_tag: Option<String>,
    /// Stretch resizable members towards the surrounding walls.
    #[serde(default)]
    pub expand: bool,
    /// Room used when this config is a child of another entity.
    #[serde(default)]
    pub placement: RelativePlacement,
    #[serde(default)]
    pub children: Vec<EntityConfig>,
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

impl EntityConfig {
    /// Wall configs aligned to top/bottom serve horizontal lines and
    /// left/right serve vertical ones; centre serves either.
    pub fn fits_wall(&self, is_horizontal: bool) -> bool {
        self.alignment.iter().any(|a| match a {
            Alignment::Center => true,
            Alignment::Top | Alignment::Bottom => is_horizontal,
            Alignment::Left | Alignment::Right => !is_horizontal,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTypeDef {
    pub name: String,
    pub placement: Placement,
    #[serde(default)]
    pub placement_offset: u32,
    #[serde(default)]
    pub is_corridor: bool,
    #[serde(default)]
    pub min_water_fill: f32,
    #[serde(default)]
    pub max_water_fill: f32,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl RoomTypeDef {
    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = &EntityConfig> {
        self.entities.iter().filter(move |e| e.kind == kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuinCatalog {
    pub prefabs: Vec<PrefabDef>,
    pub room_types: Vec<RoomTypeDef>,
}

impl RuinCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: RuinCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        log::debug!(
            "Loaded catalog: {} prefabs, {} room types",
            catalog.prefabs.len(),
            catalog.room_types.len()
        );
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for rt in &self.room_types {
            if rt.min_water_fill > rt.max_water_fill {
                return Err(CatalogError::WaterFill {
                    room_type: rt.name.clone(),
                    min: rt.min_water_fill,
                    max: rt.max_water_fill,
                });
            }
            let mut stack: Vec<&EntityConfig> = rt.entities.iter().collect();
            while let Some(config) = stack.pop() {
                if config.min_amount > config.max_amount {
                    return Err(CatalogError::Amount {
                        room_type: rt.name.clone(),
                        prefab: config.prefab.clone(),
                        min: config.min_amount,
                        max: config.max_amount,
                    });
                }
                stack.extend(config.children.iter());
            }
        }
        Ok(())
    }

    pub fn prefab(&self, identifier: &str) -> Option<&PrefabDef> {
        self.prefabs.iter().find(|p| p.identifier == identifier)
    }

    pub fn room_type(&self, index: usize) -> Option<&RoomTypeDef> {
        self.room_types.get(index)
    }
}
