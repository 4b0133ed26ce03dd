//! Save/Load for generated ruins.
//!
//! Uses bincode for a compact binary snapshot of the layout and every
//! placed entity. Entity references are stored as indices into the ruin's
//! entity list and rebuilt on load.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use thiserror::Error;

use crate::catalog::EntityConfig;
use crate::components::*;
use crate::issues::GenerationIssue;
use crate::placement::{PlacementStats, RuinDoor, RuinEntity};
use crate::ruin::Ruin;
use crate::wiring::WiringStats;
use ruingen_logic::hull::{Gap, Hull};
use ruingen_logic::{Line, Rect, RuinShape, ShapeId};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("No ruin has been generated")]
    Empty,
}

/// Serializable snapshot of one ruin and its entities
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Seed the ruin was generated from, if known
    pub seed: Option<u64>,
    pub layout: SerializableLayout,
    pub entities: Vec<SerializableEntity>,
}

/// The ruin minus its entity handles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableLayout {
    pub area: Rect,
    pub mirrored: bool,
    pub entrance: Option<ShapeId>,
    pub shapes: Vec<RuinShape>,
    pub walls: Vec<Line>,
    pub hulls: Vec<Hull>,
    pub gaps: Vec<Gap>,
    pub doors: Vec<RuinDoor>,
    pub diagnostics: Vec<GenerationIssue>,
    pub placement: PlacementStats,
    pub wiring: WiringStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableWire {
    pub point: String,
    pub other: usize,
    pub other_point: String,
}

/// One placed entity with its components, references as indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableEntity {
    pub config: EntityConfig,
    pub shape: ShapeId,
    pub parent: Option<usize>,

    pub placed: Option<Placed>,
    pub bounds: Option<Bounds>,
    pub tags: Option<Tags>,
    pub connection_panel: Option<ConnectionPanel>,
    pub door_state: Option<DoorState>,
    pub resizable: Option<Resizable>,

    pub container: Option<Vec<usize>>,
    pub contained_in: Option<usize>,
    pub links: Option<Vec<usize>>,
    pub wires: Option<Vec<SerializableWire>>,
}

fn indices(map: &HashMap<Entity, usize>, entities: &[Entity]) -> Vec<usize> {
    entities.iter().filter_map(|e| map.get(e).copied()).collect()
}

/// Extract one ruin's entities into serializable form
fn serialize_entities(world: &World, ruin: &Ruin) -> Vec<SerializableEntity> {
    let map: HashMap<Entity, usize> = ruin
        .entities
        .iter()
        .enumerate()
        .map(|(i, e)| (e.entity, i))
        .collect();

    ruin.entities
        .iter()
        .map(|re| {
            let mut se = SerializableEntity {
                config: re.config.clone(),
                shape: re.shape,
                parent: re.parent,
                placed: None,
                bounds: None,
                tags: None,
                connection_panel: None,
                door_state: None,
                resizable: None,
                container: None,
                contained_in: None,
                links: None,
                wires: None,
            };
            let Ok(entity_ref) = world.entity(re.entity) else {
                return se;
            };

            if let Some(c) = entity_ref.get::<&Placed>() {
                se.placed = Some((*c).clone());
            }
            if let Some(c) = entity_ref.get::<&Bounds>() {
                se.bounds = Some(*c);
            }
            if let Some(c) = entity_ref.get::<&Tags>() {
                se.tags = Some((*c).clone());
            }
            if let Some(c) = entity_ref.get::<&ConnectionPanel>() {
                se.connection_panel = Some((*c).clone());
            }
            if let Some(c) = entity_ref.get::<&DoorState>() {
                se.door_state = Some(*c);
            }
            if let Some(c) = entity_ref.get::<&Resizable>() {
                se.resizable = Some(*c);
            }
            if let Some(c) = entity_ref.get::<&Container>() {
                se.container = Some(indices(&map, &c.contents));
            }
            if let Some(c) = entity_ref.get::<&ContainedIn>() {
                se.contained_in = map.get(&c.0).copied();
            }
            if let Some(c) = entity_ref.get::<&Links>() {
                se.links = Some(indices(&map, &c.0));
            }
            if let Some(c) = entity_ref.get::<&Wires>() {
                se.wires = Some(
                    c.0.iter()
                        .filter_map(|w| {
                            map.get(&w.other).map(|&other| SerializableWire {
                                point: w.point.clone(),
                                other,
                                other_point: w.other_point.clone(),
                            })
                        })
                        .collect(),
                );
            }
            se
        })
        .collect()
}

/// Build the snapshot for `ruin` as it currently exists in `world`.
pub fn to_save_data(world: &World, ruin: &Ruin, seed: Option<u64>) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        seed,
        layout: SerializableLayout {
            area: ruin.area,
            mirrored: ruin.mirrored,
            entrance: ruin.entrance,
            shapes: ruin.shapes.clone(),
            walls: ruin.walls.clone(),
            hulls: ruin.hulls.clone(),
            gaps: ruin.gaps.clone(),
            doors: ruin.doors.clone(),
            diagnostics: ruin.diagnostics.clone(),
            placement: ruin.placement,
            wiring: ruin.wiring,
        },
        entities: serialize_entities(world, ruin),
    }
}

/// Spawn every entity first, then add the components that refer to others.
fn deserialize_entities(world: &mut World, entities: &[SerializableEntity]) -> Vec<Entity> {
    let handles: Vec<Entity> = entities
        .iter()
        .map(|se| {
            let entity = world.spawn(());
            if let Some(c) = &se.placed {
                let _ = world.insert_one(entity, c.clone());
            }
            if let Some(c) = se.bounds {
                let _ = world.insert_one(entity, c);
            }
            if let Some(c) = &se.tags {
                let _ = world.insert_one(entity, c.clone());
            }
            if let Some(c) = &se.connection_panel {
                let _ = world.insert_one(entity, c.clone());
            }
            if let Some(c) = se.door_state {
                let _ = world.insert_one(entity, c);
            }
            if let Some(c) = se.resizable {
                let _ = world.insert_one(entity, c);
            }
            entity
        })
        .collect();

    let handle = |i: &usize| handles.get(*i).copied();
    for (se, &entity) in entities.iter().zip(&handles) {
        if let Some(contents) = &se.container {
            let contents = contents.iter().filter_map(handle).collect();
            let _ = world.insert_one(entity, Container { contents });
        }
        if let Some(other) = se.contained_in.as_ref().and_then(handle) {
            let _ = world.insert_one(entity, ContainedIn(other));
        }
        if let Some(links) = &se.links {
            let _ = world.insert_one(entity, Links(links.iter().filter_map(handle).collect()));
        }
        if let Some(wires) = &se.wires {
            let wires = wires
                .iter()
                .filter_map(|w| {
                    handle(&w.other).map(|other| Wire {
                        point: w.point.clone(),
                        other,
                        other_point: w.other_point.clone(),
                    })
                })
                .collect();
            let _ = world.insert_one(entity, Wires(wires));
        }
    }
    handles
}

/// Save a ruin to a writer
pub fn save_ruin<W: Write>(
    writer: W,
    world: &World,
    ruin: &Ruin,
    seed: Option<u64>,
) -> Result<(), SaveError> {
    bincode::serialize_into(writer, &to_save_data(world, ruin, seed))?;
    Ok(())
}

/// Result of loading a ruin
pub struct LoadedRuin {
    pub world: World,
    pub ruin: Ruin,
    pub seed: Option<u64>,
}

/// Load a ruin from a reader into a fresh world
pub fn load_ruin<R: Read>(reader: R) -> Result<LoadedRuin, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    let handles = deserialize_entities(&mut world, &save_data.entities);
    let entities = save_data
        .entities
        .into_iter()
        .zip(handles)
        .map(|(se, entity)| RuinEntity {
            config: se.config,
            entity,
            shape: se.shape,
            parent: se.parent,
        })
        .collect();

    let layout = save_data.layout;
    let (rooms, corridors): (Vec<ShapeId>, Vec<ShapeId>) =
        (0..layout.shapes.len()).partition(|&i| !layout.shapes[i].is_corridor());
    let ruin = Ruin {
        area: layout.area,
        mirrored: layout.mirrored,
        entrance: layout.entrance,
        shapes: layout.shapes,
        rooms,
        corridors,
        walls: layout.walls,
        hulls: layout.hulls,
        gaps: layout.gaps,
        entities,
        doors: layout.doors,
        diagnostics: layout.diagnostics,
        placement: layout.placement,
        wiring: layout.wiring,
    };

    Ok(LoadedRuin {
        world,
        ruin,
        seed: save_data.seed,
    })
}
