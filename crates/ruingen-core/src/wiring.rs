//! Connection Wiring: turns symbolic connection configs into links and wires.

use crate::catalog::{ConnectionConfig, PARENT_TARGET};
use crate::components::{ConnectionPanel, Links, Wire, Wires};
use crate::issues::{Diagnostics, GenerationIssue};
use crate::placement::RuinEntity;
use crate::relative::resolve_relative;
use hecs::{Entity, World};
use ruingen_logic::RuinShape;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WiringStats {
    pub links: usize,
    pub wires: usize,
}

/// Parent, then room-relative lookup, then global lookup by prefab.
fn resolve_target(
    shapes: &[RuinShape],
    entities: &[RuinEntity],
    source: usize,
    connection: &ConnectionConfig,
) -> Result<usize, GenerationIssue> {
    let miss = |why: String| {
        GenerationIssue::ResolutionMiss(format!(
            "'{}' -> '{}': {}",
            entities[source].config.prefab, connection.target, why
        ))
    };

    if connection.target == PARENT_TARGET {
        return entities[source].parent.ok_or_else(|| miss("no parent".into()));
    }

    let matches = |i: &usize| *i != source && entities[*i].config.prefab == connection.target;
    match connection.room {
        Some(rule) => {
            let shape = resolve_relative(shapes, entities[source].shape, rule)
                .ok_or_else(|| miss(format!("no {:?} room", rule)))?;
            (0..entities.len())
                .filter(|&i| entities[i].shape == shape)
                .find(matches)
                .ok_or_else(|| miss(format!("nothing in shape {}", shape)))
        }
        None => (0..entities.len())
            .find(matches)
            .ok_or_else(|| miss("no such entity".into())),
    }
}

fn has_point(world: &World, entity: Entity, point: &str) -> bool {
    world
        .get::<&ConnectionPanel>(entity)
        .is_ok_and(|panel| panel.has_point(point))
}

fn push_link(world: &mut World, from: Entity, to: Entity) {
    if let Ok(mut links) = world.get::<&mut Links>(from) {
        if !links.0.contains(&to) {
            links.0.push(to);
        }
        return;
    }
    let _ = world.insert_one(from, Links(vec![to]));
}

fn push_wire(world: &mut World, from: Entity, wire: Wire) {
    if let Ok(mut wires) = world.get::<&mut Wires>(from) {
        wires.0.push(wire);
        return;
    }
    let _ = world.insert_one(from, Wires(vec![wire]));
}

fn connect(
    world: &mut World,
    entities: &[RuinEntity],
    source: usize,
    target: usize,
    connection: &ConnectionConfig,
) -> Result<bool, GenerationIssue> {
    let (a, b) = (entities[source].entity, entities[target].entity);
    let Some(endpoints) = &connection.wire else {
        push_link(world, a, b);
        push_link(world, b, a);
        return Ok(false);
    };

    for (entity, index, point) in [(a, source, &endpoints.source), (b, target, &endpoints.target)] {
        if !has_point(world, entity, point) {
            return Err(GenerationIssue::ResolutionMiss(format!(
                "'{}' has no connection point '{}'",
                entities[index].config.prefab, point
            )));
        }
    }
    push_wire(
        world,
        a,
        Wire {
            point: endpoints.source.clone(),
            other: b,
            other_point: endpoints.target.clone(),
        },
    );
    push_wire(
        world,
        b,
        Wire {
            point: endpoints.target.clone(),
            other: a,
            other_point: endpoints.source.clone(),
        },
    );
    Ok(true)
}

/// Resolve every connection config of every placed entity.
pub fn wire_connections(
    world: &mut World,
    shapes: &[RuinShape],
    entities: &[RuinEntity],
    diagnostics: &mut Diagnostics,
) -> WiringStats {
    let mut stats = WiringStats::default();
    for source in 0..entities.len() {
        for connection in &entities[source].config.connections {
            let wired = resolve_target(shapes, entities, source, connection)
                .and_then(|target| connect(world, entities, source, target, connection));
            match diagnostics.check(wired) {
                Some(true) => stats.wires += 1,
                Some(false) => stats.links += 1,
                None => {}
            }
        }
    }
    log::debug!("Wiring: {} links, {} wires", stats.links, stats.wires);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityConfig, EntityKind, RelativePlacement, WireEndpoints};
    use crate::components::Bounds;
    use ruingen_logic::Rect;

    fn config(prefab: &str, connections: Vec<ConnectionConfig>) -> EntityConfig {
        EntityConfig {
            prefab: prefab.into(),
            kind: EntityKind::Prop,
            alignment: Vec::new(),
            min_offset: 0.0,
            max_offset: 0.0,
            min_amount: 1,
            max_amount: 1,
            container_tag: None,
            expand: false,
            placement: RelativePlacement::SameRoom,
            children: Vec::new(),
            connections,
        }
    }

    fn link_to(target: &str) -> ConnectionConfig {
        ConnectionConfig {
            target: target.into(),
            room: None,
            wire: None,
        }
    }

    fn setup(configs: Vec<(EntityConfig, usize, Option<usize>, Vec<&str>)>) -> (World, Vec<RuinShape>, Vec<RuinEntity>) {
        let mut world = World::new();
        let mut shapes = vec![
            RuinShape::room(Rect::new(0, 0, 100, 100), 1),
            RuinShape::room(Rect::new(300, 0, 100, 100), 2),
        ];
        shapes[0].distance = Some(0);
        shapes[1].distance = Some(2);
        let entities = configs
            .into_iter()
            .map(|(config, shape, parent, points)| {
                let panel = ConnectionPanel {
                    points: points.into_iter().map(String::from).collect(),
                };
                let entity = world.spawn((Bounds::default(), panel));
                RuinEntity {
                    config,
                    entity,
                    shape,
                    parent,
                }
            })
            .collect();
        (world, shapes, entities)
    }

    #[test]
    fn test_parent_link_is_bidirectional() {
        let (mut world, shapes, entities) = setup(vec![
            (config("desk", vec![]), 0, None, vec![]),
            (config("lamp", vec![link_to(PARENT_TARGET)]), 0, Some(0), vec![]),
        ]);
        let mut diagnostics = Diagnostics::new();
        let stats = wire_connections(&mut world, &shapes, &entities, &mut diagnostics);
        assert_eq!(stats.links, 1);
        let (desk, lamp) = (entities[0].entity, entities[1].entity);
        assert_eq!(world.get::<&Links>(desk).unwrap().0, vec![lamp]);
        assert_eq!(world.get::<&Links>(lamp).unwrap().0, vec![desk]);
    }

    #[test]
    fn test_room_relative_lookup() {
        let mut conn = link_to("terminal");
        conn.room = Some(RelativePlacement::NextRoom);
        let (mut world, shapes, entities) = setup(vec![
            (config("terminal", vec![]), 0, None, vec![]),
            (config("switch", vec![conn]), 0, None, vec![]),
            (config("terminal", vec![]), 1, None, vec![]),
        ]);
        let mut diagnostics = Diagnostics::new();
        wire_connections(&mut world, &shapes, &entities, &mut diagnostics);
        // The terminal in the next room, not the one next to the switch.
        assert_eq!(world.get::<&Links>(entities[1].entity).unwrap().0, vec![entities[2].entity]);
        assert!(world.get::<&Links>(entities[0].entity).is_err());
    }

    #[test]
    fn test_wire_requires_both_points() {
        let wire = |target_point: &str| ConnectionConfig {
            target: "pump".into(),
            room: None,
            wire: Some(WireEndpoints {
                source: "power_out".into(),
                target: target_point.into(),
            }),
        };
        let (mut world, shapes, entities) = setup(vec![
            (config("generator", vec![wire("power_in"), wire("missing")]), 0, None, vec!["power_out"]),
            (config("pump", vec![]), 1, None, vec!["power_in"]),
        ]);
        let mut diagnostics = Diagnostics::new();
        let stats = wire_connections(&mut world, &shapes, &entities, &mut diagnostics);
        assert_eq!(stats.wires, 1);
        assert_eq!(diagnostics.len(), 1);

        let wires = world.get::<&Wires>(entities[1].entity).unwrap();
        assert_eq!(wires.0.len(), 1);
        assert_eq!(wires.0[0].point, "power_in");
        assert_eq!(wires.0[0].other, entities[0].entity);
        assert_eq!(wires.0[0].other_point, "power_out");
    }

    #[test]
    fn test_unresolved_target_is_soft_failure() {
        let (mut world, shapes, entities) = setup(vec![
            (config("lamp", vec![link_to(PARENT_TARGET), link_to("nowhere")]), 0, None, vec![]),
        ]);
        let mut diagnostics = Diagnostics::new();
        let stats = wire_connections(&mut world, &shapes, &entities, &mut diagnostics);
        assert_eq!(stats, WiringStats::default());
        assert_eq!(diagnostics.len(), 2);
    }
}
