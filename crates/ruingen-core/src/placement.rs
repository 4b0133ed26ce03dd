//! Entity Placement Engine.
//!
//! Per typed shape, in order: walls, background, corridor door or hatch,
//! then props. Child configs are resolved after every shape is furnished so
//! that children targeting another room see its walls. Expanding groups are
//! stretched last, against the full wall set.

use crate::catalog::{Alignment, EntityConfig, EntityKind, PrefabDef, RoomTypeDef, RuinCatalog};
use crate::components::*;
use crate::config::GenerationParams;
use crate::issues::{Diagnostics, GenerationIssue};
use crate::relative::resolve_relative;
use glam::Vec2;
use hecs::{Entity, EntityBuilder, World};
use rand::Rng;
use ruingen_logic::random;
use ruingen_logic::walls::merged_walls;
use ruingen_logic::{Line, Rect, RuinShape, ShapeId};
use serde::{Deserialize, Serialize};

/// Trimmed from each end of a horizontal wall so corners don't double up.
pub const WALL_CORNER_SHAVE: i32 = 32;

/// A placed instance and where it came from.
#[derive(Debug, Clone)]
pub struct RuinEntity {
    pub config: EntityConfig,
    pub entity: Entity,
    pub shape: ShapeId,
    /// Index of the parent in the ruin's entity list.
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuinDoor {
    /// Index into the ruin's entity list.
    pub entity: usize,
    pub shape: ShapeId,
    pub rect: Rect,
    pub is_horizontal: bool,
    pub open: bool,
}

/// Displacement convergence over spatially placed props.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementStats {
    pub attempted: usize,
    pub converged: usize,
}

impl PlacementStats {
    pub fn convergence(&self) -> f32 {
        if self.attempted == 0 {
            1.0
        } else {
            self.converged as f32 / self.attempted as f32
        }
    }
}

#[derive(Debug, Default)]
pub struct PlacementOutput {
    pub entities: Vec<RuinEntity>,
    pub doors: Vec<RuinDoor>,
    pub stats: PlacementStats,
}

/// A shape's rect inset by the thickness of the walls on each side.
pub fn interior_bounds(shape: &RuinShape) -> Bounds {
    let r = shape.rect;
    // left, bottom, right, top
    let mut inset = [0.0f32; 4];
    for line in &shape.walls {
        let side = if line.is_horizontal() {
            if line.a.y == r.y {
                Some(1)
            } else if line.a.y == r.top() {
                Some(3)
            } else {
                None
            }
        } else if line.a.x == r.x {
            Some(0)
        } else if line.a.x == r.right() {
            Some(2)
        } else {
            None
        };
        if let Some(side) = side {
            inset[side] = inset[side].max(line.radius * 2.0);
        }
    }
    Bounds::from_rect(&r).inset(inset[0], inset[1], inset[2], inset[3])
}

fn anchor_point(interior: &Bounds, size: Vec2, alignment: Alignment) -> Vec2 {
    let reach = (interior.half() - size * 0.5).max(Vec2::ZERO);
    let c = interior.center;
    match alignment {
        Alignment::Top => c + Vec2::new(0.0, reach.y),
        Alignment::Bottom => c - Vec2::new(0.0, reach.y),
        Alignment::Left => c - Vec2::new(reach.x, 0.0),
        Alignment::Right => c + Vec2::new(reach.x, 0.0),
        Alignment::Center => c,
    }
}

fn unit_sign(v: f32) -> f32 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

fn missing_prefab(config: &EntityConfig) -> GenerationIssue {
    GenerationIssue::CatalogInconsistency(format!("unknown prefab '{}'", config.prefab))
}

pub struct PlacementEngine<'a> {
    world: &'a mut World,
    catalog: &'a RuinCatalog,
    params: &'a GenerationParams,
    diagnostics: &'a mut Diagnostics,
    entities: Vec<RuinEntity>,
    doors: Vec<RuinDoor>,
    stats: PlacementStats,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(
        world: &'a mut World,
        catalog: &'a RuinCatalog,
        params: &'a GenerationParams,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            world,
            catalog,
            params,
            diagnostics,
            entities: Vec::new(),
            doors: Vec::new(),
            stats: PlacementStats::default(),
        }
    }

    pub fn finish(self) -> PlacementOutput {
        PlacementOutput {
            entities: self.entities,
            doors: self.doors,
            stats: self.stats,
        }
    }

    fn spawn(
        &mut self,
        config: &EntityConfig,
        prefab: &PrefabDef,
        bounds: Bounds,
        shape: ShapeId,
        parent: Option<usize>,
    ) -> usize {
        let mut builder = EntityBuilder::new();
        builder
            .add(Placed::new(&prefab.identifier, config.kind))
            .add(bounds)
            .add(Tags(prefab.tags.clone()));
        if !prefab.connection_points.is_empty() {
            builder.add(ConnectionPanel {
                points: prefab.connection_points.clone(),
            });
        }
        if prefab.container {
            builder.add(Container::default());
        }
        if prefab.resize_horizontal || prefab.resize_vertical {
            builder.add(Resizable {
                horizontal: prefab.resize_horizontal,
                vertical: prefab.resize_vertical,
            });
        }
        let entity = self.world.spawn(builder.build());
        self.entities.push(RuinEntity {
            config: config.clone(),
            entity,
            shape,
            parent,
        });
        self.entities.len() - 1
    }

    fn bounds_of(&self, index: usize) -> Option<Bounds> {
        self.world
            .get::<&Bounds>(self.entities[index].entity)
            .ok()
            .map(|b| *b)
    }

    fn is_nested(&self, index: usize) -> bool {
        self.world
            .get::<&ContainedIn>(self.entities[index].entity)
            .is_ok()
    }

    /// One wall entity per line that still spans at least a grid unit after
    /// shaving. Sets each furnished line's radius.
    pub fn place_walls(&mut self, shapes: &mut [RuinShape], id: ShapeId, def: &RoomTypeDef) {
        let catalog = self.catalog;
        for line_index in 0..shapes[id].walls.len() {
            let line = shapes[id].walls[line_index];
            let horizontal = line.is_horizontal();
            let Some(config) = def
                .entities_of(EntityKind::Wall)
                .find(|c| c.fits_wall(horizontal))
            else {
                continue;
            };
            let Some(prefab) = catalog.prefab(&config.prefab) else {
                self.diagnostics.report(missing_prefab(config));
                continue;
            };
            let shave = if horizontal { WALL_CORNER_SHAVE } else { 0 };
            let span = line.length() - 2 * shave;
            if span < self.params.placement_grid {
                log::debug!("Skipping {}-unit wall in shape {}", line.length(), id);
                continue;
            }
            let thickness = prefab.size.y;
            shapes[id].walls[line_index].radius = thickness / 2.0;
            let size = if horizontal {
                Vec2::new(span as f32, thickness)
            } else {
                Vec2::new(thickness, span as f32)
            };
            self.spawn(config, prefab, Bounds::new(line.midpoint(), size), id, None);
        }
    }

    pub fn place_background(&mut self, shapes: &[RuinShape], id: ShapeId, def: &RoomTypeDef) {
        let Some(config) = def.entities_of(EntityKind::Background).next() else {
            return;
        };
        let catalog = self.catalog;
        match catalog.prefab(&config.prefab) {
            Some(prefab) => {
                self.spawn(config, prefab, Bounds::from_rect(&shapes[id].rect), id, None);
            }
            None => self.diagnostics.report(missing_prefab(config)),
        }
    }

    /// A door (horizontal corridor) or hatch (vertical corridor) across the
    /// corridor, at the midpoint of a random wall running along it.
    pub fn place_door(
        &mut self,
        shapes: &[RuinShape],
        id: ShapeId,
        def: &RoomTypeDef,
        rng: &mut impl Rng,
    ) -> Result<(), GenerationIssue> {
        let shape = &shapes[id];
        let Some(is_horizontal) = shape.corridor_orientation() else {
            return Ok(());
        };
        let kind = if is_horizontal {
            EntityKind::Door
        } else {
            EntityKind::Hatch
        };
        let Some(config) = def.entities_of(kind).next() else {
            return Ok(());
        };
        let catalog = self.catalog;
        let prefab = catalog
            .prefab(&config.prefab)
            .ok_or_else(|| missing_prefab(config))?;

        let walls: Vec<&Line> = shape
            .walls
            .iter()
            .filter(|w| w.is_horizontal() == is_horizontal)
            .collect();
        if walls.is_empty() {
            return Err(GenerationIssue::GeometryDegenerate(format!(
                "corridor {} has no wall left for a {:?}",
                id, kind
            )));
        }
        let mid = walls[random::index(rng, walls.len())].midpoint();
        let r = shape.rect;
        let rect = if is_horizontal {
            let w = (prefab.size.x.round() as i32).max(1);
            Rect::new(mid.x.round() as i32 - w / 2, r.y, w, r.height)
        } else {
            let h = (prefab.size.y.round() as i32).max(1);
            Rect::new(r.x, mid.y.round() as i32 - h / 2, r.width, h)
        };
        let open = random::chance(rng, self.params.door_open_probability);

        let index = self.spawn(config, prefab, Bounds::from_rect(&rect), id, None);
        let entity = self.entities[index].entity;
        let _ = self.world.insert_one(
            entity,
            DoorState {
                open,
                is_horizontal,
            },
        );
        self.doors.push(RuinDoor {
            entity: index,
            shape: id,
            rect,
            is_horizontal,
            open,
        });
        Ok(())
    }

    pub fn place_props(
        &mut self,
        shapes: &[RuinShape],
        id: ShapeId,
        def: &RoomTypeDef,
        rng: &mut impl Rng,
    ) {
        for config in def.entities_of(EntityKind::Prop) {
            let amount = random::range_u32(rng, config.min_amount, config.max_amount);
            for _ in 0..amount {
                let placed = self.place_instance(shapes, id, config, None, rng);
                self.diagnostics.check(placed);
            }
        }
    }

    fn find_container(&self, shape: ShapeId, tag: &str) -> Option<usize> {
        self.entities.iter().position(|e| {
            e.shape == shape
                && self
                    .catalog
                    .prefab(&e.config.prefab)
                    .is_some_and(|p| p.container && p.has_tag(tag))
        })
    }

    fn nest(
        &mut self,
        config: &EntityConfig,
        prefab: &PrefabDef,
        shape: ShapeId,
        container: usize,
        parent: Option<usize>,
    ) -> usize {
        let center = self
            .bounds_of(container)
            .map_or(Vec2::ZERO, |b| b.center);
        let index = self.spawn(config, prefab, Bounds::new(center, prefab.size), shape, parent);
        let container_entity = self.entities[container].entity;
        let entity = self.entities[index].entity;
        let _ = self.world.insert_one(entity, ContainedIn(container_entity));
        if let Ok(mut contents) = self.world.get::<&mut Container>(container_entity) {
            contents.contents.push(entity);
        }
        index
    }

    /// Push `start` out of overlapping non-structural entities anywhere in
    /// `interior`, whichever shape placed them. Corridor ends overlap the
    /// rooms they join. Returns the final centre and whether it ended clear.
    fn displace(&self, interior: &Bounds, start: Vec2, size: Vec2) -> (Vec2, bool) {
        let blockers: Vec<Bounds> = (0..self.entities.len())
            .filter(|&i| !self.entities[i].config.kind.is_structural() && !self.is_nested(i))
            .filter_map(|i| self.bounds_of(i))
            .filter(|b| b.overlaps(interior))
            .collect();

        let mut center = start;
        for _ in 0..self.params.max_displacement_iterations {
            let candidate = Bounds::new(center, size);
            let Some(blocker) = blockers.iter().find(|b| b.overlaps(&candidate)) else {
                return (center, true);
            };
            let d = center - blocker.center;
            let penetration = (blocker.half() + candidate.half()) - d.abs();
            let step = self.params.displacement_step;
            let along_x = interior.clamp_center(center + Vec2::new(unit_sign(d.x) * step, 0.0), size);
            let along_y = interior.clamp_center(center + Vec2::new(0.0, unit_sign(d.y) * step), size);
            let (preferred, fallback) = if penetration.x < penetration.y {
                (along_x, along_y)
            } else {
                (along_y, along_x)
            };
            // Pinned against the interior edge: slide along the other axis.
            center = if preferred != center { preferred } else { fallback };
        }
        let candidate = Bounds::new(center, size);
        let clear = !blockers.iter().any(|b| b.overlaps(&candidate));
        (center, clear)
    }

    /// Place one instance of `config` in `shape`, nesting it in a tagged
    /// container when one exists and otherwise placing it in space.
    pub fn place_instance(
        &mut self,
        shapes: &[RuinShape],
        shape: ShapeId,
        config: &EntityConfig,
        parent: Option<usize>,
        rng: &mut impl Rng,
    ) -> Result<usize, GenerationIssue> {
        let catalog = self.catalog;
        let prefab = catalog
            .prefab(&config.prefab)
            .ok_or_else(|| missing_prefab(config))?;

        if let Some(tag) = &config.container_tag {
            match self.find_container(shape, tag) {
                Some(container) => return Ok(self.nest(config, prefab, shape, container, parent)),
                None => self.diagnostics.report(GenerationIssue::ResolutionMiss(format!(
                    "no container tagged '{}' in shape {} for '{}'",
                    tag, shape, config.prefab
                ))),
            }
        }

        let interior = interior_bounds(&shapes[shape]);
        let size = prefab.size;
        let alignment = if config.alignment.is_empty() {
            Alignment::Center
        } else {
            config.alignment[random::index(rng, config.alignment.len())]
        };
        let anchor = anchor_point(&interior, size, alignment);
        let offset = Vec2::new(
            random::sign(rng) * random::range_f32(rng, config.min_offset, config.max_offset),
            random::sign(rng) * random::range_f32(rng, config.min_offset, config.max_offset),
        ) * interior.size;
        let start = interior.clamp_center(anchor + offset, size);
        let (center, clear) = self.displace(&interior, start, size);

        self.stats.attempted += 1;
        if clear {
            self.stats.converged += 1;
        } else {
            log::debug!(
                "'{}' in shape {} still overlaps after displacement",
                config.prefab,
                shape
            );
        }
        Ok(self.spawn(config, prefab, Bounds::new(center, size), shape, parent))
    }

    /// Place children of every entity, including children added here.
    pub fn resolve_children(&mut self, shapes: &[RuinShape], rng: &mut impl Rng) {
        let mut index = 0;
        while index < self.entities.len() {
            let from = self.entities[index].shape;
            let children = self.entities[index].config.children.clone();
            for child in &children {
                let Some(target) = resolve_relative(shapes, from, child.placement) else {
                    self.diagnostics.report(GenerationIssue::ResolutionMiss(format!(
                        "no {:?} from shape {} for child '{}'",
                        child.placement, from, child.prefab
                    )));
                    continue;
                };
                let amount = random::range_u32(rng, child.min_amount, child.max_amount);
                for _ in 0..amount {
                    let placed = self.place_instance(shapes, target, child, Some(index), rng);
                    self.diagnostics.check(placed);
                }
            }
            index += 1;
        }
    }

    /// Members of the group rooted at `root`: itself plus spatially placed
    /// descendants in the same shape.
    fn group(&self, root: usize) -> Vec<usize> {
        let mut in_group = vec![false; self.entities.len()];
        let mut members = Vec::new();
        for i in root..self.entities.len() {
            let e = &self.entities[i];
            in_group[i] = i == root || e.parent.is_some_and(|p| p >= root && in_group[p]);
            if in_group[i] && e.shape == self.entities[root].shape && !self.is_nested(i) {
                members.push(i);
            }
        }
        members
    }

    /// Stretch resizable members of each expanding group towards the
    /// nearest wall in the direction from the group centre.
    pub fn expand_groups(&mut self, shapes: &[RuinShape]) {
        let walls = merged_walls(shapes);
        for root in 0..self.entities.len() {
            let is_root = self.entities[root].config.expand
                && !self.entities[root]
                    .parent
                    .is_some_and(|p| self.entities[p].config.expand);
            if !is_root {
                continue;
            }
            let members = self.group(root);
            let Some(group) = members
                .iter()
                .filter_map(|&m| self.bounds_of(m))
                .reduce(|a, b| a.union(&b))
            else {
                continue;
            };

            for &m in &members {
                let entity = self.entities[m].entity;
                let Ok(resizable) = self.world.get::<&Resizable>(entity).map(|r| *r) else {
                    continue;
                };
                let Some(bounds) = self.bounds_of(m) else {
                    continue;
                };
                let dir = (bounds.center - group.center).normalize_or_zero();
                if dir == Vec2::ZERO {
                    continue;
                }
                let half = group.half();
                let reach = [(half.x, dir.x), (half.y, dir.y)]
                    .iter()
                    .filter(|(_, d)| d.abs() > f32::EPSILON)
                    .map(|(h, d)| h / d.abs())
                    .fold(f32::INFINITY, f32::min);
                // Distance to the wall face, measured along the ray.
                let hit = walls
                    .iter()
                    .filter_map(|w| {
                        let t = w.ray_distance(group.center, dir)?;
                        let across = if w.is_horizontal() { dir.y } else { dir.x }.abs();
                        (across > f32::EPSILON).then(|| t - w.radius / across)
                    })
                    .fold(f32::INFINITY, f32::min);
                if !hit.is_finite() || !reach.is_finite() || hit <= reach {
                    continue;
                }
                let extra = (hit - reach) * dir.abs();
                let mut stretched = bounds;
                if resizable.horizontal {
                    stretched.size.x += extra.x;
                    stretched.center.x += unit_sign(dir.x) * extra.x * 0.5;
                }
                if resizable.vertical {
                    stretched.size.y += extra.y;
                    stretched.center.y += unit_sign(dir.y) * extra.y * 0.5;
                }
                if let Ok(mut b) = self.world.get::<&mut Bounds>(entity) {
                    *b = stretched;
                }
            }
        }
    }
}

/// Furnish every typed shape. Soft failures go to `diagnostics`.
pub fn place_entities(
    world: &mut World,
    shapes: &mut [RuinShape],
    catalog: &RuinCatalog,
    params: &GenerationParams,
    diagnostics: &mut Diagnostics,
    rng: &mut impl Rng,
) -> PlacementOutput {
    let mut engine = PlacementEngine::new(world, catalog, params, diagnostics);

    for id in 0..shapes.len() {
        let Some(type_index) = shapes[id].room_type else {
            continue;
        };
        let Some(def) = catalog.room_type(type_index) else {
            engine.diagnostics.report(GenerationIssue::CatalogInconsistency(format!(
                "shape {} has unknown room type {}",
                id, type_index
            )));
            continue;
        };
        engine.place_walls(shapes, id, def);
        engine.place_background(shapes, id, def);
        let door = engine.place_door(shapes, id, def, rng);
        engine.diagnostics.check(door);
        engine.place_props(shapes, id, def, rng);
    }
    engine.resolve_children(shapes, rng);
    engine.expand_groups(shapes);

    let output = engine.finish();
    log::debug!(
        "Placed {} entities, {} doors, {}/{} props clear",
        output.entities.len(),
        output.doors.len(),
        output.stats.converged,
        output.stats.attempted
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Placement;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn prefab(id: &str, size: Vec2) -> PrefabDef {
        PrefabDef {
            identifier: id.into(),
            size,
            tags: Vec::new(),
            connection_points: Vec::new(),
            container: false,
            resize_horizontal: false,
            resize_vertical: false,
        }
    }

    fn entity(prefab: &str, kind: EntityKind) -> EntityConfig {
        EntityConfig {
            prefab: prefab.into(),
            kind,
            alignment: vec![Alignment::Center],
            min_offset: 0.0,
            max_offset: 0.0,
            min_amount: 1,
            max_amount: 1,
            container_tag: None,
            expand: false,
            placement: Default::default(),
            children: Vec::new(),
            connections: Vec::new(),
        }
    }

    fn room_type(is_corridor: bool, entities: Vec<EntityConfig>) -> RoomTypeDef {
        RoomTypeDef {
            name: "test".into(),
            placement: Placement::Any,
            placement_offset: 0,
            is_corridor,
            min_water_fill: 0.0,
            max_water_fill: 0.0,
            entities,
        }
    }

    fn catalog(entities: Vec<EntityConfig>, extra: Vec<PrefabDef>) -> RuinCatalog {
        let mut prefabs = vec![
            prefab("wall", Vec2::new(64.0, 16.0)),
            prefab("door", Vec2::new(16.0, 80.0)),
            prefab("crate", Vec2::new(40.0, 40.0)),
        ];
        prefabs.extend(extra);
        RuinCatalog {
            prefabs,
            room_types: vec![room_type(false, entities.clone()), room_type(true, entities)],
        }
    }

    fn room(rect: Rect) -> RuinShape {
        let mut shape = RuinShape::room(rect, 0);
        shape.create_walls();
        shape.room_type = Some(0);
        shape
    }

    fn run(catalog: &RuinCatalog, shapes: &mut [RuinShape], seed: u64) -> (World, PlacementOutput, Diagnostics) {
        let mut world = World::new();
        let mut diagnostics = Diagnostics::new();
        let params = GenerationParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let out = place_entities(&mut world, shapes, catalog, &params, &mut diagnostics, &mut rng);
        (world, out, diagnostics)
    }

    #[test]
    fn test_walls_shaved_and_radius_set() {
        let cat = catalog(vec![entity("wall", EntityKind::Wall)], vec![]);
        let mut shapes = vec![room(Rect::new(0, 0, 400, 300))];
        let (world, out, diagnostics) = run(&cat, &mut shapes, 1);
        assert!(diagnostics.is_empty());
        assert_eq!(out.entities.len(), 4);
        assert!(shapes[0].walls.iter().all(|w| w.radius == 8.0));

        let widths: Vec<f32> = out
            .entities
            .iter()
            .map(|e| world.get::<&Bounds>(e.entity).unwrap().size.x)
            .collect();
        // bottom, top: 400 - 64; left, right: wall thickness
        assert_eq!(widths, vec![336.0, 336.0, 16.0, 16.0]);
    }

    #[test]
    fn test_short_horizontal_wall_skipped() {
        let cat = catalog(vec![entity("wall", EntityKind::Wall)], vec![]);
        let mut shapes = vec![room(Rect::new(0, 0, 70, 300))];
        let (_, out, _) = run(&cat, &mut shapes, 1);
        // 70 - 64 = 6 < grid 16: only the vertical walls get entities.
        assert_eq!(out.entities.len(), 2);
    }

    #[test]
    fn test_interior_bounds_inset_by_wall_thickness() {
        let mut shape = room(Rect::new(0, 0, 400, 300));
        for w in &mut shape.walls {
            w.radius = 8.0;
        }
        let interior = interior_bounds(&shape);
        assert_eq!(interior.min(), Vec2::new(16.0, 16.0));
        assert_eq!(interior.max(), Vec2::new(384.0, 284.0));
    }

    #[test]
    fn test_props_displaced_apart() {
        let mut crates = entity("crate", EntityKind::Prop);
        crates.min_amount = 4;
        crates.max_amount = 4;
        let cat = catalog(vec![entity("wall", EntityKind::Wall), crates], vec![]);
        let mut shapes = vec![room(Rect::new(0, 0, 400, 400))];
        let (world, out, _) = run(&cat, &mut shapes, 7);

        let props: Vec<Bounds> = out
            .entities
            .iter()
            .filter(|e| e.config.kind == EntityKind::Prop)
            .map(|e| *world.get::<&Bounds>(e.entity).unwrap())
            .collect();
        assert_eq!(props.len(), 4);
        assert_eq!(out.stats.attempted, 4);
        assert_eq!(out.stats.converged, 4);
        let interior = interior_bounds(&shapes[0]);
        for (i, a) in props.iter().enumerate() {
            assert!(interior.contains(a));
            for b in &props[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_props_avoid_props_of_overlapping_shapes() {
        let cat = catalog(vec![entity("crate", EntityKind::Prop)], vec![]);
        let mut corridor = RuinShape::corridor(Rect::new(0, 160, 400, 80), true, [0, 0]);
        corridor.create_walls();
        corridor.room_type = Some(1);
        let mut shapes = vec![room(Rect::new(0, 0, 400, 400)), corridor];
        let (world, out, _) = run(&cat, &mut shapes, 1);

        // Both interiors are centred on (200, 200).
        let crates: Vec<Bounds> = out
            .entities
            .iter()
            .map(|e| *world.get::<&Bounds>(e.entity).unwrap())
            .collect();
        assert_eq!(crates.len(), 2);
        assert_eq!(out.entities[1].shape, 1);
        assert!(!crates[0].overlaps(&crates[1]), "{:?} overlaps {:?}", crates[0], crates[1]);
        assert!(interior_bounds(&shapes[1]).contains(&crates[1]));
        assert_eq!(out.stats.converged, 2);
    }

    #[test]
    fn test_missing_prefab_is_catalog_issue() {
        let cat = catalog(vec![entity("ghost", EntityKind::Prop)], vec![]);
        let mut shapes = vec![room(Rect::new(0, 0, 400, 400))];
        let (_, out, diagnostics) = run(&cat, &mut shapes, 1);
        assert!(out.entities.is_empty());
        assert!(matches!(
            diagnostics.into_vec()[0],
            GenerationIssue::CatalogInconsistency(_)
        ));
    }

    #[test]
    fn test_container_nesting_and_fallback() {
        let mut chest = prefab("chest", Vec2::new(60.0, 40.0));
        chest.container = true;
        chest.tags = vec!["storage".into()];
        let mut coin = entity("crate", EntityKind::Prop);
        coin.container_tag = Some("storage".into());

        // No container yet: falls back to spatial placement with a miss.
        let cat = catalog(vec![coin.clone()], vec![chest.clone()]);
        let mut shapes = vec![room(Rect::new(0, 0, 400, 400))];
        let (world, out, diagnostics) = run(&cat, &mut shapes, 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(world.get::<&ContainedIn>(out.entities[0].entity).is_err());

        // Container placed first: nested, not spatial.
        let cat = catalog(vec![entity("chest", EntityKind::Prop), coin], vec![chest]);
        let mut shapes = vec![room(Rect::new(0, 0, 400, 400))];
        let (world, out, diagnostics) = run(&cat, &mut shapes, 1);
        assert!(diagnostics.is_empty());
        let (chest_e, coin_e) = (out.entities[0].entity, out.entities[1].entity);
        assert_eq!(world.get::<&ContainedIn>(coin_e).unwrap().0, chest_e);
        assert_eq!(world.get::<&Container>(chest_e).unwrap().contents, vec![coin_e]);
        assert_eq!(out.stats.attempted, 1);
    }

    #[test]
    fn test_corridor_gets_door() {
        let cat = catalog(
            vec![entity("wall", EntityKind::Wall), entity("door", EntityKind::Door)],
            vec![],
        );
        let mut corridor = RuinShape::corridor(Rect::new(0, 100, 400, 80), true, [0, 0]);
        corridor.create_walls();
        corridor.room_type = Some(1);
        let mut shapes = vec![corridor];
        let (world, out, diagnostics) = run(&cat, &mut shapes, 3);
        assert!(diagnostics.is_empty());
        assert_eq!(out.doors.len(), 1);
        let door = &out.doors[0];
        assert_eq!(door.rect, Rect::new(192, 100, 16, 80));
        assert!(door.is_horizontal);
        let state = *world.get::<&DoorState>(out.entities[door.entity].entity).unwrap();
        assert_eq!(state.open, door.open);
    }

    #[test]
    fn test_child_placed_in_next_room() {
        let mut parent = entity("crate", EntityKind::Prop);
        let mut child = entity("crate", EntityKind::Prop);
        child.placement = crate::catalog::RelativePlacement::NextRoom;
        parent.children = vec![child];
        let cat = catalog(vec![parent], vec![]);
        let mut shapes = vec![room(Rect::new(0, 0, 400, 400)), room(Rect::new(600, 0, 400, 400))];
        shapes[0].distance = Some(0);
        shapes[1].distance = Some(2);
        let (_, out, _) = run(&cat, &mut shapes, 1);

        // Each room's own crate, plus a child of room 0's crate in room 1.
        // Room 1's crate has no next room, which is a soft miss.
        let children: Vec<&RuinEntity> = out.entities.iter().filter(|e| e.parent.is_some()).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].shape, 1);
        assert_eq!(out.entities[children[0].parent.unwrap()].shape, 0);
    }

    #[test]
    fn test_expand_stretches_towards_walls() {
        let mut beam = prefab("beam", Vec2::new(20.0, 20.0));
        beam.resize_horizontal = true;
        let mut frame = entity("crate", EntityKind::Prop);
        frame.expand = true;
        let mut member = entity("beam", EntityKind::Prop);
        member.alignment = vec![Alignment::Right];
        member.expand = true;
        frame.children = vec![member];
        let cat = catalog(vec![entity("wall", EntityKind::Wall), frame], vec![beam]);
        let mut shapes = vec![room(Rect::new(0, 0, 400, 400))];
        let (world, out, _) = run(&cat, &mut shapes, 1);

        let beam = out.entities.iter().find(|e| e.config.prefab == "beam").unwrap();
        let b = *world.get::<&Bounds>(beam.entity).unwrap();
        assert!(b.size.x > 20.0);
        assert_eq!(b.size.y, 20.0);
        // Never past the inner face of the right wall.
        assert!(b.max().x <= 392.0 + 0.01);
    }

    #[test]
    fn test_diagonal_expand_stops_at_wall_face() {
        let mut beam = prefab("beam", Vec2::new(20.0, 20.0));
        beam.resize_horizontal = true;
        beam.resize_vertical = true;
        let mut frame = entity("crate", EntityKind::Prop);
        frame.alignment = vec![Alignment::Left];
        frame.expand = true;
        let mut member = entity("beam", EntityKind::Prop);
        member.alignment = vec![Alignment::Top];
        member.expand = true;
        frame.children = vec![member];
        let cat = catalog(vec![entity("wall", EntityKind::Wall), frame], vec![beam]);
        let mut shapes = vec![room(Rect::new(0, 0, 400, 600))];
        let (world, out, _) = run(&cat, &mut shapes, 1);

        // The beam sits up and to the right of the group centre, so the
        // ray towards the top wall is diagonal.
        let beam = out.entities.iter().find(|e| e.config.prefab == "beam").unwrap();
        let b = *world.get::<&Bounds>(beam.entity).unwrap();
        assert!(b.size.x > 20.0 && b.size.y > 20.0);
        assert!(b.max().y <= 592.0 + 0.01, "{:?}", b);
        assert!(b.max().y >= 592.0 - 0.1, "{:?}", b);
    }
}
