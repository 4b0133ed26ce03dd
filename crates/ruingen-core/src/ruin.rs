//! The `Ruin` aggregate and the `generate_ruin` orchestrator.
//!
//! Step order is fixed: layout → entrance and distances → room types →
//! entity placement → hulls and gaps → wiring → mirror. Every random draw
//! happens in that order on the one RNG handle, so reordering steps changes
//! every ruin generated from a given seed.

use crate::catalog::RuinCatalog;
use crate::components::Bounds;
use crate::config::{GenerationParams, GenerationRequest};
use crate::hull_index::HullIndex;
use crate::issues::{Diagnostics, GenerationIssue};
use crate::placement::{place_entities, PlacementStats, RuinDoor, RuinEntity};
use crate::room_types::assign_room_types;
use crate::wiring::{wire_connections, WiringStats};
use hecs::World;
use rand::Rng;
use ruingen_logic::geometry::mirror_axis2;
use ruingen_logic::hull::{
    build_gaps, overlapping_pairs, partition_hulls, split_hulls_at_doors, DoorMarker, Gap, Hull,
};
use ruingen_logic::layout::build_layout;
use ruingen_logic::walls::merged_walls;
use ruingen_logic::{random, Line, Rect, RuinShape, ShapeId};

/// Cell size of the hull index handed out by [`Ruin::hull_index`].
pub const HULL_INDEX_CELL: f32 = 256.0;

/// One generated ruin. Entity handles refer to the `World` it was
/// generated into.
#[derive(Debug, Clone)]
pub struct Ruin {
    pub area: Rect,
    pub mirrored: bool,
    pub entrance: Option<ShapeId>,
    /// Rooms then corridors.
    pub shapes: Vec<RuinShape>,
    pub rooms: Vec<ShapeId>,
    pub corridors: Vec<ShapeId>,
    pub walls: Vec<Line>,
    pub hulls: Vec<Hull>,
    pub gaps: Vec<Gap>,
    pub entities: Vec<RuinEntity>,
    pub doors: Vec<RuinDoor>,
    pub diagnostics: Vec<GenerationIssue>,
    pub placement: PlacementStats,
    pub wiring: WiringStats,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuinStats {
    pub rooms: usize,
    pub corridors: usize,
    pub hulls: usize,
    pub gaps: usize,
    pub entities: usize,
    pub doors: usize,
    pub open_doors: usize,
    pub diagnostics: usize,
    pub unreachable: usize,
    /// Share of props that ended displacement without overlap.
    pub placement_convergence: f32,
}

impl Ruin {
    pub fn stats(&self) -> RuinStats {
        RuinStats {
            rooms: self.rooms.len(),
            corridors: self.corridors.len(),
            hulls: self.hulls.len(),
            gaps: self.gaps.len(),
            entities: self.entities.len(),
            doors: self.doors.len(),
            open_doors: self.doors.iter().filter(|d| d.open).count(),
            diagnostics: self.diagnostics.len(),
            unreachable: self.shapes.iter().filter(|s| s.distance.is_none()).count(),
            placement_convergence: self.placement.convergence(),
        }
    }

    pub fn hull_index(&self) -> HullIndex {
        HullIndex::build(&self.hulls, &self.area, HULL_INDEX_CELL)
    }

    /// Reflect everything about the area's vertical centre line.
    fn mirror(&mut self, world: &mut World) {
        let axis2 = mirror_axis2(&self.area);
        for shape in &mut self.shapes {
            shape.rect = shape.rect.mirrored_x(axis2);
            for wall in &mut shape.walls {
                *wall = wall.mirrored_x(axis2);
            }
        }
        for wall in &mut self.walls {
            *wall = wall.mirrored_x(axis2);
        }
        for hull in &mut self.hulls {
            hull.rect = hull.rect.mirrored_x(axis2);
        }
        // Left/right neighbours swap sides.
        for gap in &mut self.gaps {
            gap.rect = gap.rect.mirrored_x(axis2);
            if gap.is_horizontal {
                gap.hulls.swap(0, 1);
            }
        }
        for door in &mut self.doors {
            door.rect = door.rect.mirrored_x(axis2);
        }
        for e in &self.entities {
            if let Ok(mut bounds) = world.get::<&mut Bounds>(e.entity) {
                *bounds = bounds.mirrored_x(axis2);
            }
        }
    }
}

/// Disjoint hulls from the typed shapes, split at doors, with water fill.
fn build_hulls(
    shapes: &[RuinShape],
    doors: &[DoorMarker],
    catalog: &RuinCatalog,
    rng: &mut impl Rng,
) -> Vec<Hull> {
    let candidates: Vec<Hull> = shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| s.room_type.is_some())
        .map(|(i, s)| Hull::new(s.rect, i))
        .collect();
    let mut hulls = partition_hulls(candidates);
    split_hulls_at_doors(&mut hulls, doors);

    for hull in &mut hulls {
        let fill = shapes[hull.shape]
            .room_type
            .and_then(|t| catalog.room_type(t))
            .map(|rt| (rt.min_water_fill, rt.max_water_fill));
        if let Some((min, max)) = fill {
            hull.water_fill = random::range_f32(rng, min, max);
        }
    }
    hulls
}

/// Generate one ruin into `world`.
///
/// Never fails: every problem along the way is logged and recorded in
/// [`Ruin::diagnostics`], and the ruin is returned with whatever succeeded.
pub fn generate_ruin(
    world: &mut World,
    request: &GenerationRequest,
    params: &GenerationParams,
    catalog: &RuinCatalog,
    rng: &mut impl Rng,
) -> Ruin {
    let mut diagnostics = Diagnostics::new();

    let mut layout = build_layout(
        request.area,
        &params.split_params(),
        &params.corridor_params(),
        rng,
    );
    diagnostics.extend(
        layout
            .dropped_corridors
            .iter()
            .map(|d| GenerationIssue::GeometryDegenerate(d.to_string())),
    );
    let entrance = layout.label_from(request.path_point, request.mirror);
    if entrance.is_none() {
        diagnostics.report(GenerationIssue::GeometryDegenerate(format!(
            "no room to use as entrance in {:?}",
            request.area
        )));
    }
    let mut shapes = layout.shapes;

    diagnostics.extend(assign_room_types(&mut shapes, catalog, rng));

    let placement = place_entities(world, &mut shapes, catalog, params, &mut diagnostics, rng);

    let markers: Vec<DoorMarker> = placement
        .doors
        .iter()
        .map(|d| DoorMarker {
            rect: d.rect,
            is_horizontal: d.is_horizontal,
        })
        .collect();
    let hulls = build_hulls(&shapes, &markers, catalog, rng);
    let residual = overlapping_pairs(&hulls);
    if let Some(&(a, b)) = residual.first() {
        diagnostics.report(GenerationIssue::GeometryDegenerate(format!(
            "{} hull pairs still overlap after partitioning (first #{} and #{})",
            residual.len(),
            a,
            b
        )));
    }
    let gaps = build_gaps(&hulls, &markers, params.gap_thickness);

    let wiring = wire_connections(world, &shapes, &placement.entities, &mut diagnostics);

    let (rooms, corridors): (Vec<ShapeId>, Vec<ShapeId>) =
        (0..shapes.len()).partition(|&i| !shapes[i].is_corridor());
    let walls = merged_walls(&shapes);

    let mut ruin = Ruin {
        area: request.area,
        mirrored: request.mirror,
        entrance,
        shapes,
        rooms,
        corridors,
        walls,
        hulls,
        gaps,
        entities: placement.entities,
        doors: placement.doors,
        diagnostics: diagnostics.into_vec(),
        placement: placement.stats,
        wiring,
    };
    if request.mirror {
        ruin.mirror(world);
    }

    let stats = ruin.stats();
    log::info!(
        "Ruin generated: {} rooms, {} corridors, {} hulls, {} gaps, {} entities, {} doors, {} issues",
        stats.rooms,
        stats.corridors,
        stats.hulls,
        stats.gaps,
        stats.entities,
        stats.doors,
        stats.diagnostics
    );
    ruin
}
