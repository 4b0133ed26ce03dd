//! Integration tests for full ruin generation against the shipped catalog.
//!
//! Exercises: layout → room types → placement → hulls/gaps → wiring
//! → mirror → save/load

use glam::Vec2;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ruingen_core::catalog::{EntityKind, RuinCatalog};
use ruingen_core::components::{Bounds, ContainedIn, Placed, Resizable, Wires};
use ruingen_core::config::{GenerationParams, GenerationRequest};
use ruingen_core::engine::RuinSite;
use ruingen_core::issues::GenerationIssue;
use ruingen_core::persistence::to_save_data;
use ruingen_core::placement::interior_bounds;
use ruingen_core::ruin::{generate_ruin, Ruin};
use ruingen_logic::geometry::mirror_axis2;
use ruingen_logic::validate::{validate_layout, Severity};
use ruingen_logic::Rect;

const CATALOG_JSON: &str = include_str!("../../../data/ruin_catalog.json");

// ── Helpers ────────────────────────────────────────────────────────────

fn catalog() -> RuinCatalog {
    RuinCatalog::from_json_str(CATALOG_JSON).expect("shipped catalog parses")
}

/// Entered from below, on the vertical centre line.
fn request(mirror: bool) -> GenerationRequest {
    GenerationRequest::new(Rect::new(0, 0, 2000, 2000), Vec2::new(1000.0, -200.0)).mirrored(mirror)
}

fn generate(seed: u64, mirror: bool) -> (World, Ruin) {
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let ruin = generate_ruin(
        &mut world,
        &request(mirror),
        &GenerationParams::default(),
        &catalog(),
        &mut rng,
    );
    (world, ruin)
}

fn snapshot(world: &World, ruin: &Ruin) -> Vec<u8> {
    bincode::serialize(&to_save_data(world, ruin, None)).expect("snapshot serializes")
}

// ── Pipeline coherence tests ───────────────────────────────────────────

#[test]
fn deterministic_output() {
    for seed in [1, 17, 256] {
        let (wa, a) = generate(seed, false);
        let (wb, b) = generate(seed, false);
        assert_eq!(snapshot(&wa, &a), snapshot(&wb, &b), "seed {}", seed);
    }
}

#[test]
fn different_seeds_differ() {
    let (wa, a) = generate(1, false);
    let (wb, b) = generate(2, false);
    assert_ne!(snapshot(&wa, &a), snapshot(&wb, &b));
}

#[test]
fn every_shape_is_typed_and_entrance_is_first_type() {
    let catalog = catalog();
    for seed in 0..10 {
        let (_, ruin) = generate(seed, false);
        assert!(ruin.shapes.iter().all(|s| s.room_type.is_some()), "seed {}", seed);
        let entrance = ruin.entrance.expect("entrance chosen");
        let entrance_type = ruin.shapes[entrance].room_type.unwrap();
        assert_eq!(catalog.room_types[entrance_type].name, "entrance_hall");
        for &c in &ruin.corridors {
            let t = ruin.shapes[c].room_type.unwrap();
            assert!(catalog.room_types[t].is_corridor);
        }
        assert!(!ruin
            .diagnostics
            .iter()
            .any(|d| matches!(d, GenerationIssue::CatalogInconsistency(_))));
    }
}

#[test]
fn hulls_are_disjoint_and_inside_area() {
    for seed in 0..10 {
        let (_, ruin) = generate(seed, false);
        let errors: Vec<_> = validate_layout(&ruin.shapes, &ruin.hulls, &ruin.area)
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect();
        assert!(errors.is_empty(), "seed {}: {:?}", seed, errors);
        assert!(ruin.hulls.iter().all(|h| (0.0..=1.0).contains(&h.water_fill)));
    }
}

#[test]
fn doors_sit_in_corridors_with_a_gap_each() {
    let (world, ruin) = generate(5, false);
    assert!(!ruin.doors.is_empty());
    assert!(ruin.doors.len() <= ruin.corridors.len());
    for (index, door) in ruin.doors.iter().enumerate() {
        let entity = ruin.entities[door.entity].entity;
        let kind = world.get::<&Placed>(entity).unwrap().kind;
        let expected = if door.is_horizontal {
            EntityKind::Door
        } else {
            EntityKind::Hatch
        };
        assert_eq!(kind, expected);
        assert!(ruin.shapes[door.shape].is_corridor());
        assert!(ruin.gaps.iter().any(|g| g.door == Some(index)));
    }
}

#[test]
fn props_stay_inside_room_interiors() {
    let mut inside = 0;
    let mut total = 0;
    for seed in 0..10 {
        let (world, ruin) = generate(seed, false);
        for e in &ruin.entities {
            if e.config.kind != EntityKind::Prop
                || world.get::<&ContainedIn>(e.entity).is_ok()
                || world.get::<&Resizable>(e.entity).is_ok()
            {
                continue;
            }
            let bounds = *world.get::<&Bounds>(e.entity).unwrap();
            total += 1;
            if interior_bounds(&ruin.shapes[e.shape]).contains(&bounds) {
                inside += 1;
            }
        }
    }
    assert!(total > 0);
    assert!(inside as f32 / total as f32 >= 0.95, "{}/{} inside", inside, total);
}

#[test]
fn displacement_mostly_converges() {
    let (mut attempted, mut converged) = (0, 0);
    for seed in 0..10 {
        let (_, ruin) = generate(seed, false);
        attempted += ruin.placement.attempted;
        converged += ruin.placement.converged;
    }
    assert!(attempted > 0);
    assert!(converged as f32 / attempted as f32 >= 0.95, "{}/{}", converged, attempted);
}

#[test]
fn generator_powers_the_pump() {
    let (world, ruin) = generate(3, false);
    let find = |prefab: &str| ruin.entities.iter().find(|e| e.config.prefab == prefab);
    let (Some(generator), Some(pump)) = (find("generator"), find("pump")) else {
        panic!("entrance and vault are both typed");
    };
    let wires = world.get::<&Wires>(pump.entity).unwrap();
    assert!(wires
        .0
        .iter()
        .any(|w| w.other == generator.entity && w.point == "power_in" && w.other_point == "power_out"));
    assert!(ruin.wiring.wires >= 1);
}

#[test]
fn mirrored_ruin_is_a_reflection() {
    let (wp, plain) = generate(21, false);
    let (wm, mirrored) = generate(21, true);
    let axis2 = mirror_axis2(&plain.area);

    assert!(mirrored.mirrored);
    assert_eq!(plain.entrance, mirrored.entrance);
    let expected: Vec<Rect> = plain.hulls.iter().map(|h| h.rect.mirrored_x(axis2)).collect();
    let actual: Vec<Rect> = mirrored.hulls.iter().map(|h| h.rect).collect();
    assert_eq!(actual, expected);
    assert_eq!(plain.entities.len(), mirrored.entities.len());
    for (a, b) in plain.entities.iter().zip(&mirrored.entities) {
        let ba = *wp.get::<&Bounds>(a.entity).unwrap();
        let bb = *wm.get::<&Bounds>(b.entity).unwrap();
        assert_eq!(ba.mirrored_x(axis2), bb);
    }
}

#[test]
fn save_load_roundtrip_preserves_snapshot() {
    let mut site = RuinSite::new(catalog(), GenerationParams::default()).unwrap();
    site.generate(&request(false), 77);
    let mut buffer = Vec::new();
    site.save(&mut buffer).expect("save");

    let mut restored = RuinSite::new(catalog(), GenerationParams::default()).unwrap();
    restored.load(&buffer[..]).expect("load");

    let before = to_save_data(&site.world, site.ruin.as_ref().unwrap(), site.seed);
    let after = to_save_data(&restored.world, restored.ruin.as_ref().unwrap(), restored.seed);
    assert_eq!(
        bincode::serialize(&before).unwrap(),
        bincode::serialize(&after).unwrap()
    );
    assert_eq!(restored.ruin.as_ref().unwrap().stats(), site.ruin.as_ref().unwrap().stats());
}
