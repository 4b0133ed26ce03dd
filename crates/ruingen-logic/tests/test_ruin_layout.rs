//! Integration tests for the full layout pipeline.
//!
//! Exercises: split → scale → corridors → walls → entrance/distances
//! → hull partitioning → gaps
//!
//! All tests are pure geometry, no ECS and no catalog.

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ruingen_logic::bsp::SplitParams;
use ruingen_logic::corridor::CorridorParams;
use ruingen_logic::hull::{build_gaps, partition_hulls, Hull};
use ruingen_logic::layout::{build_layout, RuinLayout};
use ruingen_logic::validate::{validate_layout, Severity};
use ruingen_logic::Rect;

// ── Helpers ────────────────────────────────────────────────────────────

const AREA: Rect = Rect {
    x: 0,
    y: 0,
    width: 2000,
    height: 2000,
};

fn split_params() -> SplitParams {
    SplitParams {
        iterations: 3,
        vertical_split_probability: 0.5,
        min_width: 400,
        min_height: 400,
        ..Default::default()
    }
}

fn corridor_params() -> CorridorParams {
    CorridorParams {
        width_min: 80,
        width_max: 80,
    }
}

/// Build and label a layout, entered from below the area's centre line.
fn labelled_layout(seed: u64) -> RuinLayout {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut layout = build_layout(AREA, &split_params(), &corridor_params(), &mut rng);
    layout.label_from(Vec2::new(1000.0, -200.0), false);
    layout
}

fn hulls_of(layout: &RuinLayout) -> Vec<Hull> {
    partition_hulls(
        layout
            .shapes
            .iter()
            .enumerate()
            .map(|(i, s)| Hull::new(s.rect, i))
            .collect(),
    )
}

// ── Pipeline coherence tests ───────────────────────────────────────────

#[test]
fn rooms_stay_inside_their_leaves() {
    for seed in 0..20 {
        let layout = labelled_layout(seed);
        for leaf in layout.tree.leaves() {
            let room = layout.tree.rect(leaf);
            assert!(AREA.contains_rect(&room), "seed {}: {:?}", seed, room);
            // 0.6 minimum scale on a 400 minimum leaf
            assert!(room.width >= 240 && room.height >= 240, "seed {}: {:?}", seed, room);
        }
        assert_eq!(layout.room_count(), layout.tree.leaves().len());
    }
}

#[test]
fn exactly_one_entrance_and_positive_distances_elsewhere() {
    for seed in 0..20 {
        let layout = labelled_layout(seed);
        let zero: Vec<_> = layout
            .shapes
            .iter()
            .filter(|s| s.distance == Some(0))
            .collect();
        assert_eq!(zero.len(), 1, "seed {}", seed);
        assert!(!zero[0].is_corridor());
        for (i, shape) in layout.shapes.iter().enumerate() {
            let d = shape.distance;
            assert!(d.is_some(), "seed {}: shape {} unreachable", seed, i);
            assert!(d == Some(0) || d >= Some(1));
        }
    }
}

#[test]
fn every_shape_is_reachable_from_the_entrance() {
    for seed in 0..50 {
        let layout = labelled_layout(seed);
        let unreached: Vec<usize> = (0..layout.shapes.len())
            .filter(|&i| layout.shapes[i].distance.is_none())
            .collect();
        assert!(unreached.is_empty(), "seed {}: unreachable {:?}", seed, unreached);
        let connectivity = validate_layout(&layout.shapes, &hulls_of(&layout), &AREA)
            .into_iter()
            .filter(|e| e.category == "connectivity")
            .count();
        assert_eq!(connectivity, 0, "seed {}", seed);
    }
}

#[test]
fn corridor_neighbours_are_one_hop_apart() {
    let layout = labelled_layout(7);
    for shape in layout.shapes.iter().filter(|s| s.is_corridor()) {
        let Some(d) = shape.distance else { continue };
        let ruingen_logic::ShapeKind::Corridor { rooms, .. } = shape.kind else {
            unreachable!()
        };
        for room in rooms {
            let rd = layout.shapes[room].distance.expect("corridor endpoint labelled");
            assert!(rd.abs_diff(d) <= 1);
        }
    }
}

#[test]
fn partitioned_layout_validates_without_errors() {
    for seed in 0..20 {
        let layout = labelled_layout(seed);
        let hulls = hulls_of(&layout);
        let errors: Vec<_> = validate_layout(&layout.shapes, &hulls, &AREA)
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect();
        assert!(errors.is_empty(), "seed {}: {:?}", seed, errors);
    }
}

#[test]
fn partitioning_preserves_covered_area() {
    let layout = labelled_layout(3);
    let hulls = hulls_of(&layout);
    let hull_area: i64 = hulls.iter().map(|h| h.rect.area()).sum();
    let raw: i64 = layout.shapes.iter().map(|s| s.rect.area()).sum();
    assert!(hull_area <= raw);
    assert!(hull_area > 0);
}

#[test]
fn gaps_reference_valid_hulls() {
    let layout = labelled_layout(11);
    let hulls = hulls_of(&layout);
    let gaps = build_gaps(&hulls, &[], 32);
    assert!(!gaps.is_empty());
    for gap in &gaps {
        assert!(gap.hulls.iter().flatten().all(|&h| h < hulls.len()));
        assert!(gap.door.is_none());
    }
}

#[test]
fn deterministic_output() {
    let a = labelled_layout(99);
    let b = labelled_layout(99);
    assert_eq!(a.shapes, b.shapes);
    assert_eq!(hulls_of(&a), hulls_of(&b));
}
