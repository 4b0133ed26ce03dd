//! Ruingen Headless Generation Harness
//!
//! Sweeps seeds through the full generator and checks the properties every
//! ruin must have. Runs entirely in-process, no rendering.
//!
//! Usage:
//!   cargo run -p ruingen-simtest
//!   cargo run -p ruingen-simtest -- --verbose
//!   cargo run -p ruingen-simtest -- --seeds 200

use std::collections::BTreeMap;

use glam::Vec2;
use ruingen_core::catalog::{EntityConfig, EntityKind, Placement, RuinCatalog, PARENT_TARGET};
use ruingen_core::components::{Bounds, ContainedIn, Resizable};
use ruingen_core::config::{GenerationParams, GenerationRequest};
use ruingen_core::engine::RuinSite;
use ruingen_core::persistence::to_save_data;
use ruingen_core::placement::interior_bounds;
use ruingen_core::ruin::Ruin;
use ruingen_logic::geometry::mirror_axis2;
use ruingen_logic::validate::{validate_layout, Severity};
use ruingen_logic::Rect;

// ── Catalog (same JSON the tests use) ───────────────────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/ruin_catalog.json");

const AREA: Rect = Rect {
    x: 0,
    y: 0,
    width: 2000,
    height: 2000,
};

/// Share of props that must end inside their room's interior.
const CONTAINMENT_TARGET: f32 = 0.95;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn parse_seeds(args: &[String]) -> u64 {
    args.iter()
        .position(|a| a == "--seeds")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(50)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seeds = parse_seeds(&args);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "info" }),
    )
    .init();

    println!("=== Ruingen Generation Harness ===\n");

    let mut results = Vec::new();

    let catalog = match RuinCatalog::from_json_str(CATALOG_JSON) {
        Ok(c) => c,
        Err(e) => {
            log::error!("catalog_parse: {}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Loaded catalog: {} prefabs, {} room types; sweeping {} seeds",
        catalog.prefabs.len(),
        catalog.room_types.len(),
        seeds
    );

    // 1. Catalog consistency
    results.extend(validate_catalog(&catalog));

    // 2. Seed sweep
    results.extend(validate_seed_sweep(&catalog, seeds, verbose));

    // 3. Mirror symmetry
    results.extend(validate_mirror(&catalog));

    // 4. Determinism and persistence
    results.extend(validate_persistence(&catalog));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn new_site(catalog: &RuinCatalog) -> Option<RuinSite> {
    RuinSite::new(catalog.clone(), GenerationParams::default()).ok()
}

fn request(mirror: bool) -> GenerationRequest {
    GenerationRequest::new(AREA, Vec2::new(1000.0, -200.0)).mirrored(mirror)
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

/// Every config in the catalog, children included, with its parent's prefab.
fn all_configs(catalog: &RuinCatalog) -> Vec<(&EntityConfig, Option<&str>)> {
    let mut out = Vec::new();
    let mut stack: Vec<(&EntityConfig, Option<&str>)> = catalog
        .room_types
        .iter()
        .flat_map(|rt| rt.entities.iter().map(|e| (e, None)))
        .collect();
    while let Some((config, parent)) = stack.pop() {
        stack.extend(config.children.iter().map(move |c| (c, Some(config.prefab.as_str()))));
        out.push((config, parent));
    }
    out
}

fn validate_catalog(catalog: &RuinCatalog) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();
    let configs = all_configs(catalog);

    let missing: Vec<&str> = configs
        .iter()
        .filter(|(c, _)| catalog.prefab(&c.prefab).is_none())
        .map(|(c, _)| c.prefab.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_prefabs_exist".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            format!("{} entity configs resolve", configs.len())
        } else {
            format!("unknown prefabs: {}", missing.join(", "))
        },
    });

    let has_first = catalog
        .room_types
        .iter()
        .any(|rt| rt.placement == Placement::First && !rt.is_corridor);
    results.push(TestResult {
        name: "catalog_has_entrance_type".into(),
        passed: has_first,
        detail: "a 'first' room type marks the entrance".into(),
    });

    for is_corridor in [false, true] {
        let has_pool = catalog
            .room_types
            .iter()
            .any(|rt| rt.placement == Placement::Any && rt.is_corridor == is_corridor);
        results.push(TestResult {
            name: format!("catalog_any_pool_{}", if is_corridor { "corridor" } else { "room" }),
            passed: has_pool,
            detail: "leftover shapes can be typed".into(),
        });
    }

    let has_doors = catalog.room_types.iter().filter(|rt| rt.is_corridor).all(|rt| {
        rt.entities_of(EntityKind::Door).next().is_some()
            && rt.entities_of(EntityKind::Hatch).next().is_some()
    });
    results.push(TestResult {
        name: "catalog_corridors_have_doors".into(),
        passed: has_doors,
        detail: "corridor types carry a door and a hatch".into(),
    });

    // Wire endpoints must exist on both prefabs
    let mut bad_wires = Vec::new();
    for (config, parent) in &configs {
        for conn in &config.connections {
            let Some(wire) = &conn.wire else { continue };
            let target = if conn.target == PARENT_TARGET {
                parent.unwrap_or_default()
            } else {
                conn.target.as_str()
            };
            let ok_source = catalog
                .prefab(&config.prefab)
                .is_some_and(|p| p.connection_points.contains(&wire.source));
            let ok_target = catalog
                .prefab(target)
                .is_some_and(|p| p.connection_points.contains(&wire.target));
            if !ok_source || !ok_target {
                bad_wires.push(format!("{}→{}", config.prefab, target));
            }
        }
    }
    results.push(TestResult {
        name: "catalog_wire_points_exist".into(),
        passed: bad_wires.is_empty(),
        detail: if bad_wires.is_empty() {
            "all wire endpoints declared".into()
        } else {
            format!("missing points: {}", bad_wires.join(", "))
        },
    });

    results
}

// ── 2. Seed sweep ───────────────────────────────────────────────────────

#[derive(Default)]
struct SweepTotals {
    rooms: usize,
    corridors: usize,
    entities: usize,
    doors: usize,
    open_doors: usize,
    unreachable: usize,
    props: usize,
    props_inside: usize,
    attempted: usize,
    converged: usize,
    layout_errors: Vec<String>,
    missing_entrance: Vec<u64>,
    issues: BTreeMap<&'static str, usize>,
}

fn count_props(world: &hecs::World, ruin: &Ruin, totals: &mut SweepTotals) {
    for e in &ruin.entities {
        if e.config.kind != EntityKind::Prop
            || world.get::<&ContainedIn>(e.entity).is_ok()
            || world.get::<&Resizable>(e.entity).is_ok()
        {
            continue;
        }
        let Ok(bounds) = world.get::<&Bounds>(e.entity) else {
            continue;
        };
        totals.props += 1;
        if interior_bounds(&ruin.shapes[e.shape]).contains(&bounds) {
            totals.props_inside += 1;
        }
    }
}

fn validate_seed_sweep(catalog: &RuinCatalog, seeds: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Seed Sweep ({} seeds) ---", seeds);
    let mut results = Vec::new();
    let Some(mut site) = new_site(catalog) else {
        results.push(TestResult {
            name: "sweep_site".into(),
            passed: false,
            detail: "default params rejected".into(),
        });
        return results;
    };

    let mut totals = SweepTotals::default();
    for seed in 0..seeds {
        site.generate(&request(false), seed);
        let Some(ruin) = site.ruin.as_ref() else {
            continue;
        };

        let stats = ruin.stats();
        totals.rooms += stats.rooms;
        totals.corridors += stats.corridors;
        totals.entities += stats.entities;
        totals.doors += stats.doors;
        totals.open_doors += stats.open_doors;
        totals.unreachable += stats.unreachable;
        totals.attempted += ruin.placement.attempted;
        totals.converged += ruin.placement.converged;
        for issue in &ruin.diagnostics {
            *totals.issues.entry(issue.kind()).or_default() += 1;
        }
        if ruin.entrance.is_none() {
            totals.missing_entrance.push(seed);
        }

        for err in validate_layout(&ruin.shapes, &ruin.hulls, &ruin.area) {
            if err.severity == Severity::Error {
                totals.layout_errors.push(format!("seed {}: {}", seed, err.message));
            }
        }
        count_props(&site.world, ruin, &mut totals);

        if verbose {
            println!(
                "  seed {:>3}: {} rooms, {} corridors, {} hulls, {} entities, {} issues",
                seed, stats.rooms, stats.corridors, stats.hulls, stats.entities, stats.diagnostics
            );
        }
    }

    results.push(TestResult {
        name: "sweep_layout_valid".into(),
        passed: totals.layout_errors.is_empty(),
        detail: if totals.layout_errors.is_empty() {
            "no hull overlaps, degenerate rects or entrance errors".into()
        } else {
            format!(
                "{} errors, first: {}",
                totals.layout_errors.len(),
                totals.layout_errors[0]
            )
        },
    });

    results.push(TestResult {
        name: "sweep_entrance_chosen".into(),
        passed: totals.missing_entrance.is_empty(),
        detail: format!("{} seeds without entrance", totals.missing_entrance.len()),
    });

    let containment = ratio(totals.props_inside, totals.props);
    results.push(TestResult {
        name: "sweep_prop_containment".into(),
        passed: containment >= CONTAINMENT_TARGET,
        detail: format!(
            "{}/{} props inside interiors ({:.1}%)",
            totals.props_inside,
            totals.props,
            containment * 100.0
        ),
    });

    let convergence = ratio(totals.converged, totals.attempted);
    results.push(TestResult {
        name: "sweep_displacement_convergence".into(),
        passed: convergence >= CONTAINMENT_TARGET,
        detail: format!(
            "{}/{} placements clear ({:.1}%)",
            totals.converged,
            totals.attempted,
            convergence * 100.0
        ),
    });

    results.push(TestResult {
        name: "sweep_doors_placed".into(),
        passed: totals.doors > 0 && totals.doors <= totals.corridors,
        detail: format!(
            "{} doors over {} corridors, {} open",
            totals.doors, totals.corridors, totals.open_doors
        ),
    });

    let issues = totals
        .issues
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    results.push(TestResult {
        name: "sweep_no_catalog_issues".into(),
        passed: !totals.issues.contains_key("catalog"),
        detail: if issues.is_empty() {
            "no diagnostics".into()
        } else {
            issues
        },
    });

    let n = seeds.max(1) as f32;
    println!(
        "  avg: {:.1} rooms, {:.1} corridors, {:.1} entities, {:.2} unreachable shapes",
        totals.rooms as f32 / n,
        totals.corridors as f32 / n,
        totals.entities as f32 / n,
        totals.unreachable as f32 / n
    );

    results
}

fn ratio(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        1.0
    } else {
        part as f32 / whole as f32
    }
}

// ── 3. Mirror ───────────────────────────────────────────────────────────

fn validate_mirror(catalog: &RuinCatalog) -> Vec<TestResult> {
    println!("--- Mirror ---");
    let mut results = Vec::new();
    let (Some(mut plain), Some(mut mirrored)) = (new_site(catalog), new_site(catalog)) else {
        return results;
    };

    let axis2 = mirror_axis2(&AREA);
    let mut mismatches = Vec::new();
    for seed in 0..10 {
        plain.generate(&request(false), seed);
        mirrored.generate(&request(true), seed);
        let (Some(a), Some(b)) = (plain.ruin.as_ref(), mirrored.ruin.as_ref()) else {
            continue;
        };
        let hulls_match = a.hulls.len() == b.hulls.len()
            && a
                .hulls
                .iter()
                .zip(&b.hulls)
                .all(|(x, y)| x.rect.mirrored_x(axis2) == y.rect);
        let entities_match = a.entities.len() == b.entities.len()
            && a.entities.iter().zip(&b.entities).all(|(x, y)| {
                let bx = plain.world.get::<&Bounds>(x.entity).map(|b| *b);
                let by = mirrored.world.get::<&Bounds>(y.entity).map(|b| *b);
                matches!((bx, by), (Ok(bx), Ok(by)) if bx.mirrored_x(axis2) == by)
            });
        if !hulls_match || !entities_match || a.entrance != b.entrance {
            mismatches.push(seed);
        }
    }
    results.push(TestResult {
        name: "mirror_reflects_layout".into(),
        passed: mismatches.is_empty(),
        detail: if mismatches.is_empty() {
            "10 seeds mirror exactly".into()
        } else {
            format!("mismatched seeds: {:?}", mismatches)
        },
    });
    results
}

// ── 4. Determinism & persistence ────────────────────────────────────────

fn snapshot_json(site: &RuinSite) -> Option<String> {
    let ruin = site.ruin.as_ref()?;
    serde_json::to_string(&to_save_data(&site.world, ruin, site.seed)).ok()
}

fn validate_persistence(catalog: &RuinCatalog) -> Vec<TestResult> {
    println!("--- Determinism & Persistence ---");
    let mut results = Vec::new();
    let (Some(mut a), Some(mut b), Some(mut restored)) =
        (new_site(catalog), new_site(catalog), new_site(catalog))
    else {
        return results;
    };

    a.generate(&request(false), 1234);
    b.generate(&request(false), 1234);
    let (sa, sb) = (snapshot_json(&a), snapshot_json(&b));
    results.push(TestResult {
        name: "determinism_same_seed".into(),
        passed: sa.is_some() && sa == sb,
        detail: "two runs with seed 1234 produce identical snapshots".into(),
    });

    let mut buffer = Vec::new();
    let roundtrip = a
        .save(&mut buffer)
        .and_then(|_| restored.load(&buffer[..]));
    let detail = match &roundtrip {
        Ok(()) => format!("{} bytes", buffer.len()),
        Err(e) => format!("save/load failed: {}", e),
    };
    results.push(TestResult {
        name: "persistence_roundtrip".into(),
        passed: roundtrip.is_ok() && snapshot_json(&restored) == sa,
        detail,
    });

    results
}
