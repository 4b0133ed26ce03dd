//! Room-relative shape lookup used by child placement and wiring.

use crate::catalog::RelativePlacement;
use ruingen_logic::distance::distance_order;
use ruingen_logic::{RuinShape, ShapeId};

fn order_key(shapes: &[RuinShape], id: ShapeId) -> (u32, ShapeId) {
    (shapes[id].distance.unwrap_or(u32::MAX), id)
}

/// Resolve `rule` from shape `from`. "Next" and "previous" walk the
/// distance order of the target class, starting from `from`'s position in
/// that order even when `from` is of the other class.
pub fn resolve_relative(
    shapes: &[RuinShape],
    from: ShapeId,
    rule: RelativePlacement,
) -> Option<ShapeId> {
    use RelativePlacement::*;

    if from >= shapes.len() {
        return None;
    }
    let corridors = matches!(
        rule,
        NextCorridor | PreviousCorridor | FirstCorridor | LastCorridor
    );
    let order = distance_order(shapes, corridors);
    let key = order_key(shapes, from);

    match rule {
        SameRoom => Some(from),
        FirstRoom | FirstCorridor => order.first().copied(),
        LastRoom | LastCorridor => order.last().copied(),
        NextRoom | NextCorridor => order
            .iter()
            .copied()
            .find(|&id| order_key(shapes, id) > key),
        PreviousRoom | PreviousCorridor => order
            .iter()
            .rev()
            .copied()
            .find(|&id| order_key(shapes, id) < key),
    }
}
