//! Validation for generated ruin layouts.
//!
//! Pure functions that take shapes/hulls and return validation errors.
//! Used by the harness and by integration tests.

use crate::geometry::Rect;
use crate::hull::Hull;
use crate::shape::RuinShape;

/// A layout validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

// ── A. Per-rect geometry ────────────────────────────────────────────────

/// Check that no shape or hull has zero or negative dimensions.
pub fn check_dimensions(shapes: &[RuinShape], hulls: &[Hull]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, s) in shapes.iter().enumerate() {
        if s.rect.is_degenerate() {
            errors.push(ValidationError {
                category: "geometry",
                severity: Severity::Error,
                message: format!("Shape #{} has non-positive dimensions: {:?}", i, s.rect),
            });
        }
    }
    for (i, h) in hulls.iter().enumerate() {
        if h.rect.is_degenerate() {
            errors.push(ValidationError {
                category: "geometry",
                severity: Severity::Error,
                message: format!("Hull #{} has non-positive dimensions: {:?}", i, h.rect),
            });
        }
    }
    errors
}

/// Check hulls stay inside the ruin area.
pub fn check_hulls_within_area(hulls: &[Hull], area: &Rect) -> Vec<ValidationError> {
    hulls
        .iter()
        .enumerate()
        .filter(|(_, h)| !area.contains_rect(&h.rect))
        .map(|(i, h)| ValidationError {
            category: "geometry",
            severity: Severity::Error,
            message: format!("Hull #{} {:?} extends outside area {:?}", i, h.rect, area),
        })
        .collect()
}

// ── B. Pairwise ─────────────────────────────────────────────────────────

/// No two hulls may overlap; touching edges are fine.
pub fn check_hull_overlaps(hulls: &[Hull]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for i in 0..hulls.len() {
        for j in (i + 1)..hulls.len() {
            if let Some(overlap) = hulls[i].rect.intersection(&hulls[j].rect) {
                errors.push(ValidationError {
                    category: "hull_overlap",
                    severity: Severity::Error,
                    message: format!(
                        "Hulls #{} and #{} overlap by {}×{}",
                        i, j, overlap.width, overlap.height
                    ),
                });
            }
        }
    }
    errors
}

// ── C. Connectivity ─────────────────────────────────────────────────────

/// Every shape should have been reached by the distance labeller.
pub fn check_connectivity(shapes: &[RuinShape]) -> Vec<ValidationError> {
    let unreached: Vec<usize> = shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| s.distance.is_none())
        .map(|(i, _)| i)
        .collect();
    if unreached.is_empty() {
        return Vec::new();
    }
    vec![ValidationError {
        category: "connectivity",
        severity: Severity::Warning,
        message: format!(
            "{} of {} shapes unreachable (e.g. shape #{})",
            unreached.len(),
            shapes.len(),
            unreached[0]
        ),
    }]
}

/// Exactly one shape must sit at distance zero.
pub fn check_single_entrance(shapes: &[RuinShape]) -> Vec<ValidationError> {
    let entrances = shapes.iter().filter(|s| s.distance == Some(0)).count();
    if entrances == 1 {
        return Vec::new();
    }
    vec![ValidationError {
        category: "connectivity",
        severity: Severity::Error,
        message: format!("Expected exactly one entrance, found {}", entrances),
    }]
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all layout validations and return combined results.
pub fn validate_layout(shapes: &[RuinShape], hulls: &[Hull], area: &Rect) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_dimensions(shapes, hulls));
    all.extend(check_hulls_within_area(hulls, area));
    all.extend(check_hull_overlaps(hulls));
    all.extend(check_single_entrance(shapes));
    all.extend(check_connectivity(shapes));
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled_room(rect: Rect, distance: Option<u32>) -> RuinShape {
        let mut s = RuinShape::room(rect, 0);
        s.distance = distance;
        s
    }

    #[test]
    fn test_overlapping_hulls_flagged() {
        let hulls = vec![
            Hull::new(Rect::new(0, 0, 10, 10), 0),
            Hull::new(Rect::new(5, 5, 10, 10), 1),
        ];
        let errs = check_hull_overlaps(&hulls);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("5×5"));
    }

    #[test]
    fn test_touching_hulls_ok() {
        let hulls = vec![
            Hull::new(Rect::new(0, 0, 10, 10), 0),
            Hull::new(Rect::new(10, 0, 10, 10), 1),
        ];
        assert!(check_hull_overlaps(&hulls).is_empty());
    }

    #[test]
    fn test_unreachable_shape_warns() {
        let shapes = vec![
            labelled_room(Rect::new(0, 0, 10, 10), Some(0)),
            labelled_room(Rect::new(50, 0, 10, 10), None),
        ];
        let errs = check_connectivity(&shapes);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].severity, Severity::Warning);
    }

    #[test]
    fn test_hull_outside_area() {
        let hulls = vec![Hull::new(Rect::new(90, 0, 20, 10), 0)];
        assert_eq!(check_hulls_within_area(&hulls, &Rect::new(0, 0, 100, 100)).len(), 1);
    }

    #[test]
    fn test_validate_clean_layout() {
        let shapes = vec![labelled_room(Rect::new(0, 0, 10, 10), Some(0))];
        let hulls = vec![Hull::new(Rect::new(0, 0, 10, 10), 0)];
        let errs = validate_layout(&shapes, &hulls, &Rect::new(0, 0, 100, 100));
        assert!(errs.is_empty(), "Expected no errors, got: {:?}", errs);
    }
}
