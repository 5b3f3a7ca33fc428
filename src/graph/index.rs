//! Bounding rectangle helpers for the pair sweep pre-filter
//!
//! All tests are closed: rectangles that only share an edge or a corner
//! overlap, so touching polygons are never filtered out.

use geo::{coord, Rect};

/// Smallest rectangle covering both `a` and `b`
pub fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// Check if two rectangles share at least one point
pub fn overlaps(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}

/// Common part of two rectangles, `None` when they are disjoint
pub fn overlap_window(a: &Rect<f64>, b: &Rect<f64>) -> Option<Rect<f64>> {
    if !overlaps(a, b) {
        return None;
    }
    Some(Rect::new(
        coord! { x: a.min().x.max(b.min().x), y: a.min().y.max(b.min().y) },
        coord! { x: a.max().x.min(b.max().x), y: a.max().y.min(b.max().y) },
    ))
}
