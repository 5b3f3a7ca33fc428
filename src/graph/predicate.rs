//! Exact polygon intersection predicates
//!
//! The builder only decides which polygon pairs to compare; whether a pair
//! counts as intersecting is up to an [`IntersectionPredicate`].

use crate::core::{GeometryError, TouchSemantics};
use crate::group::GroupMember;
use geo::coordinate_position::CoordPos;
use geo::dimensions::Dimensions;
use geo::{Intersects, Relate};

/// Decides whether two grouped polygons are adjacent
///
/// Implementations must return an error rather than `false` when they
/// cannot evaluate a pair.
pub trait IntersectionPredicate: Send + Sync {
    /// Test a single polygon pair
    fn intersects(&self, left: &GroupMember, right: &GroupMember) -> Result<bool, GeometryError>;
}

/// Standard intersects: any shared point counts, boundary contact included
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonIntersects;

impl IntersectionPredicate for PolygonIntersects {
    fn intersects(&self, left: &GroupMember, right: &GroupMember) -> Result<bool, GeometryError> {
        Ok(left.polygon.intersects(&right.polygon))
    }
}

/// Interiors must overlap; polygons that only touch are not adjacent
#[derive(Debug, Clone, Copy, Default)]
pub struct InteriorOverlap;

impl IntersectionPredicate for InteriorOverlap {
    fn intersects(&self, left: &GroupMember, right: &GroupMember) -> Result<bool, GeometryError> {
        let matrix = left.polygon.relate(&right.polygon);
        Ok(matrix.get(CoordPos::Inside, CoordPos::Inside) != Dimensions::Empty)
    }
}

/// Predicate for the configured touch semantics
pub fn for_semantics(touch: TouchSemantics) -> Box<dyn IntersectionPredicate> {
    match touch {
        TouchSemantics::Intersects => Box::new(PolygonIntersects),
        TouchSemantics::Interior => Box::new(InteriorOverlap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, BoundingRect, Polygon};

    fn member(id: u64, polygon: Polygon<f64>) -> GroupMember {
        let bounds = polygon.bounding_rect().unwrap();
        GroupMember { feature_id: id, polygon, bounds }
    }

    fn square(x: f64, y: f64) -> GroupMember {
        member(0, polygon![(x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0)])
    }

    #[test]
    fn test_overlap_counts_for_both() {
        let a = square(0.0, 0.0);
        let b = square(0.5, 0.5);
        assert!(PolygonIntersects.intersects(&a, &b).unwrap());
        assert!(InteriorOverlap.intersects(&a, &b).unwrap());
    }

    #[test]
    fn test_shared_edge() {
        let a = square(0.0, 0.0);
        let b = square(1.0, 0.0);
        assert!(PolygonIntersects.intersects(&a, &b).unwrap());
        assert!(!InteriorOverlap.intersects(&a, &b).unwrap());
    }

    #[test]
    fn test_shared_corner() {
        let a = square(0.0, 0.0);
        let b = square(1.0, 1.0);
        assert!(PolygonIntersects.intersects(&a, &b).unwrap());
        assert!(!InteriorOverlap.intersects(&a, &b).unwrap());
    }

    #[test]
    fn test_containment() {
        let outer = member(0, polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)]);
        let inner = square(4.0, 4.0);
        assert!(PolygonIntersects.intersects(&outer, &inner).unwrap());
        assert!(InteriorOverlap.intersects(&inner, &outer).unwrap());
    }

    #[test]
    fn test_disjoint() {
        let a = square(0.0, 0.0);
        let b = square(3.0, 0.0);
        assert!(!PolygonIntersects.intersects(&a, &b).unwrap());
        assert!(!for_semantics(TouchSemantics::Interior).intersects(&a, &b).unwrap());
    }
}
