//! Bounding boxes and spatial index entries
//!
//! The boolean engine uses `BoundingBox` as a cheap pre-filter before
//! clipping; pattern capture indexes target polygons in an R-tree.

use super::types::{Point, Polygon};
use rstar::{RTreeObject, AABB};
use serde::Serialize;

/// Axis-aligned bounding box of a point set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// An empty point list yields the all-zero box
    pub fn of_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return BoundingBox::default();
        };

        points.iter().fold(
            BoundingBox { min_x: first.x, max_x: first.x, min_y: first.y, max_y: first.y },
            |b, p| BoundingBox {
                min_x: b.min_x.min(p.x),
                max_x: b.max_x.max(p.x),
                min_y: b.min_y.min(p.y),
                max_y: b.max_y.max(p.y),
            },
        )
    }

    pub fn of_polygon(polygon: &Polygon) -> Self {
        Self::of_points(polygon.points())
    }

    /// Strict test: boxes are disjoint only if one ends before the other
    /// starts on some axis. Touching boxes overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !(self.max_x < other.min_x
            || other.max_x < self.min_x
            || self.max_y < other.min_y
            || other.max_y < self.min_y)
    }

    pub fn envelope(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

/// Polygon position within its layer, wrapped for R-tree indexing
#[derive(Clone, Debug)]
pub struct IndexedPolygon {
    pub index: usize,
    pub bounds: AABB<[f64; 2]>,
}

impl IndexedPolygon {
    pub fn new(index: usize, polygon: &Polygon) -> Self {
        Self { index, bounds: BoundingBox::of_polygon(polygon).envelope() }
    }
}

impl RTreeObject for IndexedPolygon {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_of_points() {
        let points = vec![Point::new(1.0, -2.0), Point::new(-3.0, 4.0), Point::new(0.5, 0.5)];
        let bbox = BoundingBox::of_points(&points);
        assert_eq!(bbox, BoundingBox { min_x: -3.0, max_x: 1.0, min_y: -2.0, max_y: 4.0 });
    }

    #[test]
    fn test_empty_points_give_zero_box() {
        assert_eq!(BoundingBox::of_points(&[]), BoundingBox::default());
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = BoundingBox { min_x: 0.0, max_x: 1.0, min_y: 0.0, max_y: 1.0 };
        let touching = BoundingBox { min_x: 1.0, max_x: 2.0, min_y: 0.0, max_y: 1.0 };
        let apart = BoundingBox { min_x: 1.5, max_x: 2.0, min_y: 0.0, max_y: 1.0 };
        let above = BoundingBox { min_x: 0.0, max_x: 1.0, min_y: 1.1, max_y: 2.0 };
        assert!(a.overlaps(&touching));
        assert!(!a.overlaps(&apart));
        assert!(!apart.overlaps(&a));
        assert!(!a.overlaps(&above));
    }
}
