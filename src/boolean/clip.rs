//! Polygon/polygon intersection
//!
//! Clipping is delegated to `geo`'s boolean operations. Of the rings the
//! clipper produces, only the first non-degenerate exterior ring is kept.

use crate::geometry::{BoundingBox, Point, Polygon};
use geo::{BooleanOps, Coord, LineString};

/// Clipped rings at or below this area are discarded
pub const MIN_INTERSECTION_AREA: f64 = 1e-6;

/// A mask polygon prepared for repeated clipping
pub struct MaskClipper {
    bounds: BoundingBox,
    shape: geo::Polygon<f64>,
}

impl MaskClipper {
    pub fn new(mask: &Polygon) -> Self {
        Self {
            bounds: BoundingBox::of_polygon(mask),
            shape: to_geo(mask),
        }
    }

    /// Overlap region of the mask and `target`, if it is non-degenerate
    pub fn clip(&self, target: &Polygon) -> Option<Polygon> {
        if !self.bounds.overlaps(&BoundingBox::of_polygon(target)) {
            return None;
        }

        let clipped = self.shape.intersection(&to_geo(target));
        clipped.0.iter().find_map(|part| ring_to_polygon(part.exterior()))
    }
}

fn to_geo(polygon: &Polygon) -> geo::Polygon<f64> {
    let ring: Vec<Coord<f64>> = polygon
        .points()
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect();
    // geo closes the ring itself
    geo::Polygon::new(LineString::from(ring), vec![])
}

/// Convert a clipper ring back, dropping the closing point and any
/// repeated vertices. Rings that end up degenerate yield `None`.
fn ring_to_polygon(ring: &LineString<f64>) -> Option<Polygon> {
    let mut points: Vec<Point> = Vec::with_capacity(ring.0.len());
    for coord in ring.coords() {
        let point = Point::new(coord.x, coord.y);
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return None;
    }

    let polygon = Polygon::new(points);
    (polygon.area() > MIN_INTERSECTION_AREA).then_some(polygon)
}

/// Intersection of two polygons, `None` if either is invalid or the
/// overlap is empty or degenerate
pub fn intersect_polygons(a: &Polygon, b: &Polygon) -> Option<Polygon> {
    if !a.is_valid() || !b.is_valid() {
        return None;
    }
    MaskClipper::new(a).clip(b)
}
