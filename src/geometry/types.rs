//! Core geometry types for layout data
//!
//! Coordinates are stored in user units (database units multiplied by the
//! file's unit scale) as `f64`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-axis tolerance used for point equality
pub const POINT_EPSILON: f64 = 1e-6;

/// Polygons at or below this area are degenerate
pub const MIN_POLYGON_AREA: f64 = 1e-9;

/// A 2D point
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when either coordinate is farther than `POINT_EPSILON` from zero.
    ///
    /// Only the all-zero point counts as an artifact: a vertex on an axis,
    /// such as `(10, 0)`, is significant. Older capture tools required both
    /// coordinates to be non-zero and so dropped shapes touching an axis.
    pub fn is_significant(&self) -> bool {
        self.x.abs() > POINT_EPSILON || self.y.abs() > POINT_EPSILON
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < POINT_EPSILON && (self.y - other.y).abs() < POINT_EPSILON
    }
}

/// A simple closed ring of points (closing point not repeated)
///
/// Area and perimeter are derived from the points and recomputed whenever
/// the points change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Polygon {
    points: Vec<Point>,
    area: f64,
    perimeter: f64,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        let mut polygon = Polygon::default();
        polygon.set_points(points);
        polygon
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Replace the ring and recompute the derived fields
    pub fn set_points(&mut self, points: Vec<Point>) {
        self.points = points;
        self.area = shoelace_area(&self.points);
        self.perimeter = ring_perimeter(&self.points);
    }

    /// Drop a trailing point that repeats the first one.
    /// Returns true if a point was removed.
    pub fn strip_closing_point(&mut self) -> bool {
        let closed = self.points.len() > 1 && self.points.first() == self.points.last();
        if closed {
            let mut points = std::mem::take(&mut self.points);
            points.pop();
            self.set_points(points);
        }
        closed
    }

    pub fn has_significant_point(&self) -> bool {
        self.points.iter().any(Point::is_significant)
    }

    pub fn is_valid(&self) -> bool {
        if self.points.len() < 3 || !self.has_significant_point() {
            return false;
        }

        let n = self.points.len();
        let has_adjacent_duplicate = (0..n).any(|i| self.points[i] == self.points[(i + 1) % n]);
        if has_adjacent_duplicate {
            return false;
        }

        self.area > MIN_POLYGON_AREA
    }
}

/// Absolute shoelace area of a ring
/// Shoelace sum taken relative to the first point; absolute products lose
/// all precision once coordinates reach ~1e8.
fn shoelace_area(points: &[Point]) -> f64 {
    let Some(origin) = points.first() else {
        return 0.0;
    };
    let n = points.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let (xi, yi) = (points[i].x - origin.x, points[i].y - origin.y);
        let (xj, yj) = (points[j].x - origin.x, points[j].y - origin.y);
        twice_area += xi * yj - xj * yi;
    }
    twice_area.abs() / 2.0
}

fn ring_perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n).map(|i| points[i].distance_to(&points[(i + 1) % n])).sum()
}

/// A (layer, datatype) pair, ordered by layer then datatype
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerKey {
    pub layer: u32,
    pub datatype: u32,
}

impl LayerKey {
    pub fn new(layer: u32, datatype: u32) -> Self {
        Self { layer, datatype }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.layer, self.datatype)
    }
}

impl FromStr for LayerKey {
    type Err = anyhow::Error;

    /// Parse `"layer:datatype"`, surrounding whitespace allowed
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let trimmed = s.trim();
        let (layer, datatype) = trimmed
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("expected 'layer:datatype', got '{}'", trimmed))?;
        anyhow::ensure!(
            !layer.trim().is_empty() && !datatype.trim().is_empty(),
            "empty layer or datatype in '{}'",
            trimmed
        );
        let layer = layer.trim().parse::<u32>()
            .map_err(|e| anyhow::anyhow!("invalid layer number in '{}': {}", trimmed, e))?;
        let datatype = datatype.trim().parse::<u32>()
            .map_err(|e| anyhow::anyhow!("invalid datatype in '{}': {}", trimmed, e))?;
        Ok(LayerKey { layer, datatype })
    }
}

/// A layer number, a datatype number and the polygons found on that pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub number: u32,
    pub datatype: u32,
    pub polygons: Vec<Polygon>,
}

impl Layer {
    pub fn new(number: u32, datatype: u32) -> Self {
        Self { number, datatype, polygons: Vec::new() }
    }

    pub fn empty_for(key: LayerKey) -> Self {
        Self::new(key.layer, key.datatype)
    }

    pub fn key(&self) -> LayerKey {
        LayerKey::new(self.number, self.datatype)
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn total_area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}
