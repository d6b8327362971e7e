//! Geometry module for extracted layout data
//!
//! This module provides the value types shared by the layout decoders and the
//! polygon boolean engine: points, polygons, layers and captured patterns.
//!
//! # Submodules
//! - `types` - Core geometric primitives (Point, Polygon, Layer, LayerKey)
//! - `bounds` - Axis-aligned bounding boxes and R-tree entries
//! - `pattern` - Multi-layer pattern snapshots

mod types;
mod bounds;
mod pattern;

pub use types::{
    Point,
    Polygon,
    Layer,
    LayerKey,
    POINT_EPSILON,
    MIN_POLYGON_AREA,
};

pub use bounds::{
    BoundingBox,
    IndexedPolygon,
};

pub use pattern::MultiLayerPattern;
