//! Polygon boolean engine
//!
//! Computes the overlap of a mask polygon with the polygons of a layer.
//!
//! # Submodules
//! - `clip` - Polygon/polygon clipping and degenerate ring filtering
//! - `mask` - Layer-vs-mask application

mod clip;
mod mask;

pub use clip::{
    MaskClipper,
    intersect_polygons,
    MIN_INTERSECTION_AREA,
};

pub use mask::intersect_layer_with_mask;
