//! Layer-vs-mask intersection

use super::clip::MaskClipper;
use crate::geometry::{Layer, Polygon};
use tracing::debug;

/// Intersect every polygon of `target` with `mask`.
///
/// The result carries the target's layer and datatype and holds one polygon
/// per target polygon with a non-degenerate overlap, in target order. An
/// empty result means no overlap; this never fails.
pub fn intersect_layer_with_mask(mask: &Polygon, target: &Layer) -> Layer {
    let mut result = Layer::new(target.number, target.datatype);
    if mask.is_empty() || !mask.is_valid() {
        debug!(layer = %target.key(), "mask polygon is invalid, nothing to intersect");
        return result;
    }

    let clipper = MaskClipper::new(mask);
    let mut skipped = 0usize;
    for polygon in target.polygons.iter().filter(|p| p.is_valid()) {
        match clipper.clip(polygon) {
            Some(clipped) => result.polygons.push(clipped),
            None => skipped += 1,
        }
    }

    debug!(
        layer = %target.key(),
        candidates = target.polygon_count(),
        kept = result.polygon_count(),
        skipped,
        "mask intersection finished"
    );
    result
}
