//! Layout pattern capture
//!
//! Decodes polygons from GDSII and OASIS layout streams, clips them against
//! the polygons of a mask layer and collects the results as multi-layer
//! patterns.
//!
//! # Modules
//! - `geometry` - Points, polygons, layers and bounding boxes
//! - `decode` - GDSII/OASIS stream decoding
//! - `boolean` - Polygon intersection and mask application
//! - `capture` - Mask-driven pattern capture and storage hand-off
//!
//! # Example
//! ```ignore
//! use pattern_capture::{decode_layer, intersect_layer_with_mask};
//!
//! let mask = decode_layer("chip.gds", 1, 0)?;
//! let metal = decode_layer("chip.gds", 2, 0)?;
//! let clipped = intersect_layer_with_mask(&mask.polygons[0], &metal);
//! println!("{} polygons under the mask", clipped.polygon_count());
//! ```

pub mod geometry;
pub mod decode;
pub mod boolean;
pub mod capture;

pub use geometry::{Layer, LayerKey, MultiLayerPattern, Point, Polygon};
pub use decode::{decode_layer, list_layer_datatype_pairs, DecodeError, LayoutFileReader, LayoutFormat};
pub use boolean::{intersect_layer_with_mask, intersect_polygons};
pub use capture::{run_capture, CaptureRequest, JsonLinesStore, PatternStore, StoreSummary};
