//! Layout decoding for GDSII and OASIS streams
//!
//! Turns a layout file into the polygons of one (layer, datatype) pair, or
//! lists the pairs present in the file.
//!
//! # Submodules
//! - `error` - Decode error taxonomy
//! - `primitives` - Big-endian integers, packed reals, strings and varints
//! - `format` - Format detection from the file extension
//! - `gdsii` - GDSII record state machine
//! - `oasis` - OASIS record state machine
//! - `reader` - File-level entry points

mod error;
mod primitives;
mod format;
pub mod gdsii;
pub mod oasis;
mod reader;

pub use error::{DecodeError, DecodeResult};
pub use primitives::RecordReader;
pub use format::LayoutFormat;
pub use reader::{
    LayoutFileReader,
    decode_layer,
    list_layer_datatype_pairs,
};
