//! Multi-layer pattern capture
//!
//! Ties decoding and masking together: every polygon of a mask layer cuts
//! a snapshot out of a set of input layers, and the snapshots are handed
//! to a `PatternStore`.
//!
//! # Submodules
//! - `pipeline` - Layer loading and per-mask-polygon capture
//! - `store` - Storage collaborator trait and JSON Lines sink

mod pipeline;
mod store;

pub use pipeline::{
    CaptureRequest,
    LoadedLayers,
    load_layers,
    capture_patterns,
    pattern_id,
    parse_layer_list,
};

pub use store::{
    PatternStore,
    JsonLinesStore,
    StoreSummary,
    store_patterns,
};

use crate::decode::LayoutFileReader;
use std::path::Path;
use tracing::info;

/// Decode, capture and store every pattern of one layout file
pub fn run_capture<P: AsRef<Path>>(
    path: P,
    request: &CaptureRequest,
    store: &mut dyn PatternStore,
) -> anyhow::Result<StoreSummary> {
    let reader = LayoutFileReader::new(path.as_ref())?;
    let layers = load_layers(&reader, request)?;
    let patterns = capture_patterns(&layers, request);

    let source_file = reader.path().display().to_string();
    let summary = store_patterns(&patterns, store, &source_file);
    info!(
        successful = summary.successful,
        failed = summary.failed,
        "capture finished for {}",
        source_file
    );
    Ok(summary)
}
