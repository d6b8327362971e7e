//! Pattern capture: mask polygons against input layers
//!
//! Loads the mask and input layers of a layout file, then builds one
//! `MultiLayerPattern` per valid mask polygon. Input layers are indexed in
//! an R-tree so each mask polygon only clips the polygons near it.

use crate::boolean::intersect_layer_with_mask;
use crate::decode::LayoutFileReader;
use crate::geometry::{BoundingBox, IndexedPolygon, Layer, LayerKey, MultiLayerPattern, Polygon};
use anyhow::Context;
use rayon::prelude::*;
use rstar::RTree;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Mask layer plus the input layers to capture, in output order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub mask: LayerKey,
    pub inputs: Vec<LayerKey>,
}

/// Parse a comma separated list of `layer:datatype` pairs.
///
/// Malformed entries are warned about and skipped; a list with no usable
/// entry is an error.
pub fn parse_layer_list(list: &str) -> anyhow::Result<Vec<LayerKey>> {
    let mut keys = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.parse::<LayerKey>() {
            Ok(key) => keys.push(key),
            Err(err) => warn!("skipping layer '{}': {:#}", entry, err),
        }
    }
    anyhow::ensure!(!keys.is_empty(), "no valid layer:datatype pairs in '{}'", list);
    Ok(keys)
}

/// Layers decoded for one capture run
#[derive(Debug, Clone)]
pub struct LoadedLayers {
    pub mask: Layer,
    pub inputs: Vec<Layer>,
}

/// Decode the mask layer and every input layer.
///
/// An empty mask layer is an error; empty input layers are kept so every
/// pattern still reports one layer per requested input.
pub fn load_layers(reader: &LayoutFileReader, request: &CaptureRequest) -> anyhow::Result<LoadedLayers> {
    let available = reader
        .list_layer_datatype_pairs()
        .with_context(|| format!("failed to list layers of {}", reader.path().display()))?;
    let listing: Vec<String> = available.iter().map(ToString::to_string).collect();
    info!(available = %listing.join(" "), "layers in {}", reader.path().display());

    let mask = reader
        .decode_layer(request.mask.layer, request.mask.datatype)
        .with_context(|| format!("failed to load mask layer {}", request.mask))?;
    anyhow::ensure!(!mask.is_empty(), "no polygons in mask layer {}", request.mask);

    let mut inputs = Vec::with_capacity(request.inputs.len());
    for key in &request.inputs {
        if !available.contains(key) {
            warn!(layer = %key, "input layer not present in layout");
        }
        let layer = reader
            .decode_layer(key.layer, key.datatype)
            .with_context(|| format!("failed to load input layer {}", key))?;
        inputs.push(layer);
    }

    Ok(LoadedLayers { mask, inputs })
}

/// R-tree over the polygons of one layer
struct LayerIndex<'a> {
    layer: &'a Layer,
    tree: RTree<IndexedPolygon>,
}

impl<'a> LayerIndex<'a> {
    fn new(layer: &'a Layer) -> Self {
        let entries = layer
            .polygons
            .iter()
            .enumerate()
            .map(|(index, polygon)| IndexedPolygon::new(index, polygon))
            .collect();
        Self { layer, tree: RTree::bulk_load(entries) }
    }

    /// Polygons whose bounds touch the mask bounds, in layer order
    fn candidates(&self, bounds: &BoundingBox) -> Layer {
        let envelope = bounds.envelope();
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.index)
            .collect();
        hits.sort_unstable();

        let mut subset = Layer::new(self.layer.number, self.layer.datatype);
        subset.polygons = hits.into_iter().map(|i| self.layer.polygons[i].clone()).collect();
        subset
    }
}

/// `pattern_{mask}_{inputs...}_{mask area}_{mask index}`
pub fn pattern_id(request: &CaptureRequest, mask_polygon: &Polygon, mask_index: usize) -> String {
    let mut id = format!("pattern_{}_{}", request.mask.layer, request.mask.datatype);
    for key in &request.inputs {
        id.push_str(&format!("_{}_{}", key.layer, key.datatype));
    }
    id.push_str(&format!("_{:.2}_{}", mask_polygon.area(), mask_index));
    id
}

/// Build one pattern per valid mask polygon, in mask order
pub fn capture_patterns(layers: &LoadedLayers, request: &CaptureRequest) -> Vec<MultiLayerPattern> {
    let start = Instant::now();
    let indexes: Vec<LayerIndex> = layers.inputs.iter().map(LayerIndex::new).collect();

    let patterns: Vec<MultiLayerPattern> = layers
        .mask
        .polygons
        .par_iter()
        .enumerate()
        .filter_map(|(mask_index, mask_polygon)| {
            if !mask_polygon.is_valid() {
                debug!(mask_index, "skipping invalid mask polygon");
                return None;
            }

            let bounds = BoundingBox::of_polygon(mask_polygon);
            let mut pattern = MultiLayerPattern::new(
                pattern_id(request, mask_polygon, mask_index),
                request.mask,
                mask_polygon.clone(),
            );
            for index in &indexes {
                let result = intersect_layer_with_mask(mask_polygon, &index.candidates(&bounds));
                if result.is_empty() {
                    debug!(mask_index, layer = %result.key(), "no overlap");
                }
                pattern.input_layers.push(result);
            }
            Some(pattern)
        })
        .collect();

    info!(
        patterns = patterns.len(),
        mask_polygons = layers.mask.polygon_count(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "captured patterns"
    );
    patterns
}
