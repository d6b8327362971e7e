//! Multi-layer pattern snapshot

use super::types::{Layer, LayerKey, Polygon};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One mask polygon paired with the masked geometry of each input layer
#[derive(Debug, Clone, Serialize)]
pub struct MultiLayerPattern {
    pub pattern_id: String,
    pub mask_layer: LayerKey,
    pub mask_polygon: Polygon,
    /// One result layer per requested input layer, in request order
    pub input_layers: Vec<Layer>,
    pub created_at: DateTime<Utc>,
}

impl MultiLayerPattern {
    pub fn new(pattern_id: String, mask_layer: LayerKey, mask_polygon: Polygon) -> Self {
        Self {
            pattern_id,
            mask_layer,
            mask_polygon,
            input_layers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// True if at least one input layer kept geometry after masking
    pub fn has_geometry(&self) -> bool {
        self.input_layers.iter().any(|layer| !layer.is_empty())
    }
}
