//! File-level entry points for layout decoding
//!
//! Every call opens its own handle and scans from the start of the file, so
//! independent calls may run concurrently on separate threads.

use super::error::{DecodeError, DecodeResult};
use super::format::LayoutFormat;
use super::{gdsii, oasis};
use crate::geometry::{Layer, LayerKey};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A layout file whose format has been detected from its extension
#[derive(Debug, Clone)]
pub struct LayoutFileReader {
    path: PathBuf,
    format: LayoutFormat,
}

impl LayoutFileReader {
    /// Fails with `UnsupportedFormat` without touching the file
    pub fn new<P: AsRef<Path>>(path: P) -> DecodeResult<Self> {
        let path = path.as_ref().to_path_buf();
        let format = LayoutFormat::from_path(&path)?;
        info!(path = %path.display(), %format, "detected layout format");
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> LayoutFormat {
        self.format
    }

    fn open(&self) -> DecodeResult<BufReader<File>> {
        let file = File::open(&self.path).map_err(|source| DecodeError::SourceUnavailable {
            path: self.path.clone(),
            source,
        })?;
        Ok(BufReader::new(file))
    }

    /// Decode every polygon on `(layer, datatype)`
    pub fn decode_layer(&self, layer: u32, datatype: u32) -> DecodeResult<Layer> {
        let key = LayerKey::new(layer, datatype);
        let source = self.open()?;
        let decoded = match self.format {
            LayoutFormat::Gdsii => gdsii::decode_layer(source, key)?,
            LayoutFormat::Oasis => oasis::decode_layer(source, key)?,
        };

        info!(
            layer = %key,
            polygons = decoded.polygon_count(),
            total_area = decoded.total_area(),
            "loaded layer from {}",
            self.path.display()
        );
        if decoded.is_empty() {
            warn!(layer = %key, "no valid polygons found");
        }
        Ok(decoded)
    }

    /// Sorted, deduplicated (layer, datatype) pairs present in the file
    pub fn list_layer_datatype_pairs(&self) -> DecodeResult<Vec<LayerKey>> {
        let source = self.open()?;
        match self.format {
            LayoutFormat::Gdsii => gdsii::list_layers(source),
            LayoutFormat::Oasis => oasis::list_layers(source),
        }
    }
}

/// Decode `(layer, datatype)` from the layout file at `path`
pub fn decode_layer<P: AsRef<Path>>(path: P, layer: u32, datatype: u32) -> DecodeResult<Layer> {
    LayoutFileReader::new(path)?.decode_layer(layer, datatype)
}

/// List the (layer, datatype) pairs of the layout file at `path`
pub fn list_layer_datatype_pairs<P: AsRef<Path>>(path: P) -> DecodeResult<Vec<LayerKey>> {
    LayoutFileReader::new(path)?.list_layer_datatype_pairs()
}
