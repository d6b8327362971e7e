//! Hand-off of captured patterns to a storage collaborator

use crate::geometry::MultiLayerPattern;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{error, info};

/// Accepts captured patterns; implemented by whatever persists them
pub trait PatternStore {
    fn store(&mut self, pattern: &MultiLayerPattern, source_file: &str) -> anyhow::Result<()>;
}

/// Outcome of handing a batch of patterns to a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub successful: usize,
    pub failed: usize,
}

impl StoreSummary {
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }
}

/// Store every pattern that kept geometry on at least one input layer.
/// Patterns with only empty layers, and store failures, count as failed.
pub fn store_patterns(
    patterns: &[MultiLayerPattern],
    store: &mut dyn PatternStore,
    source_file: &str,
) -> StoreSummary {
    let mut summary = StoreSummary::default();
    for pattern in patterns {
        if !pattern.has_geometry() {
            error!(pattern = %pattern.pattern_id, "all input layers empty");
            summary.failed += 1;
            continue;
        }
        match store.store(pattern, source_file) {
            Ok(()) => {
                summary.successful += 1;
                info!(pattern = %pattern.pattern_id, "stored pattern");
            }
            Err(err) => {
                summary.failed += 1;
                error!(pattern = %pattern.pattern_id, "failed to store pattern: {:#}", err);
            }
        }
    }
    summary
}

#[derive(Serialize)]
struct PatternRecord<'a> {
    source_file: &'a str,
    #[serde(flatten)]
    pattern: &'a MultiLayerPattern,
}

/// Writes one JSON object per pattern per line
pub struct JsonLinesStore<W: Write> {
    writer: W,
}

impl JsonLinesStore<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("failed to create {}", path.as_ref().display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesStore<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PatternStore for JsonLinesStore<W> {
    fn store(&mut self, pattern: &MultiLayerPattern, source_file: &str) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, &PatternRecord { source_file, pattern })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}
