//! OASIS stream decoding
//!
//! A mandatory START record (tag, varuint length, payload) is followed by
//! single-byte tagged records with no outer length prefix. Only LAYER,
//! POLYGON and END carry meaning here; every other tag is a no-op.

use super::error::{DecodeError, DecodeResult};
use super::primitives::RecordReader;
use crate::geometry::{Layer, LayerKey, Point, Polygon};
use std::collections::BTreeSet;
use std::io::Read;
use tracing::debug;

/// Upper bound on the up-front point allocation for one polygon
const MAX_PREALLOCATED_POINTS: u64 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OasisRecord {
    Start,
    Layer,
    Polygon,
    End,
    Other(u8),
}

impl OasisRecord {
    fn from_tag(tag: u8) -> Self {
        match tag {
            1 => OasisRecord::Start,
            19 => OasisRecord::Layer,
            23 => OasisRecord::Polygon,
            34 => OasisRecord::End,
            other => OasisRecord::Other(other),
        }
    }
}

#[derive(Debug, Default)]
struct DecodeStats {
    records: u64,
    ignored: u64,
    polygons: u64,
    matched: u64,
    degenerate: u64,
    rejected: u64,
}

/// Read and discard the START record. Any failure here is fatal.
fn read_start<R: Read>(reader: &mut RecordReader<R>) -> DecodeResult<()> {
    let offset = reader.offset();
    let tag = reader.try_read_u8()?.ok_or(DecodeError::TruncatedInput {
        offset,
        what: "OASIS START record",
    })?;
    if OasisRecord::from_tag(tag) != OasisRecord::Start {
        return Err(DecodeError::malformed(
            offset,
            format!("missing START record (found tag {})", tag),
        ));
    }
    let length = reader.read_var_uint()?;
    reader.skip(length)
}

fn read_layer_key<R: Read>(reader: &mut RecordReader<R>) -> DecodeResult<LayerKey> {
    let offset = reader.offset();
    let narrow = |value: u64| {
        u32::try_from(value)
            .map_err(|_| DecodeError::malformed(offset, format!("layer value {} out of range", value)))
    };
    let layer = narrow(reader.read_var_uint()?)?;
    let datatype = narrow(reader.read_var_uint()?)?;
    Ok(LayerKey::new(layer, datatype))
}

/// Point count followed by signed-varint coordinate pairs, used unscaled
fn read_points<R: Read>(reader: &mut RecordReader<R>) -> DecodeResult<Vec<Point>> {
    let count = reader.read_var_uint()?;
    let mut points = Vec::with_capacity(count.min(MAX_PREALLOCATED_POINTS) as usize);
    for _ in 0..count {
        let x = reader.read_var_signed()?;
        let y = reader.read_var_signed()?;
        points.push(Point::new(x as f64, y as f64));
    }
    Ok(points)
}

/// Consume a point list without keeping it. Coordinates are variable
/// width, so each one is decoded to stay in sync.
fn skip_points<R: Read>(reader: &mut RecordReader<R>) -> DecodeResult<()> {
    let count = reader.read_var_uint()?;
    for _ in 0..count {
        reader.read_var_signed()?;
        reader.read_var_signed()?;
    }
    Ok(())
}

/// Decode every POLYGON on `filter` into a layer
pub fn decode_layer<R: Read>(source: R, filter: LayerKey) -> DecodeResult<Layer> {
    let mut reader = RecordReader::new(source);
    let mut stats = DecodeStats::default();
    let mut layer = Layer::empty_for(filter);
    let mut current: Option<LayerKey> = None;

    read_start(&mut reader)?;

    while let Some(tag) = reader.try_read_u8()? {
        stats.records += 1;
        match OasisRecord::from_tag(tag) {
            OasisRecord::Layer => current = Some(read_layer_key(&mut reader)?),
            OasisRecord::Polygon => {
                stats.polygons += 1;
                if current != Some(filter) {
                    skip_points(&mut reader)?;
                    continue;
                }

                let mut polygon = Polygon::new(read_points(&mut reader)?);
                if !polygon.has_significant_point() {
                    stats.degenerate += 1;
                    continue;
                }
                polygon.strip_closing_point();
                if polygon.is_valid() {
                    stats.matched += 1;
                    layer.polygons.push(polygon);
                } else {
                    stats.rejected += 1;
                }
            }
            OasisRecord::End => break,
            OasisRecord::Start | OasisRecord::Other(_) => stats.ignored += 1,
        }
    }

    debug!(
        layer = %filter,
        records = stats.records,
        ignored = stats.ignored,
        polygons = stats.polygons,
        matched = stats.matched,
        degenerate = stats.degenerate,
        rejected = stats.rejected,
        "OASIS decode finished"
    );
    Ok(layer)
}

/// Collect every (layer, datatype) pair that carries at least one polygon
pub fn list_layers<R: Read>(source: R) -> DecodeResult<Vec<LayerKey>> {
    let mut reader = RecordReader::new(source);
    let mut pairs = BTreeSet::new();
    let mut current: Option<LayerKey> = None;

    read_start(&mut reader)?;

    while let Some(tag) = reader.try_read_u8()? {
        match OasisRecord::from_tag(tag) {
            OasisRecord::Layer => current = Some(read_layer_key(&mut reader)?),
            OasisRecord::Polygon => {
                skip_points(&mut reader)?;
                if let Some(key) = current {
                    pairs.insert(key);
                }
            }
            OasisRecord::End => break,
            OasisRecord::Start | OasisRecord::Other(_) => {}
        }
    }

    debug!(pairs = pairs.len(), "OASIS layer discovery finished");
    Ok(pairs.into_iter().collect())
}
