//! GDSII stream decoding
//!
//! The stream is a flat sequence of `(length:u16, record_type:u8,
//! data_type:u8, payload)` records where `length` counts the 4 header bytes.
//! Records this decoder does not act on are skipped by their declared length.

use super::error::{DecodeError, DecodeResult};
use super::primitives::RecordReader;
use crate::geometry::{Layer, LayerKey, Point, Polygon};
use std::collections::BTreeSet;
use std::io::Read;
use tracing::{debug, warn};

/// Used when the UNITS record is missing or yields an unusable ratio
pub const FALLBACK_UNIT_SCALE: f64 = 0.001;

const HEADER_LEN: u16 = 4;

// Record data types
const DT_INT2: u8 = 0x02;
const DT_INT4: u8 = 0x03;
const DT_REAL8: u8 = 0x05;
const DT_ASCII: u8 = 0x06;

/// Record kinds the decoder acts on; everything else is opaque
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GdsRecord {
    LibName,
    Units,
    Boundary,
    Layer,
    Datatype,
    Xy,
    EndEl,
    Other(u8),
}

impl GdsRecord {
    fn from_tag(tag: u8) -> Self {
        match tag {
            0x02 => GdsRecord::LibName,
            0x03 => GdsRecord::Units,
            0x08 => GdsRecord::Boundary,
            0x0D => GdsRecord::Layer,
            0x0E => GdsRecord::Datatype,
            0x10 => GdsRecord::Xy,
            0x11 => GdsRecord::EndEl,
            other => GdsRecord::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RecordHeader {
    offset: u64,
    length: u16,
    record: GdsRecord,
    data_type: u8,
}

impl RecordHeader {
    fn payload_len(&self) -> u64 {
        u64::from(self.length - HEADER_LEN)
    }

    /// Check the data type and, if given, the total record length
    fn expect(&self, data_type: u8, length: Option<u16>) -> DecodeResult<()> {
        if self.data_type != data_type {
            return Err(DecodeError::malformed(
                self.offset,
                format!("{:?} record with data type {:#04x}", self.record, self.data_type),
            ));
        }
        match length {
            Some(expected) if expected != self.length => Err(DecodeError::malformed(
                self.offset,
                format!("{:?} record with length {} (expected {})", self.record, self.length, expected),
            )),
            _ => Ok(()),
        }
    }
}

/// Counters reported once per decode call
#[derive(Debug, Default)]
struct DecodeStats {
    records: u64,
    padding: u64,
    skipped: u64,
    malformed: u64,
    shapes: u64,
    matched: u64,
    rejected: u64,
}

/// Record-level cursor: header iteration, payload skipping and recovery
struct GdsStream<R> {
    reader: RecordReader<R>,
    stats: DecodeStats,
}

impl<R: Read> GdsStream<R> {
    fn new(source: R) -> Self {
        Self { reader: RecordReader::new(source), stats: DecodeStats::default() }
    }

    /// Next record header, or `None` once the stream ends at a record
    /// boundary. A partial header is treated as trailing padding.
    fn next_record(&mut self) -> DecodeResult<Option<RecordHeader>> {
        loop {
            let offset = self.reader.offset();
            let Some(hi) = self.reader.try_read_u8()? else {
                if offset == 0 {
                    return Err(DecodeError::TruncatedInput { offset, what: "GDSII stream header" });
                }
                return Ok(None);
            };
            let Some(lo) = self.reader.try_read_u8()? else {
                return Ok(None);
            };

            let length = u16::from_be_bytes([hi, lo]);
            if length == 0 {
                self.stats.padding += 1;
                continue;
            }
            if length < HEADER_LEN {
                return Err(DecodeError::malformed(
                    offset,
                    format!("record length {} is shorter than its header", length),
                ));
            }

            let Some(tag) = self.reader.try_read_u8()? else {
                return Ok(None);
            };
            let Some(data_type) = self.reader.try_read_u8()? else {
                return Ok(None);
            };

            self.stats.records += 1;
            return Ok(Some(RecordHeader {
                offset,
                length,
                record: GdsRecord::from_tag(tag),
                data_type,
            }));
        }
    }

    fn skip_payload(&mut self, header: &RecordHeader) -> DecodeResult<()> {
        self.stats.skipped += 1;
        self.reader.skip(header.payload_len())
    }

    /// Skip a record whose structure did not match its type
    fn recover(&mut self, header: &RecordHeader, err: DecodeError) -> DecodeResult<()> {
        debug!(%err, "skipping malformed GDSII record");
        self.stats.malformed += 1;
        self.reader.skip(header.payload_len())
    }

    fn read_units(&mut self) -> DecodeResult<f64> {
        let user_unit = self.reader.read_packed_real()?;
        let db_unit = self.reader.read_packed_real()?;
        let scale = db_unit / user_unit;
        if !scale.is_finite() || scale.abs() < 1e-10 {
            warn!(user_unit, db_unit, scale, fallback = FALLBACK_UNIT_SCALE, "invalid GDSII unit scale");
            return Ok(FALLBACK_UNIT_SCALE);
        }
        debug!(user_unit, db_unit, scale, "GDSII units");
        Ok(scale)
    }

    /// Read an XY payload as scaled points; a trailing partial pair is skipped
    fn read_points(&mut self, header: &RecordHeader, scale: f64) -> DecodeResult<Vec<Point>> {
        let payload = header.payload_len();
        let count = payload / 8;
        let mut points = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let x = self.reader.read_i32()?;
            let y = self.reader.read_i32()?;
            points.push(Point::new(f64::from(x) * scale, f64::from(y) * scale));
        }
        self.reader.skip(payload % 8)?;
        Ok(points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeState {
    Idle,
    InShape,
}

/// Decode every BOUNDARY on `filter` into a layer
pub fn decode_layer<R: Read>(source: R, filter: LayerKey) -> DecodeResult<Layer> {
    let mut stream = GdsStream::new(source);
    let mut layer = Layer::empty_for(filter);
    let mut library: Option<String> = None;

    let mut scale = FALLBACK_UNIT_SCALE;
    let mut state = ShapeState::Idle;
    let mut current_layer: Option<u32> = None;
    let mut current_datatype: Option<u32> = None;
    let mut polygon = Polygon::default();

    while let Some(header) = stream.next_record()? {
        match header.record {
            GdsRecord::Units => {
                if let Err(err) = header.expect(DT_REAL8, Some(20)) {
                    stream.recover(&header, err)?;
                    continue;
                }
                scale = stream.read_units()?;
            }
            GdsRecord::LibName => {
                if let Err(err) = header.expect(DT_ASCII, None) {
                    stream.recover(&header, err)?;
                    continue;
                }
                library = Some(stream.reader.read_fixed_string(header.payload_len() as usize)?);
            }
            GdsRecord::Boundary => {
                state = ShapeState::InShape;
                polygon = Polygon::default();
                current_layer = None;
                current_datatype = None;
                stream.stats.shapes += 1;
                stream.reader.skip(header.payload_len())?;
            }
            GdsRecord::Layer | GdsRecord::Datatype if state == ShapeState::InShape => {
                if let Err(err) = header.expect(DT_INT2, Some(HEADER_LEN + 2)) {
                    stream.recover(&header, err)?;
                    continue;
                }
                let value = u32::from(stream.reader.read_u16()?);
                if header.record == GdsRecord::Layer {
                    current_layer = Some(value);
                } else {
                    current_datatype = Some(value);
                }
            }
            GdsRecord::Xy if state == ShapeState::InShape => {
                if let Err(err) = header.expect(DT_INT4, None) {
                    stream.recover(&header, err)?;
                    continue;
                }
                polygon.set_points(stream.read_points(&header, scale)?);
                polygon.strip_closing_point();
            }
            GdsRecord::EndEl => {
                if state == ShapeState::InShape
                    && current_layer == Some(filter.layer)
                    && current_datatype == Some(filter.datatype)
                {
                    let shape = std::mem::take(&mut polygon);
                    if shape.is_valid() {
                        stream.stats.matched += 1;
                        layer.polygons.push(shape);
                    } else {
                        stream.stats.rejected += 1;
                    }
                }
                state = ShapeState::Idle;
                current_layer = None;
                current_datatype = None;
                stream.reader.skip(header.payload_len())?;
            }
            _ => stream.skip_payload(&header)?,
        }
    }

    let stats = &stream.stats;
    debug!(
        layer = %filter,
        library = library.as_deref().unwrap_or(""),
        records = stats.records,
        padding = stats.padding,
        skipped = stats.skipped,
        malformed = stats.malformed,
        shapes = stats.shapes,
        matched = stats.matched,
        rejected = stats.rejected,
        "GDSII decode finished"
    );
    Ok(layer)
}

/// Collect every (layer, datatype) pair used by an element, sorted and unique
pub fn list_layers<R: Read>(source: R) -> DecodeResult<Vec<LayerKey>> {
    let mut stream = GdsStream::new(source);
    let mut pairs = BTreeSet::new();
    let mut current_layer: Option<u32> = None;

    while let Some(header) = stream.next_record()? {
        match header.record {
            GdsRecord::Layer | GdsRecord::Datatype => {
                if let Err(err) = header.expect(DT_INT2, Some(HEADER_LEN + 2)) {
                    stream.recover(&header, err)?;
                    continue;
                }
                let value = u32::from(stream.reader.read_u16()?);
                if header.record == GdsRecord::Layer {
                    current_layer = Some(value);
                } else if let Some(layer) = current_layer {
                    pairs.insert(LayerKey::new(layer, value));
                }
            }
            GdsRecord::EndEl => {
                current_layer = None;
                stream.reader.skip(header.payload_len())?;
            }
            _ => stream.skip_payload(&header)?,
        }
    }

    debug!(
        records = stream.stats.records,
        malformed = stream.stats.malformed,
        pairs = pairs.len(),
        "GDSII layer discovery finished"
    );
    Ok(pairs.into_iter().collect())
}
