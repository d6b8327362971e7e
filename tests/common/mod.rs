//! Byte-level fixture builders for GDSII and OASIS streams

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Encode a value as an 8-byte excess-64 base-16 real
pub fn gds_real(value: f64) -> [u8; 8] {
    if value == 0.0 {
        return [0; 8];
    }
    let sign = if value < 0.0 { 0x80u8 } else { 0 };
    let mut mag = value.abs();
    let mut exp: i32 = 64;
    while mag >= 1.0 {
        mag /= 16.0;
        exp += 1;
    }
    while mag < 1.0 / 16.0 {
        mag *= 16.0;
        exp -= 1;
    }
    let mut mantissa = (mag * 2f64.powi(56)).round() as u64;
    if mantissa >= 1 << 56 {
        mantissa >>= 4;
        exp += 1;
    }
    let mut bytes = [0u8; 8];
    bytes[0] = sign | exp as u8;
    bytes[1..].copy_from_slice(&mantissa.to_be_bytes()[1..]);
    bytes
}

/// Builds a GDSII stream record by record
#[derive(Default)]
pub struct GdsBuilder {
    bytes: Vec<u8>,
}

impl GdsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, tag: u8, data_type: u8, payload: &[u8]) -> Self {
        self.bytes.extend(((payload.len() + 4) as u16).to_be_bytes());
        self.bytes.push(tag);
        self.bytes.push(data_type);
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn header(self) -> Self {
        self.record(0x00, 0x02, &600u16.to_be_bytes())
    }

    pub fn lib_name(self, name: &str) -> Self {
        let mut payload = name.as_bytes().to_vec();
        if payload.len() % 2 == 1 {
            payload.push(0);
        }
        self.record(0x02, 0x06, &payload)
    }

    pub fn units(self, user_unit: f64, db_unit: f64) -> Self {
        let mut payload = gds_real(user_unit).to_vec();
        payload.extend(gds_real(db_unit));
        self.record(0x03, 0x05, &payload)
    }

    pub fn boundary(self, layer: u16, datatype: u16, coords: &[(i32, i32)]) -> Self {
        let xy: Vec<u8> = coords
            .iter()
            .flat_map(|&(x, y)| x.to_be_bytes().into_iter().chain(y.to_be_bytes()))
            .collect();
        self.record(0x08, 0x00, &[])
            .record(0x0D, 0x02, &layer.to_be_bytes())
            .record(0x0E, 0x02, &datatype.to_be_bytes())
            .record(0x10, 0x03, &xy)
            .record(0x11, 0x00, &[])
    }

    pub fn end_lib(self) -> Self {
        self.record(0x04, 0x00, &[])
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn varuint(mut value: u64) -> Vec<u8> {
    let mut groups = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        groups.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    groups.reverse();
    groups
}

pub fn varsigned(value: i64) -> Vec<u8> {
    let sign = u64::from(value < 0);
    varuint((value.unsigned_abs() << 1) | sign)
}

/// Builds an OASIS stream; `new` emits the START record
pub struct OasisBuilder {
    bytes: Vec<u8>,
}

impl OasisBuilder {
    pub fn new() -> Self {
        let mut bytes = vec![1];
        bytes.extend(varuint(3));
        bytes.extend(b"1.0");
        Self { bytes }
    }

    pub fn layer(mut self, layer: u64, datatype: u64) -> Self {
        self.bytes.push(19);
        self.bytes.extend(varuint(layer));
        self.bytes.extend(varuint(datatype));
        self
    }

    pub fn polygon(mut self, coords: &[(i64, i64)]) -> Self {
        self.bytes.push(23);
        self.bytes.extend(varuint(coords.len() as u64));
        for &(x, y) in coords {
            self.bytes.extend(varsigned(x));
            self.bytes.extend(varsigned(y));
        }
        self
    }

    pub fn end(mut self) -> Self {
        self.bytes.push(34);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Write `bytes` to `name` inside a fresh temp dir; keep the dir alive
pub fn write_fixture(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create fixture");
    file.write_all(bytes).expect("write fixture");
    (dir, path)
}

pub const SQUARE: [(i32, i32); 5] = [(0, 0), (1000, 0), (1000, 1000), (0, 1000), (0, 0)];
