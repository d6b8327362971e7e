//! Layout format detection from the file extension

use super::error::{DecodeError, DecodeResult};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFormat {
    Gdsii,
    Oasis,
}

impl LayoutFormat {
    /// Case-insensitive extension match: `.gds`/`.gdsii` or `.oas`/`.oasis`
    pub fn from_path(path: &Path) -> DecodeResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("gds") | Some("gdsii") => Ok(LayoutFormat::Gdsii),
            Some("oas") | Some("oasis") => Ok(LayoutFormat::Oasis),
            _ => Err(DecodeError::UnsupportedFormat { path: path.to_path_buf() }),
        }
    }
}

impl fmt::Display for LayoutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutFormat::Gdsii => write!(f, "GDSII"),
            LayoutFormat::Oasis => write!(f, "OASIS"),
        }
    }
}
