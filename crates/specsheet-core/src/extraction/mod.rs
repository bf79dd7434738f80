//! Reading a workbook into cell grids and embedded images.

pub mod drawing;
pub mod media;
pub mod xlsx;

use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::error::SpecsheetError;
use crate::model::ExtractedImage;
use crate::warnings::{ParseWarning, Warnings};

/// A single cell as read from the workbook, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

/// One worksheet's cell grid.
///
/// Rows and columns are absolute sheet positions: `rows[0][0]` is cell A1,
/// even when the used range starts further down. Image anchors index into
/// the same coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything pulled out of a workbook, in workbook order.
#[derive(Debug, Default)]
pub struct ExtractedWorkbook {
    pub sheets: Vec<RawSheet>,
    pub images: Vec<ExtractedImage>,
    pub warnings: Vec<ParseWarning>,
}

impl ExtractedWorkbook {
    pub fn sheet(&self, name: &str) -> Option<&RawSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Open workbook bytes and extract every sheet and, optionally, every embedded image.
///
/// Only a byte stream that cannot be opened as a workbook is an error.
/// Unreadable sheets and undecodable images become warnings.
pub fn extract_workbook(
    bytes: &[u8],
    with_images: bool,
) -> Result<ExtractedWorkbook, SpecsheetError> {
    let mut warnings = Warnings::new();
    let sheets = xlsx::read_sheets(bytes, &mut warnings)?;

    let images = if with_images {
        dedupe(drawing::extract_images(bytes, &mut warnings))
    } else {
        Vec::new()
    };

    tracing::debug!(
        sheets = sheets.len(),
        images = images.len(),
        "extracted workbook"
    );

    Ok(ExtractedWorkbook {
        sheets,
        images,
        warnings: warnings.into_vec(),
    })
}

/// Stable image identifier: `img_` + 16 hex chars of SHA-256 over sheet, cell and content.
pub fn image_id(sheet: &str, cell: &str, content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sheet.as_bytes());
    hasher.update([0u8]);
    hasher.update(cell.as_bytes());
    hasher.update([0u8]);
    hasher.update(content);
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("img_{hex}")
}

/// Drop repeated images: same content anchored at the same cell of the same sheet.
fn dedupe(images: Vec<ExtractedImage>) -> Vec<ExtractedImage> {
    let mut seen = HashSet::new();
    images
        .into_iter()
        .filter(|img| seen.insert(img.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id_stable_and_distinct() {
        let a = image_id("Design Assets", "B4", b"png-bytes");
        assert_eq!(a, image_id("Design Assets", "B4", b"png-bytes"));
        assert!(a.starts_with("img_"));
        assert_eq!(a.len(), 4 + 16);
        assert_ne!(a, image_id("Design Assets", "B5", b"png-bytes"));
        assert_ne!(a, image_id("Figma Links", "B4", b"png-bytes"));
    }

    #[test]
    fn test_garbage_bytes_are_malformed() {
        let err = extract_workbook(b"definitely not a workbook", true).unwrap_err();
        assert!(matches!(err, SpecsheetError::MalformedWorkbook(_)));
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(matches!(
            extract_workbook(&[], false),
            Err(SpecsheetError::MalformedWorkbook(_))
        ));
    }
}
