//! Semantic categories for embedded images.

pub mod keywords;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ExtractedImage;
use crate::templates::schema::TemplateDef;
use keywords::{asset_type_category, FILE_NAME_KEYWORDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCategory {
    Mockup,
    Diagram,
    Screenshot,
    Wireframe,
    Other,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 5] = [
        ImageCategory::Mockup,
        ImageCategory::Diagram,
        ImageCategory::Screenshot,
        ImageCategory::Wireframe,
        ImageCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageCategory::Mockup => "mockup",
            ImageCategory::Diagram => "diagram",
            ImageCategory::Screenshot => "screenshot",
            ImageCategory::Wireframe => "wireframe",
            ImageCategory::Other => "other",
        }
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Assign a category to an image. Never fails.
///
/// 1. The sheet it is anchored on, looked up in the workbook's template:
///    sheets that declare asset-type columns use the asset type of the
///    nearest data row (`image.context`); sheets with a fixed category use
///    that.
/// 2. Keywords in the file name, picture name or description.
/// 3. `Other`.
pub fn classify(image: &ExtractedImage, def: &TemplateDef) -> ImageCategory {
    by_sheet(image, def)
        .or_else(|| by_keyword(image))
        .unwrap_or(ImageCategory::Other)
}

fn by_sheet(image: &ExtractedImage, def: &TemplateDef) -> Option<ImageCategory> {
    let sheet = def.sheet(&image.sheet_name)?;
    let from_context = if sheet.asset_type_columns.is_empty() {
        None
    } else {
        image.context.as_deref().and_then(asset_type_category)
    };
    from_context.or(sheet.image_category)
}

fn by_keyword(image: &ExtractedImage) -> Option<ImageCategory> {
    let haystacks: Vec<String> = [
        Some(image.file_name.as_str()),
        image.name.as_deref(),
        image.description.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::to_lowercase)
    .collect();

    FILE_NAME_KEYWORDS
        .iter()
        .find(|(keyword, _)| haystacks.iter().any(|h| h.contains(*keyword)))
        .map(|(_, category)| *category)
}
