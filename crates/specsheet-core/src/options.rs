use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SpecsheetError;
use crate::templates::TemplateKind;

/// Caller-supplied knobs for a single parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Explicit template token ("BA", "UIUX", "ENGINEER"); skips detection.
    pub template: Option<String>,
    /// Best detection score must exceed this, else the BA fallback is used.
    pub min_detection_score: f64,
    /// How many leading rows of a tabular sheet are searched for the header.
    pub header_search_rows: usize,
    pub extract_images: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            template: None,
            min_detection_score: 0.0,
            header_search_rows: 10,
            extract_images: true,
        }
    }
}

impl ParseOptions {
    pub fn with_template(mut self, kind: TemplateKind) -> Self {
        self.template = Some(kind.as_str().to_string());
        self
    }
}

/// Load parse options from a JSON file. Missing keys take their defaults.
pub fn load_options(path: &Path) -> Result<ParseOptions, SpecsheetError> {
    let content = std::fs::read_to_string(path).map_err(|e| SpecsheetError::OptionsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_options(&content, path)
}

/// Parse options from a JSON string, attributing errors to `source`.
pub fn parse_options(json: &str, source: &Path) -> Result<ParseOptions, SpecsheetError> {
    let options: ParseOptions =
        serde_json::from_str(json).map_err(|e| SpecsheetError::OptionsLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !(0.0..=1.0).contains(&options.min_detection_score) {
        return Err(SpecsheetError::OptionsLoad {
            path: source.to_path_buf(),
            reason: format!(
                "min_detection_score must be between 0 and 1, got {}",
                options.min_detection_score
            ),
        });
    }
    if let Some(token) = &options.template {
        token.parse::<TemplateKind>()?;
    }
    Ok(options)
}
