use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SpecsheetError {
    #[error("malformed workbook: {0}")]
    MalformedWorkbook(String),

    #[error("unknown template type '{0}'. Expected one of: BA, UIUX, ENGINEER")]
    UnknownTemplate(String),

    #[error("invalid template definition: {0}")]
    TemplateDefinition(String),

    #[error("failed to load parse options from {path}: {reason}")]
    OptionsLoad { path: PathBuf, reason: String },

    #[error("image storage failed: {0}")]
    ImageStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
