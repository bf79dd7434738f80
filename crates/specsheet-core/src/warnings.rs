use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Recorded for the caller's information, e.g. a low-confidence detection.
    Info,
    /// Something in the document could not be parsed as declared.
    Warning,
}

/// A non-fatal condition recorded alongside a successful parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub message: String,
    pub severity: WarningSeverity,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "[{sheet}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Accumulates warnings during a single parse.
#[derive(Debug, Default)]
pub struct Warnings {
    items: Vec<ParseWarning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, sheet: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(sheet = sheet.unwrap_or("-"), "{message}");
        self.items.push(ParseWarning {
            sheet: sheet.map(str::to_string),
            message,
            severity: WarningSeverity::Warning,
        });
    }

    pub fn info(&mut self, sheet: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(sheet = sheet.unwrap_or("-"), "{message}");
        self.items.push(ParseWarning {
            sheet: sheet.map(str::to_string),
            message,
            severity: WarningSeverity::Info,
        });
    }

    pub fn extend(&mut self, other: Vec<ParseWarning>) {
        self.items.extend(other);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseWarning> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<ParseWarning> {
        self.items
    }
}
