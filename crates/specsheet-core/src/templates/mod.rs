pub mod builtin;
pub mod schema;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::SpecsheetError;
use schema::{SheetShape, TemplateDef};

pub use builtin::{definition, definitions};

/// The three document schemas a workbook can follow.
///
/// Declaration order is also the detection tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TemplateKind {
    #[serde(rename = "BA")]
    Ba,
    #[serde(rename = "UIUX")]
    Uiux,
    #[serde(rename = "ENGINEER")]
    Engineer,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [TemplateKind::Ba, TemplateKind::Uiux, TemplateKind::Engineer];

    /// Boundary token: "BA", "UIUX" or "ENGINEER".
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Ba => "BA",
            TemplateKind::Uiux => "UIUX",
            TemplateKind::Engineer => "ENGINEER",
        }
    }

    /// Expected sheet names, in workbook order.
    pub fn expected_sheets(&self) -> &'static [&'static str] {
        match self {
            TemplateKind::Ba => &[
                "Product Overview",
                "User Story",
                "Acceptance Criteria",
                "Business Value",
                "BA Approval",
            ],
            TemplateKind::Uiux => &[
                "Design Overview",
                "Figma Links",
                "Design Assets",
                "Design Decisions",
                "Approval",
            ],
            TemplateKind::Engineer => &[
                "Project Info",
                "Tech Stack",
                "Development Estimate",
                "Architecture Documents",
                "Infrastructure",
                "Approval",
            ],
        }
    }

    pub fn primary_sheet(&self) -> &'static str {
        self.expected_sheets()[0]
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = SpecsheetError;

    /// Tokens are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BA" => Ok(TemplateKind::Ba),
            "UIUX" => Ok(TemplateKind::Uiux),
            "ENGINEER" => Ok(TemplateKind::Engineer),
            other => Err(SpecsheetError::UnknownTemplate(other.to_string())),
        }
    }
}

/// Validate that a template definition is well-formed and agrees with its kind.
pub fn validate_definition(def: &TemplateDef) -> Result<(), SpecsheetError> {
    let expected = def.kind.expected_sheets();
    let declared: Vec<&str> = def.sheet_names().collect();
    if declared != expected {
        return Err(SpecsheetError::TemplateDefinition(format!(
            "{} declares sheets [{}], expected [{}]",
            def.kind,
            declared.join(", "),
            expected.join(", ")
        )));
    }

    if def.primary_sheet != def.kind.primary_sheet() {
        return Err(SpecsheetError::TemplateDefinition(format!(
            "{} primary sheet '{}' should be '{}'",
            def.kind,
            def.primary_sheet,
            def.kind.primary_sheet()
        )));
    }

    if def.title_fields.is_empty() {
        return Err(SpecsheetError::TemplateDefinition(format!(
            "{} has no title fields",
            def.kind
        )));
    }

    let mut sections = HashSet::new();
    for sheet in &def.sheets {
        if !sections.insert(sheet.section.as_str()) {
            return Err(SpecsheetError::TemplateDefinition(format!(
                "{} declares section '{}' twice",
                def.kind, sheet.section
            )));
        }

        match sheet.shape {
            SheetShape::KeyValue => {
                if !sheet.columns.is_empty() {
                    return Err(SpecsheetError::TemplateDefinition(format!(
                        "key-value sheet '{}' must not declare columns",
                        sheet.name
                    )));
                }
                if sheet.key_column == sheet.value_column {
                    return Err(SpecsheetError::TemplateDefinition(format!(
                        "sheet '{}' uses column {} for both keys and values",
                        sheet.name, sheet.key_column
                    )));
                }
            }
            SheetShape::Tabular => {
                if sheet.columns.is_empty() {
                    return Err(SpecsheetError::TemplateDefinition(format!(
                        "tabular sheet '{}' declares no columns",
                        sheet.name
                    )));
                }
            }
        }
    }

    Ok(())
}
