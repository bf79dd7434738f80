use serde::{Deserialize, Serialize};

use crate::classify::ImageCategory;
use crate::parsing::normalize::canonical_key;
use crate::templates::TemplateKind;

/// How a sheet encodes its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetShape {
    /// Label in one column, value in the adjacent column.
    KeyValue,
    /// Header row followed by one record per row.
    Tabular,
}

/// A document template: which sheets it expects and how to read each one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDef {
    pub kind: TemplateKind,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Sheet that identifies the template. Missing it is worth a warning.
    pub primary_sheet: String,
    /// Candidate fields for the document title, in order of preference.
    pub title_fields: Vec<String>,
    pub default_title: String,
    pub default_category: String,
    /// Key-value field holding the category, when the template has one.
    #[serde(default)]
    pub category_field: Option<String>,
    pub sheets: Vec<SheetDef>,
}

impl TemplateDef {
    pub fn sheet(&self, name: &str) -> Option<&SheetDef> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }
}

/// One expected sheet within a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetDef {
    pub name: String,
    /// Key under which the parsed sheet appears in the result.
    pub section: String,
    pub shape: SheetShape,
    /// Recognized labels of a key-value sheet. Unknown labels are kept too.
    #[serde(default)]
    pub fields: Vec<LabelDef>,
    /// Expected column headers of a tabular sheet, used to find the header row.
    #[serde(default)]
    pub columns: Vec<LabelDef>,
    /// Labels in a key-value sheet that mark a header row rather than data.
    #[serde(default = "default_skip_labels")]
    pub skip_labels: Vec<String>,
    #[serde(default)]
    pub key_column: usize,
    #[serde(default = "default_value_column")]
    pub value_column: usize,
    #[serde(default)]
    pub coercions: Vec<Coercion>,
    /// Category for any image anchored on this sheet.
    #[serde(default)]
    pub image_category: Option<ImageCategory>,
    /// Columns whose value on the nearest row declares what an image shows.
    #[serde(default)]
    pub asset_type_columns: Vec<String>,
}

fn default_skip_labels() -> Vec<String> {
    vec![
        "field".into(),
        "metric".into(),
        "success metrics".into(),
        "value".into(),
    ]
}

fn default_value_column() -> usize {
    1
}

/// A recognized label, its canonical key and any alternative spellings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LabelSpec")]
pub struct LabelDef {
    pub label: String,
    pub key: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl LabelDef {
    /// True if `canonical` is this label's key or the canonical form of an alias.
    pub fn matches(&self, canonical: &str) -> bool {
        self.key == canonical
            || canonical_key(&self.label) == canonical
            || self.aliases.iter().any(|a| canonical_key(a) == canonical)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelSpec {
    Plain(String),
    Full {
        label: String,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        aliases: Vec<String>,
    },
}

impl From<LabelSpec> for LabelDef {
    fn from(spec: LabelSpec) -> Self {
        match spec {
            LabelSpec::Plain(label) => LabelDef {
                key: canonical_key(&label),
                label,
                aliases: Vec::new(),
            },
            LabelSpec::Full {
                label,
                key,
                aliases,
            } => LabelDef {
                key: key.unwrap_or_else(|| canonical_key(&label)),
                label,
                aliases,
            },
        }
    }
}

/// Type coercion applied to one (canonical) column of every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Coercion {
    /// "3 weeks" -> 21 stored under `target`.
    DurationDays { column: String, target: String },
    /// Validates a URL into `valid_key`; extracts a file id into `id_key`
    /// when the URL matches a known pattern.
    Url {
        column: String,
        valid_key: String,
        #[serde(default)]
        id_key: Option<String>,
    },
    /// Normalizes text dates to YYYY-MM-DD in place.
    Date { column: String },
}

impl Coercion {
    pub fn column(&self) -> &str {
        match self {
            Coercion::DurationDays { column, .. }
            | Coercion::Url { column, .. }
            | Coercion::Date { column } => column,
        }
    }
}
