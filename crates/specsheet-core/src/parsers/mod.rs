//! Per-template parsing: one module per [`TemplateKind`], dispatched by `match`.

pub mod ba;
pub mod engineer;
pub mod uiux;

use crate::error::SpecsheetError;
use crate::extraction::RawSheet;
use crate::model::{Fields, OrderedMap, ParsedSection, ParsingStats, Scalar};
use crate::options::ParseOptions;
use crate::parsing::{field, parse_key_value, parse_tabular};
use crate::templates::schema::{SheetDef, SheetShape, TemplateDef};
use crate::templates::{definition, TemplateKind};
use crate::warnings::Warnings;

/// Where the records of one tabular section came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOrigin {
    pub sheet: String,
    pub section: String,
    pub header_row: Option<usize>,
    /// Zero-based sheet row of each record, parallel to the section's records.
    pub source_rows: Vec<usize>,
}

/// Everything a template parser produces before images are attached.
#[derive(Debug, Clone)]
pub struct TemplateOutput {
    pub kind: TemplateKind,
    pub sections: OrderedMap<ParsedSection>,
    pub origins: Vec<TableOrigin>,
    pub approval_status: String,
    pub category_name: String,
    pub stats: ParsingStats,
}

impl TemplateOutput {
    pub fn table(&self, section: &str) -> &[Fields] {
        self.sections
            .get(section)
            .and_then(ParsedSection::as_table)
            .unwrap_or(&[])
    }

    pub fn key_values(&self, section: &str) -> Option<&Fields> {
        self.sections.get(section).and_then(ParsedSection::as_key_value)
    }

    fn table_mut(&mut self, section: &str) -> Option<&mut Vec<Fields>> {
        match self.sections.get_mut(section) {
            Some(ParsedSection::Table(rows)) => Some(rows),
            _ => None,
        }
    }

    fn key_values_mut(&mut self, section: &str) -> Option<&mut Fields> {
        match self.sections.get_mut(section) {
            Some(ParsedSection::KeyValue(fields)) => Some(fields),
            _ => None,
        }
    }

    fn section_len(&self, section: &str) -> usize {
        self.sections.get(section).map_or(0, ParsedSection::len)
    }
}

/// Parse `sheets` as the given template.
pub fn parse_for_kind(
    kind: TemplateKind,
    sheets: &[RawSheet],
    options: &ParseOptions,
    warnings: &mut Warnings,
) -> Result<TemplateOutput, SpecsheetError> {
    let def = definition(kind)?;
    let mut output = parse_declared(def, sheets, options.header_search_rows, warnings);
    match kind {
        TemplateKind::Ba => ba::enrich(def, &mut output),
        TemplateKind::Uiux => uiux::enrich(def, &mut output),
        TemplateKind::Engineer => engineer::enrich(def, &mut output),
    }
    tracing::debug!(kind = %kind, sections = output.sections.len(), "parsed template");
    Ok(output)
}

/// Parse every declared sheet by its shape. Missing sheets give empty sections.
fn parse_declared(
    def: &TemplateDef,
    sheets: &[RawSheet],
    search_rows: usize,
    warnings: &mut Warnings,
) -> TemplateOutput {
    let mut sections = OrderedMap::new();
    let mut origins = Vec::new();

    for sheet_def in &def.sheets {
        let Some(sheet) = sheets.iter().find(|s| s.name == sheet_def.name) else {
            if sheet_def.name == def.primary_sheet {
                warnings.warn(
                    Some(&sheet_def.name),
                    format!(
                        "identifying sheet for the {} template is missing; parsing the remaining sheets",
                        def.kind
                    ),
                );
            } else {
                warnings.warn(Some(&sheet_def.name), "expected sheet is missing");
            }
            sections.insert(sheet_def.section.clone(), empty_section(sheet_def));
            continue;
        };

        let section = match sheet_def.shape {
            SheetShape::KeyValue => ParsedSection::KeyValue(parse_key_value(sheet, sheet_def, warnings)),
            SheetShape::Tabular => {
                let table = parse_tabular(sheet, sheet_def, search_rows, warnings);
                origins.push(TableOrigin {
                    sheet: sheet.name.clone(),
                    section: sheet_def.section.clone(),
                    header_row: table.header_row,
                    source_rows: table.source_rows,
                });
                ParsedSection::Table(table.records)
            }
        };
        sections.insert(sheet_def.section.clone(), section);
    }

    TemplateOutput {
        kind: def.kind,
        category_name: category_name(def, &sections),
        sections,
        origins,
        approval_status: PENDING.to_string(),
        stats: ParsingStats::default(),
    }
}

fn empty_section(sheet_def: &SheetDef) -> ParsedSection {
    match sheet_def.shape {
        SheetShape::KeyValue => ParsedSection::KeyValue(Fields::new()),
        SheetShape::Tabular => ParsedSection::Table(Vec::new()),
    }
}

/// The template's category field from the primary sheet, or its default category.
fn category_name(def: &TemplateDef, sections: &OrderedMap<ParsedSection>) -> String {
    def.category_field
        .as_deref()
        .and_then(|name| {
            let primary = def.sheet(&def.primary_sheet)?;
            let fields = sections.get(&primary.section)?.as_key_value()?;
            fields.get(name).filter(|v| !v.is_placeholder()).map(Scalar::to_string)
        })
        .unwrap_or_else(|| def.default_category.clone())
}

pub(crate) const PENDING: &str = "PENDING";

/// Uppercased text of a declared column, or None for placeholders and non-text.
pub(crate) fn upper_text(record: &Fields, sheet: &SheetDef, name: &str) -> Option<String> {
    field(record, sheet, name)
        .filter(|v| !v.is_placeholder())
        .map(|v| v.to_string().to_uppercase())
}

/// Lowercased text of a declared column; empty for placeholders.
pub(crate) fn lower_text(record: &Fields, sheet: &SheetDef, name: &str) -> String {
    field(record, sheet, name)
        .filter(|v| !v.is_placeholder())
        .map(|v| v.to_string().to_lowercase())
        .unwrap_or_default()
}

/// Add `approval_status` and `division` to a non-empty approval section and
/// return the status.
pub(crate) fn stamp_approval(output: &mut TemplateOutput, def: &TemplateDef, section: &str, division: &str) -> String {
    let Some(sheet) = def.sheets.iter().find(|s| s.section == section) else {
        return PENDING.to_string();
    };
    let Some(fields) = output.key_values_mut(section) else {
        return PENDING.to_string();
    };
    if fields.is_empty() {
        return PENDING.to_string();
    }
    let status = upper_text(fields, sheet, "status").unwrap_or_else(|| PENDING.to_string());
    fields.insert("approval_status", Scalar::from(status.as_str()));
    fields.insert("division", Scalar::from(division));
    status
}


#[cfg(test)]
mod tests {
    use super::test_support::sheet;
    use super::*;
    use crate::warnings::WarningSeverity;

    #[test]
    fn test_missing_sheets_give_empty_sections() {
        let sheets = vec![sheet("User Story", &[&["US ID", "I Want"], &["US-1", "pay"]])];
        let mut w = Warnings::new();
        let out = parse_for_kind(TemplateKind::Ba, &sheets, &ParseOptions::default(), &mut w).unwrap();

        let keys: Vec<&str> = out.sections.keys().collect();
        assert_eq!(
            keys,
            vec!["product_details", "user_stories", "acceptance_criteria", "business_values", "ba_approval"]
        );
        assert_eq!(out.key_values("business_values"), Some(&Fields::new()));
        assert!(out.table("acceptance_criteria").is_empty());
        assert_eq!(out.table("user_stories").len(), 1);

        let warned: Vec<&str> = w.iter().filter_map(|x| x.sheet.as_deref()).collect();
        assert_eq!(warned, vec!["Product Overview", "Acceptance Criteria", "Business Value", "BA Approval"]);
        assert!(w.iter().all(|x| x.severity == WarningSeverity::Warning));
        assert!(w.iter().next().unwrap().message.contains("identifying sheet"));
    }

    #[test]
    fn test_origins_track_source_rows() {
        let sheets = vec![sheet(
            "Design Assets",
            &[&["Design Assets"], &["Asset Name", "Asset Type"], &["Login", "Mockup"], &[], &["Home", "Wireframe"]],
        )];
        let mut w = Warnings::new();
        let out = parse_for_kind(TemplateKind::Uiux, &sheets, &ParseOptions::default(), &mut w).unwrap();
        let origin = out.origins.iter().find(|o| o.section == "design_assets").unwrap();
        assert_eq!(origin.header_row, Some(1));
        assert_eq!(origin.source_rows, vec![2, 4]);
    }

    #[test]
    fn test_category_defaults() {
        let mut w = Warnings::new();
        let out = parse_for_kind(TemplateKind::Ba, &[], &ParseOptions::default(), &mut w).unwrap();
        assert_eq!(out.category_name, "Uncategorized");
        let out = parse_for_kind(TemplateKind::Engineer, &[], &ParseOptions::default(), &mut w).unwrap();
        assert_eq!(out.category_name, "Engineering");
    }
}
