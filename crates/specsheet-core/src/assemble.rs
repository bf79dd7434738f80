//! Final assembly of a [`ParseResult`] from parser output and images.

use crate::classify::{classify, keywords::asset_type_category};
use crate::detect::DetectionResult;
use crate::model::{ExtractedImage, ParseResult, ParsedSection};
use crate::parsers::TemplateOutput;
use crate::parsing::field;
use crate::templates::schema::TemplateDef;
use crate::warnings::Warnings;

/// Combine sections, classified images and stats into the caller-facing result.
pub fn assemble(
    def: &TemplateDef,
    mut output: TemplateOutput,
    detection: DetectionResult,
    mut images: Vec<ExtractedImage>,
    filename: &str,
    warnings: Warnings,
) -> ParseResult {
    for image in &mut images {
        image.context = row_context(def, &output, image);
        image.category = classify(image, def);
        tracing::debug!(
            id = %image.id,
            sheet = %image.sheet_name,
            cell = %image.cell_reference,
            category = %image.category,
            "classified image"
        );
    }

    output.stats.set("total_images", images.len());
    output.stats.set("has_images", !images.is_empty());

    ParseResult {
        title: title(def, &output),
        description: format!("Imported from {filename} ({} template)", def.kind),
        category_name: output.category_name,
        template_kind: def.kind,
        approval_status: output.approval_status,
        detection,
        sections: output.sections,
        images,
        parsing_stats: output.stats,
        warnings: warnings.into_vec(),
    }
}

/// First non-placeholder title field, looked up in the primary section and
/// then in any other key-value section.
fn title(def: &TemplateDef, output: &TemplateOutput) -> String {
    let primary = def
        .sheet(&def.primary_sheet)
        .and_then(|s| output.key_values(&s.section));
    let others = output
        .sections
        .iter()
        .filter_map(|(_, section)| section.as_key_value());

    let sections: Vec<_> = primary.into_iter().chain(others).collect();
    def.title_fields
        .iter()
        .find_map(|name| {
            sections
                .iter()
                .find_map(|fields| fields.get(name).filter(|v| !v.is_placeholder()))
        })
        .map(|v| v.to_string())
        .unwrap_or_else(|| def.default_title.clone())
}

/// Asset type declared on the data row nearest the image's anchor.
///
/// Only sheets that declare asset-type columns carry context. Anchors on or
/// above the header row have none.
fn row_context(def: &TemplateDef, output: &TemplateOutput, image: &ExtractedImage) -> Option<String> {
    let sheet = def.sheet(&image.sheet_name)?;
    if sheet.asset_type_columns.is_empty() {
        return None;
    }
    let origin = output.origins.iter().find(|o| o.sheet == image.sheet_name)?;
    let anchor_row = image.anchor.row as usize;
    if origin.header_row.is_some_and(|h| anchor_row <= h) {
        return None;
    }

    let idx = nearest_row(&origin.source_rows, anchor_row)?;
    let record = match output.sections.get(&origin.section)? {
        ParsedSection::Table(rows) => rows.get(idx)?,
        ParsedSection::KeyValue(_) => return None,
    };

    let values: Vec<String> = sheet
        .asset_type_columns
        .iter()
        .filter_map(|col| field(record, sheet, col))
        .filter(|v| !v.is_placeholder())
        .map(|v| v.to_string())
        .collect();
    values
        .iter()
        .find(|v| asset_type_category(v).is_some())
        .or_else(|| values.first())
        .cloned()
}

/// Index of the row nearest `target`: an exact match, else the smallest
/// distance, with ties going to the row above.
pub fn nearest_row(rows: &[usize], target: usize) -> Option<usize> {
    rows.iter()
        .enumerate()
        .min_by_key(|(_, &row)| (row.abs_diff(target), row > target))
        .map(|(idx, _)| idx)
}
