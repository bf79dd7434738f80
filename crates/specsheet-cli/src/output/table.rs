use specsheet_core::detect::{DetectionResult, ValidationReport};
use specsheet_core::model::{Fields, ParseResult, ParsedSection, Scalar};
use specsheet_core::templates::schema::{SheetShape, TemplateDef};
use specsheet_core::templates::TemplateKind;
use specsheet_core::warnings::WarningSeverity;
use std::fmt::Write;

pub fn format_parsed(result: &ParseResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===\n", result.title);
    let _ = writeln!(out, "  Template:  {}", result.template_kind);
    let _ = writeln!(out, "  Category:  {}", result.category_name);
    let _ = writeln!(out, "  Approval:  {}", result.approval_status);
    let _ = writeln!(out, "  {}\n", result.description);

    for (name, section) in result.sections.iter() {
        match section {
            ParsedSection::KeyValue(fields) => {
                let _ = writeln!(out, "  [{name}]");
                write_fields(&mut out, fields, "    ");
            }
            ParsedSection::Table(rows) => {
                let _ = writeln!(out, "  [{name}] {} row(s)", rows.len());
                for (i, row) in rows.iter().enumerate() {
                    let _ = writeln!(out, "    #{}", i + 1);
                    write_fields(&mut out, row, "      ");
                }
            }
        }
        out.push('\n');
    }

    if !result.images.is_empty() {
        let _ = writeln!(out, "  Images:");
        for img in &result.images {
            let dims = match (img.width, img.height) {
                (Some(w), Some(h)) => format!("{w}x{h}"),
                _ => "?".to_string(),
            };
            let location = img.storage_ref.as_deref().unwrap_or(&img.file_name);
            let _ = writeln!(
                out,
                "    {}!{:<6} {:<10} {:<10} {}  {}",
                img.sheet_name, img.cell_reference, img.category, img.mime_type, dims, location
            );
        }
        out.push('\n');
    }

    let _ = writeln!(out, "  Stats:");
    for (name, value) in result.parsing_stats.iter() {
        let _ = writeln!(out, "    {name}: {value}");
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\n  Warnings:");
        for w in &result.warnings {
            let marker = match w.severity {
                WarningSeverity::Info => "info",
                WarningSeverity::Warning => "warn",
            };
            let _ = writeln!(out, "    {marker}: {w}");
        }
    }
    out
}

fn write_fields(out: &mut String, fields: &Fields, indent: &str) {
    let width = fields.keys().map(str::len).max().unwrap_or(0);
    for (key, value) in fields.iter() {
        let _ = writeln!(out, "{indent}{key:<width$}  {}", display(value));
    }
}

fn display(value: &Scalar) -> String {
    match value {
        // Multi-line cells are flattened for the table view
        Scalar::Text(s) => s.replace('\n', " / "),
        other => other.to_string(),
    }
}

pub fn format_detection(detection: &DetectionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Detected: {}", detection.kind);
    if detection.low_confidence {
        let _ = writeln!(out, "  (low confidence: no template scored above the minimum)");
    }
    out.push('\n');
    for kind in TemplateKind::ALL {
        let matched = detection.matched.get(&kind).copied().unwrap_or(0);
        let _ = writeln!(
            out,
            "  {:<9} {:.2}  ({}/{} sheets)",
            kind.as_str(),
            detection.score(kind),
            matched,
            kind.expected_sheets().len()
        );
    }
    out
}

pub fn format_validation(reports: &[ValidationReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let status = if report.valid { "valid" } else { "invalid" };
        let _ = writeln!(
            out,
            "  {:<9} {:<7} score {:.2}",
            report.kind.as_str(),
            status,
            report.score
        );
        if !report.missing_sheets.is_empty() {
            let _ = writeln!(out, "    missing: {}", report.missing_sheets.join(", "));
        }
    }
    out
}

pub fn format_template(def: &TemplateDef) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ({}) ===\n", def.name, def.kind);
    if let Some(desc) = &def.description {
        let _ = writeln!(out, "  {desc}\n");
    }
    for sheet in &def.sheets {
        let primary = if sheet.name == def.primary_sheet { " (identifying)" } else { "" };
        match sheet.shape {
            SheetShape::KeyValue => {
                let _ = writeln!(out, "  {} -> {}: key-value{primary}", sheet.name, sheet.section);
                for f in &sheet.fields {
                    let _ = writeln!(out, "    {} -> {}", f.label, f.key);
                }
            }
            SheetShape::Tabular => {
                let _ = writeln!(out, "  {} -> {}: table{primary}", sheet.name, sheet.section);
                let cols: Vec<&str> = sheet.columns.iter().map(|c| c.label.as_str()).collect();
                let _ = writeln!(out, "    columns: {}", cols.join(", "));
            }
        }
        if let Some(category) = sheet.image_category {
            let _ = writeln!(out, "    images: {category}");
        }
    }
    out
}
