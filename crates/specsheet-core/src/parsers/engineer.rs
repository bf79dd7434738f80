//! Engineering plans: project info, stack, estimate, architecture, infrastructure, approval.

use crate::model::{Fields, ParsedSection, Scalar};
use crate::parsers::{lower_text, stamp_approval, upper_text, TemplateOutput};
use crate::parsing::normalize::canonical_key;
use crate::templates::schema::{SheetDef, TemplateDef};

const DIAGRAM_TYPES: [&str; 5] = ["PNG", "JPG", "JPEG", "SVG", "PDF"];
const DOCUMENT_TYPES: [&str; 4] = ["PDF", "DOC", "DOCX", "TXT"];
const TECH_SPEC_KEYWORDS: [&str; 5] = ["architecture", "schema", "api", "technical", "specification"];

pub(crate) fn enrich(def: &TemplateDef, output: &mut TemplateOutput) {
    if let (Some(sheet), Some(stack)) = (def.sheet("Tech Stack"), output.table_mut("tech_stack")) {
        for tech in stack.iter_mut() {
            let layer = lower_text(tech, sheet, "layer");
            tech.insert("layer_category", Scalar::from(layer_category(&layer)));
        }
    }

    if let (Some(sheet), Some(docs)) = (
        def.sheet("Architecture Documents"),
        output.table_mut("architecture_documents"),
    ) {
        for doc in docs.iter_mut() {
            flag_document(doc, sheet);
        }
    }

    output.approval_status = stamp_approval(output, def, "approval", "ENGINEERING");

    let total_dev_days: i64 = output
        .table("development_estimate")
        .iter()
        .filter_map(|r| r.get("duration_days").and_then(Scalar::as_i64))
        .sum();
    let total_stack = output.section_len("tech_stack");
    let total_phases = output.section_len("development_estimate");
    let total_docs = output.section_len("architecture_documents");
    let has_infrastructure = output.section_len("infrastructure") > 0;
    let has_approval = output.section_len("approval") > 0;

    let metrics: Fields = [
        ("total_development_days", Scalar::Int(total_dev_days)),
        ("total_phases", Scalar::from(total_phases)),
        ("technologies_count", Scalar::from(total_stack)),
        ("architecture_docs_count", Scalar::from(total_docs)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    output
        .sections
        .insert("engineering_metrics", ParsedSection::KeyValue(metrics));

    let stats = &mut output.stats;
    stats.set("total_tech_stack", total_stack);
    stats.set("total_dev_phases", total_phases);
    stats.set("total_arch_docs", total_docs);
    stats.set("total_images", 0usize);
    stats.set("total_dev_days", total_dev_days);
    stats.set("has_tech_stack", total_stack > 0);
    stats.set("has_dev_estimate", total_phases > 0);
    stats.set("has_architecture_docs", total_docs > 0);
    stats.set("has_infrastructure", has_infrastructure);
    stats.set("has_approval", has_approval);
    stats.set("has_images", false);
    stats.set("architecture_diagrams", total_docs > 0);
    stats.set("technical_specifications", total_stack > 0);
    stats.set("template_type", def.kind.as_str());
}

/// Broad category of a tech-stack layer name.
///
/// Short tokens ("ui", "api", "qa", "db") must be whole words so that
/// "Build tooling" is not read as front end.
pub fn layer_category(layer: &str) -> &'static str {
    let key = canonical_key(layer);
    let words: Vec<&str> = key.split('_').collect();
    let has = |long: &[&str], short: &[&str]| {
        long.iter().any(|l| key.contains(*l)) || short.iter().any(|s| words.contains(s))
    };

    if has(&["frontend", "front_end"], &["ui", "web", "mobile", "client"]) {
        "frontend"
    } else if has(&["backend", "back_end"], &["api", "server", "service", "services"]) {
        "backend"
    } else if has(&["database"], &["data", "db", "storage"]) {
        "database"
    } else if has(&["infrastructure", "devops"], &["infra", "cloud", "ci", "cd", "hosting"]) {
        "infrastructure"
    } else if has(&["testing"], &["test", "tests", "qa"]) {
        "testing"
    } else {
        "other"
    }
}

/// Add `is_diagram`, `is_document` and `is_technical_spec` to an architecture document.
fn flag_document(doc: &mut Fields, sheet: &SheetDef) {
    let doc_type = upper_text(doc, sheet, "type").unwrap_or_default();
    let doc_type = doc_type.trim_start_matches('.');
    let name = lower_text(doc, sheet, "document_name");

    doc.insert("is_diagram", Scalar::Bool(DIAGRAM_TYPES.contains(&doc_type)));
    doc.insert("is_document", Scalar::Bool(DOCUMENT_TYPES.contains(&doc_type)));
    doc.insert(
        "is_technical_spec",
        Scalar::Bool(TECH_SPEC_KEYWORDS.iter().any(|k| name.contains(*k))),
    );
}
