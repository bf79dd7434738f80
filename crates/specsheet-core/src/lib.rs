pub mod assemble;
pub mod classify;
pub mod detect;
pub mod error;
pub mod extraction;
pub mod model;
pub mod options;
pub mod parsers;
pub mod parsing;
pub mod storage;
pub mod templates;
pub mod warnings;

use detect::{DetectionResult, ValidationReport};
use error::SpecsheetError;
use model::ParseResult;
use options::ParseOptions;
use templates::TemplateKind;
use warnings::Warnings;

/// Main API entry point: parse workbook bytes into a structured document.
///
/// The template is detected from sheet names unless `options.template`
/// names one. Only an unreadable workbook, an unknown template token or
/// broken built-in template tables are errors; everything else is
/// recorded in `ParseResult::warnings`.
pub fn parse_workbook(
    bytes: &[u8],
    filename: &str,
    options: &ParseOptions,
) -> Result<ParseResult, SpecsheetError> {
    let workbook = extraction::extract_workbook(bytes, options.extract_images)?;
    let mut warnings = Warnings::new();
    warnings.extend(workbook.warnings);

    let sheet_names = workbook
        .sheets
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>();
    let detection = detect::resolve(
        &sheet_names,
        options.template.as_deref(),
        options.min_detection_score,
    )?;
    if detection.low_confidence {
        warnings.info(
            None,
            format!(
                "no template matched the sheet names; parsing as {}",
                detection.kind
            ),
        );
    }

    let def = templates::definition(detection.kind)?;
    let output = parsers::parse_for_kind(detection.kind, &workbook.sheets, options, &mut warnings)?;
    let result = assemble::assemble(def, output, detection, workbook.images, filename, warnings);

    tracing::info!(
        file = filename,
        kind = %result.template_kind,
        images = result.images.len(),
        warnings = result.warnings.len(),
        "parsed workbook"
    );
    Ok(result)
}

/// Detect the template of a workbook without parsing its contents.
pub fn detect_workbook(bytes: &[u8], min_score: f64) -> Result<DetectionResult, SpecsheetError> {
    let workbook = extraction::extract_workbook(bytes, false)?;
    Ok(detect::detect(&workbook.sheet_names(), min_score))
}

/// Check a workbook against one template, or against all of them.
pub fn validate_workbook(
    bytes: &[u8],
    kind: Option<TemplateKind>,
) -> Result<Vec<ValidationReport>, SpecsheetError> {
    let workbook = extraction::extract_workbook(bytes, false)?;
    let names = workbook.sheet_names();
    Ok(match kind {
        Some(kind) => vec![detect::validate(&names, kind)],
        None => detect::validate_all(&names),
    })
}
