//! Template detection from sheet names alone.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::error::SpecsheetError;
use crate::templates::TemplateKind;

/// Outcome of scoring a workbook's sheet names against every template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub kind: TemplateKind,
    /// Fraction of each template's expected sheets that are present.
    pub scores: BTreeMap<TemplateKind, f64>,
    /// Number of each template's expected sheets that are present.
    pub matched: BTreeMap<TemplateKind, usize>,
    /// No template scored above the threshold; `kind` is the BA fallback.
    pub low_confidence: bool,
    /// `kind` was given by the caller rather than chosen by score.
    pub overridden: bool,
}

impl DetectionResult {
    pub fn score(&self, kind: TemplateKind) -> f64 {
        self.scores.get(&kind).copied().unwrap_or(0.0)
    }
}

fn name_set<S: AsRef<str>>(sheet_names: &[S]) -> HashSet<&str> {
    sheet_names.iter().map(|s| s.as_ref()).collect()
}

fn matched_count(present: &HashSet<&str>, kind: TemplateKind) -> usize {
    kind.expected_sheets()
        .iter()
        .filter(|s| present.contains(*s))
        .count()
}

/// Pick the template whose expected sheets best cover `sheet_names`.
///
/// The highest score wins; ties go to the earlier of BA, UIUX, ENGINEER.
/// When the best score does not exceed `min_score`, BA is returned with
/// `low_confidence` set.
pub fn detect<S: AsRef<str>>(sheet_names: &[S], min_score: f64) -> DetectionResult {
    let present = name_set(sheet_names);

    let mut scores = BTreeMap::new();
    let mut matched = BTreeMap::new();
    let mut best: Option<(TemplateKind, f64)> = None;

    for kind in TemplateKind::ALL {
        let hits = matched_count(&present, kind);
        let score = hits as f64 / kind.expected_sheets().len() as f64;
        scores.insert(kind, score);
        matched.insert(kind, hits);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((kind, score)),
        }
    }

    let (kind, low_confidence) = match best {
        Some((kind, score)) if score > min_score => (kind, false),
        _ => (TemplateKind::Ba, true),
    };

    tracing::info!(kind = %kind, low_confidence, "detected template");
    DetectionResult {
        kind,
        scores,
        matched,
        low_confidence,
        overridden: false,
    }
}

/// Detect the template, or use the caller's explicit choice.
///
/// An override must be one of the exact tokens "BA", "UIUX", "ENGINEER".
/// Scores are still reported alongside it.
pub fn resolve<S: AsRef<str>>(
    sheet_names: &[S],
    template_override: Option<&str>,
    min_score: f64,
) -> Result<DetectionResult, SpecsheetError> {
    let mut result = detect(sheet_names, min_score);
    if let Some(token) = template_override {
        let kind: TemplateKind = token.parse()?;
        tracing::info!(kind = %kind, "template given explicitly");
        result.kind = kind;
        result.low_confidence = false;
        result.overridden = true;
    }
    Ok(result)
}

/// How well a workbook fits one template, without parsing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub kind: TemplateKind,
    /// At least half of the expected sheets are present.
    pub valid: bool,
    /// Every sheet in the workbook, in workbook order.
    pub sheets_found: Vec<String>,
    pub expected_sheets: Vec<String>,
    pub missing_sheets: Vec<String>,
    pub score: f64,
}

pub fn validate<S: AsRef<str>>(sheet_names: &[S], kind: TemplateKind) -> ValidationReport {
    let present = name_set(sheet_names);
    let expected = kind.expected_sheets();
    let hits = matched_count(&present, kind);

    ValidationReport {
        kind,
        valid: hits * 2 >= expected.len(),
        sheets_found: sheet_names.iter().map(|s| s.as_ref().to_string()).collect(),
        expected_sheets: expected.iter().map(|s| s.to_string()).collect(),
        missing_sheets: expected
            .iter()
            .filter(|s| !present.contains(*s))
            .map(|s| s.to_string())
            .collect(),
        score: hits as f64 / expected.len() as f64,
    }
}

/// Validation against every template, in priority order.
pub fn validate_all<S: AsRef<str>>(sheet_names: &[S]) -> Vec<ValidationReport> {
    TemplateKind::ALL
        .iter()
        .map(|kind| validate(sheet_names, *kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UIUX_SHEETS: [&str; 5] = [
        "Design Overview",
        "Figma Links",
        "Design Assets",
        "Design Decisions",
        "Approval",
    ];

    #[test]
    fn test_detect_uiux_full_match() {
        let result = detect(&UIUX_SHEETS, 0.0);
        assert_eq!(result.kind, TemplateKind::Uiux);
        assert_eq!(result.score(TemplateKind::Uiux), 1.0);
        assert!(!result.low_confidence);
        // "Approval" is shared with ENGINEER
        assert_eq!(result.matched[&TemplateKind::Engineer], 1);
    }

    #[test]
    fn test_detect_is_deterministic() {
        let a = detect(&UIUX_SHEETS, 0.0);
        let b = detect(&UIUX_SHEETS, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_detect_order_independent() {
        let mut reversed = UIUX_SHEETS;
        reversed.reverse();
        assert_eq!(detect(&reversed, 0.0), detect(&UIUX_SHEETS, 0.0));
    }

    #[test]
    fn test_detect_fallback_low_confidence() {
        let result = detect(&["Random Sheet"], 0.0);
        assert_eq!(result.kind, TemplateKind::Ba);
        assert_eq!(result.score(TemplateKind::Ba), 0.0);
        assert!(result.low_confidence);
    }

    #[test]
    fn test_detect_empty_workbook() {
        let none: [&str; 0] = [];
        let result = detect(&none, 0.0);
        assert_eq!(result.kind, TemplateKind::Ba);
        assert!(result.low_confidence);
    }

    #[test]
    fn test_tie_prefers_ba_then_uiux() {
        // 1/5 BA, 1/5 UIUX
        let result = detect(&["Product Overview", "Design Overview"], 0.0);
        assert_eq!(result.kind, TemplateKind::Ba);

        // 1/5 UIUX vs 1/6 ENGINEER: UIUX wins on score
        let result = detect(&["Approval"], 0.0);
        assert_eq!(result.kind, TemplateKind::Uiux);
    }

    #[test]
    fn test_threshold_forces_fallback() {
        let result = detect(&["Tech Stack", "Infrastructure"], 0.5);
        assert_eq!(result.kind, TemplateKind::Ba);
        assert!(result.low_confidence);

        let result = detect(&["Tech Stack", "Infrastructure"], 0.0);
        assert_eq!(result.kind, TemplateKind::Engineer);
    }

    #[test]
    fn test_sheet_names_are_exact() {
        let result = detect(&["design overview", "FIGMA LINKS"], 0.0);
        assert!(result.low_confidence);
    }

    #[test]
    fn test_resolve_override_bypasses_scoring() {
        let result = resolve(&UIUX_SHEETS, Some("ENGINEER"), 0.0).unwrap();
        assert_eq!(result.kind, TemplateKind::Engineer);
        assert!(result.overridden);
        assert_eq!(result.score(TemplateKind::Uiux), 1.0);
    }

    #[test]
    fn test_resolve_rejects_unknown_token() {
        let err = resolve(&UIUX_SHEETS, Some("uiux"), 0.0).unwrap_err();
        assert!(matches!(err, SpecsheetError::UnknownTemplate(t) if t == "uiux"));
    }

    #[test]
    fn test_validate_half_threshold() {
        let report = validate(&["Project Info", "Tech Stack", "Approval"], TemplateKind::Engineer);
        assert!(report.valid);
        assert_eq!(report.missing_sheets.len(), 3);
        assert_eq!(report.score, 0.5);

        let report = validate(&["Product Overview", "User Story"], TemplateKind::Ba);
        assert!(!report.valid);
        assert_eq!(report.sheets_found, vec!["Product Overview", "User Story"]);
    }

    #[test]
    fn test_validate_all_covers_every_kind() {
        let reports = validate_all(&UIUX_SHEETS);
        let kinds: Vec<TemplateKind> = reports.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, TemplateKind::ALL.to_vec());
        assert!(reports[1].valid);
        assert!(!reports[0].valid);
    }

    #[test]
    fn test_scores_serialize_with_tokens() {
        let result = detect(&UIUX_SHEETS, 0.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "UIUX");
        assert_eq!(json["scores"]["UIUX"], 1.0);
    }
}
