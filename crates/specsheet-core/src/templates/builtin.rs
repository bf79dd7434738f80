use std::sync::LazyLock;

use crate::error::SpecsheetError;
use crate::templates::schema::TemplateDef;
use crate::templates::{validate_definition, TemplateKind};

const BA_JSON: &str = include_str!("../../../../templates/ba.json");
const UIUX_JSON: &str = include_str!("../../../../templates/uiux.json");
const ENGINEER_JSON: &str = include_str!("../../../../templates/engineer.json");

/// Built-in definitions, parsed and validated once per process.
static DEFINITIONS: LazyLock<Result<Vec<TemplateDef>, String>> = LazyLock::new(|| {
    [
        (TemplateKind::Ba, BA_JSON),
        (TemplateKind::Uiux, UIUX_JSON),
        (TemplateKind::Engineer, ENGINEER_JSON),
    ]
    .into_iter()
    .map(|(kind, json)| load(kind, json).map_err(|e| e.to_string()))
    .collect()
});

fn load(kind: TemplateKind, json: &str) -> Result<TemplateDef, SpecsheetError> {
    let def: TemplateDef = serde_json::from_str(json)?;
    if def.kind != kind {
        return Err(SpecsheetError::TemplateDefinition(format!(
            "definition for {kind} declares kind {}",
            def.kind
        )));
    }
    validate_definition(&def)?;
    Ok(def)
}

/// All built-in template definitions, in priority order.
pub fn definitions() -> Result<&'static [TemplateDef], SpecsheetError> {
    DEFINITIONS
        .as_ref()
        .map(Vec::as_slice)
        .map_err(|e| SpecsheetError::TemplateDefinition(e.clone()))
}

/// The built-in definition for one template kind.
pub fn definition(kind: TemplateKind) -> Result<&'static TemplateDef, SpecsheetError> {
    definitions()?
        .iter()
        .find(|d| d.kind == kind)
        .ok_or_else(|| SpecsheetError::TemplateDefinition(format!("no definition for {kind}")))
}
