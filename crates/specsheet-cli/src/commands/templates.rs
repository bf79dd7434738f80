use specsheet_core::error::SpecsheetError;
use specsheet_core::templates::{definition, definitions, TemplateKind};

use crate::output;

pub fn list() -> Result<(), SpecsheetError> {
    for def in definitions()? {
        println!(
            "  {:<9} {:<32} {} sheet(s)",
            def.kind.as_str(),
            def.name,
            def.sheets.len()
        );
    }
    Ok(())
}

pub fn explain(kind: &str) -> Result<(), SpecsheetError> {
    let kind: TemplateKind = kind.parse()?;
    print!("{}", output::table::format_template(definition(kind)?));
    Ok(())
}
