use specsheet_core::error::SpecsheetError;
use specsheet_core::templates::TemplateKind;
use std::path::PathBuf;

use crate::output;

pub fn run(input_file: PathBuf, template: Option<&str>, output_format: &str) -> Result<(), SpecsheetError> {
    let kind = template.map(str::parse::<TemplateKind>).transpose()?;
    let bytes = std::fs::read(&input_file)?;
    let reports = specsheet_core::validate_workbook(&bytes, kind)?;
    match output_format {
        "json" => println!("{}", output::json::to_string(&reports)?),
        _ => println!("{}", output::table::format_validation(&reports)),
    }
    Ok(())
}
