use specsheet_core::error::SpecsheetError;
use std::path::PathBuf;

use crate::output;

pub fn run(input_file: PathBuf, min_score: f64, output_format: &str) -> Result<(), SpecsheetError> {
    let bytes = std::fs::read(&input_file)?;
    let detection = specsheet_core::detect_workbook(&bytes, min_score)?;
    match output_format {
        "json" => println!("{}", output::json::to_string(&detection)?),
        _ => println!("{}", output::table::format_detection(&detection)),
    }
    Ok(())
}
