use serde::Serialize;
use specsheet_core::error::SpecsheetError;

pub fn to_string<T: Serialize>(value: &T) -> Result<String, SpecsheetError> {
    Ok(serde_json::to_string_pretty(value)?)
}
