use std::io::Cursor;

use calamine::{Data, DataType, Range, Reader, Xlsx};

use crate::error::SpecsheetError;
use crate::extraction::{CellValue, RawSheet};
use crate::warnings::Warnings;

/// Read every worksheet's cell grid, in workbook order.
pub(crate) fn read_sheets(bytes: &[u8], warnings: &mut Warnings) -> Result<Vec<RawSheet>, SpecsheetError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| SpecsheetError::MalformedWorkbook(format!("failed to open xlsx: {e}")))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let rows = match workbook.worksheet_range(&name) {
            Ok(range) => grid(&range),
            Err(e) => {
                warnings.warn(Some(&name), format!("sheet could not be read: {e}"));
                Vec::new()
            }
        };
        tracing::debug!(sheet = %name, rows = rows.len(), "read sheet");
        sheets.push(RawSheet { name, rows });
    }
    Ok(sheets)
}

/// Expand a used range into a grid anchored at A1.
fn grid(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<CellValue>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells: Vec<CellValue> = (0..start_col).map(|_| CellValue::Empty).collect();
        cells.extend(row.iter().map(cell_value));
        while matches!(cells.last(), Some(CellValue::Empty)) {
            cells.pop();
        }
        rows.push(cells);
    }

    while matches!(rows.last(), Some(r) if r.is_empty()) {
        rows.pop();
    }
    rows
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(cell.to_string())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
