use crate::extraction::CellValue;
use crate::parsing::normalize::canonical_key;
use crate::templates::schema::LabelDef;

/// Locate the header row of a tabular sheet.
///
/// The header is the first row whose non-empty cells are all text matching
/// one of the declared column labels (compared in canonical form, so case and
/// punctuation do not matter). The search covers `search_rows` rows starting
/// at the first non-empty row, so leading blank rows do not count. Decorative
/// rows above the header, such as a title banner, are skipped. If no row
/// qualifies, the first non-empty row is used. Returns None for a sheet with
/// no content.
pub fn find_header_row(
    rows: &[Vec<CellValue>],
    columns: &[LabelDef],
    search_rows: usize,
) -> Option<usize> {
    let first = rows.iter().position(|row| !is_blank_row(row))?;
    let declared = rows[first..]
        .iter()
        .take(search_rows)
        .position(|row| is_label_row(row, columns))
        .map(|offset| first + offset);

    Some(declared.unwrap_or(first))
}

fn is_label_row(row: &[CellValue], columns: &[LabelDef]) -> bool {
    let mut seen_any = false;
    for cell in row {
        match cell {
            CellValue::Empty => {}
            CellValue::Text(s) if s.trim().is_empty() => {}
            CellValue::Text(s) => {
                let key = canonical_key(s);
                if !columns.iter().any(|c| c.matches(&key)) {
                    return false;
                }
                seen_any = true;
            }
            _ => return false,
        }
    }
    seen_any
}

pub(crate) fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(|c| match c {
        CellValue::Empty => true,
        CellValue::Text(s) => s.trim().is_empty(),
        _ => false,
    })
}
