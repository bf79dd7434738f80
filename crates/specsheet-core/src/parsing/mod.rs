//! Turning raw sheet grids into key-value mappings and row-records.

pub mod header;
pub mod normalize;
pub mod values;

use crate::extraction::{CellValue, RawSheet};
use crate::model::{column_letters, Fields, Scalar};
use crate::templates::schema::{Coercion, SheetDef};
use crate::warnings::Warnings;
use header::{find_header_row, is_blank_row};
use normalize::canonical_key;
use values::{check_url, clean_scalar, parse_duration_days, parse_text_date};

/// Row-records of a tabular sheet together with where they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    /// Zero-based sheet row of the header, if one was found.
    pub header_row: Option<usize>,
    pub records: Vec<Fields>,
    /// Zero-based sheet row of each record, parallel to `records`.
    pub source_rows: Vec<usize>,
}

/// Read a key-value sheet into a flat mapping.
///
/// Recognized labels (and their aliases) map to the declared key; any other
/// label is kept under its canonical form. Header-like labels such as
/// "Field"/"Value" are skipped. A label that repeats overwrites the earlier
/// value but keeps its position.
pub fn parse_key_value(sheet: &RawSheet, def: &SheetDef, warnings: &mut Warnings) -> Fields {
    let skip: Vec<String> = def.skip_labels.iter().map(|l| canonical_key(l)).collect();
    let mut fields = Fields::new();

    for row in &sheet.rows {
        let label = match row.get(def.key_column).map(clean_scalar) {
            Some(label) if !label.is_placeholder() => label,
            _ => continue,
        };
        let canonical = canonical_key(&label.to_string());
        if canonical.is_empty() || skip.contains(&canonical) {
            continue;
        }

        let key = def
            .fields
            .iter()
            .find(|f| f.matches(&canonical))
            .map(|f| f.key.clone())
            .unwrap_or(canonical);
        let value = row
            .get(def.value_column)
            .map(clean_scalar)
            .unwrap_or_else(Scalar::placeholder);
        fields.insert(key, value);
    }

    apply_coercions(std::slice::from_mut(&mut fields), &[], def, &sheet.name, warnings);
    tracing::debug!(sheet = %sheet.name, fields = fields.len(), "parsed key-value sheet");
    fields
}

/// Read a tabular sheet into row-records.
///
/// Blank rows are dropped without disturbing the order of the others. Every
/// record carries the same keys: the canonical header text, `_2`/`_3`
/// suffixes for repeated headers, and `column_<letter>` for data under an
/// empty header cell.
pub fn parse_tabular(
    sheet: &RawSheet,
    def: &SheetDef,
    search_rows: usize,
    warnings: &mut Warnings,
) -> ParsedTable {
    let Some(header_row) = find_header_row(&sheet.rows, &def.columns, search_rows) else {
        return ParsedTable::default();
    };

    let data_rows: Vec<(usize, &Vec<CellValue>)> = sheet
        .rows
        .iter()
        .enumerate()
        .skip(header_row + 1)
        .filter(|(_, row)| !row.iter().map(clean_scalar).all(|v| v.is_placeholder()))
        .collect();

    let columns = header_columns(&sheet.rows[header_row], &data_rows);

    let mut table = ParsedTable {
        header_row: Some(header_row),
        ..ParsedTable::default()
    };
    for (idx, row) in data_rows {
        let record: Fields = columns
            .iter()
            .map(|(col, key)| {
                let value = row.get(*col).map(clean_scalar).unwrap_or_else(Scalar::placeholder);
                (key.clone(), value)
            })
            .collect();
        table.records.push(record);
        table.source_rows.push(idx);
    }

    apply_coercions(&mut table.records, &table.source_rows, def, &sheet.name, warnings);
    tracing::debug!(
        sheet = %sheet.name,
        header_row,
        records = table.records.len(),
        "parsed tabular sheet"
    );
    table
}

/// Column index and record key for every column that carries a header or data.
fn header_columns(header: &[CellValue], data_rows: &[(usize, &Vec<CellValue>)]) -> Vec<(usize, String)> {
    let width = data_rows
        .iter()
        .map(|(_, row)| row.len())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let mut columns: Vec<(usize, String)> = Vec::new();
    for col in 0..width {
        let label = header.get(col).map(clean_scalar).unwrap_or_else(Scalar::placeholder);
        let mut key = if label.is_placeholder() {
            String::new()
        } else {
            canonical_key(&label.to_string())
        };

        if key.is_empty() {
            let has_data = data_rows
                .iter()
                .any(|(_, row)| row.get(col).is_some_and(|c| !is_blank_row(std::slice::from_ref(c))));
            if !has_data {
                continue;
            }
            key = format!("column_{}", column_letters(col as u32).to_lowercase());
        }

        let base = key.clone();
        let mut n = 1;
        while columns.iter().any(|(_, k)| *k == key) {
            n += 1;
            key = format!("{base}_{n}");
        }
        columns.push((col, key));
    }
    columns
}

/// Apply the sheet's declared coercions to every record.
///
/// A coercion whose source column is absent is skipped. Derived keys never
/// replace a column the sheet itself provides under the same name.
fn apply_coercions(
    records: &mut [Fields],
    source_rows: &[usize],
    def: &SheetDef,
    sheet: &str,
    warnings: &mut Warnings,
) {
    for coercion in &def.coercions {
        let Some(column) = records
            .first()
            .and_then(|first| resolve_column(first, def, coercion.column()))
        else {
            continue;
        };

        for (i, record) in records.iter_mut().enumerate() {
            let at = source_rows
                .get(i)
                .map(|r| format!("row {}", r + 1))
                .unwrap_or_else(|| "field".to_string());
            let value = record
                .get(&column)
                .cloned()
                .unwrap_or_else(Scalar::placeholder);

            match coercion {
                Coercion::DurationDays { target, .. } => {
                    let days = coerce_duration(&value);
                    if days.is_none() && !value.is_placeholder() {
                        warnings.warn(
                            Some(sheet),
                            format!("{at}: could not read duration '{value}', kept as text"),
                        );
                    }
                    insert_derived(record, target, &column, days.map(Scalar::Int).unwrap_or(value));
                }
                Coercion::Url {
                    valid_key, id_key, ..
                } => {
                    let check = match value.as_str() {
                        Some(s) if !value.is_placeholder() => Some(check_url(s)),
                        _ => None,
                    };
                    let valid = check.as_ref().is_some_and(|c| c.valid);
                    if check.is_some() && !valid {
                        warnings.warn(Some(sheet), format!("{at}: malformed URL '{value}'"));
                    }
                    insert_derived(record, valid_key, &column, Scalar::Bool(valid));
                    if let Some(id_key) = id_key {
                        let id = check
                            .and_then(|c| c.identifier)
                            .map(Scalar::Text)
                            .unwrap_or_else(Scalar::placeholder);
                        insert_derived(record, id_key, &column, id);
                    }
                }
                Coercion::Date { .. } => {
                    let Some(text) = value.as_str() else {
                        continue;
                    };
                    if value.is_placeholder() {
                        continue;
                    }
                    match parse_text_date(text) {
                        Some(date) => {
                            record.insert(column.as_str(), Scalar::Text(date.format("%Y-%m-%d").to_string()));
                        }
                        None => warnings.warn(
                            Some(sheet),
                            format!("{at}: could not read date '{value}', kept as text"),
                        ),
                    }
                }
            }
        }
    }
}

fn insert_derived(record: &mut Fields, key: &str, source: &str, value: Scalar) {
    if key == source || !record.contains_key(key) {
        record.insert(key, value);
    }
}

fn coerce_duration(value: &Scalar) -> Option<i64> {
    match value {
        Scalar::Int(i) if *i >= 0 => Some(*i),
        Scalar::Float(f) if *f >= 0.0 => Some(f.round() as i64),
        Scalar::Text(s) => parse_duration_days(s),
        _ => None,
    }
}

/// Find the record key holding the declared column `name`.
///
/// Records are keyed by their header text, so a sheet that used an alias
/// ("User Story ID" for "US ID") is matched through the declared labels.
pub fn resolve_column(record: &Fields, def: &SheetDef, name: &str) -> Option<String> {
    if record.contains_key(name) {
        return Some(name.to_string());
    }
    let label = def
        .columns
        .iter()
        .chain(def.fields.iter())
        .find(|l| l.key == name)?;
    record
        .keys()
        .find(|k| label.matches(k))
        .map(str::to_string)
}

/// Value of the declared column `name` in one record.
pub fn field<'a>(record: &'a Fields, def: &SheetDef, name: &str) -> Option<&'a Scalar> {
    record
        .get(name)
        .or_else(|| resolve_column(record, def, name).and_then(|k| record.get(&k)))
}
