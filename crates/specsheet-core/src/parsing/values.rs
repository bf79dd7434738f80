use chrono::{NaiveDate, NaiveDateTime};
use url::Url;

use crate::extraction::CellValue;
use crate::model::Scalar;
use crate::parsing::normalize::collapse_whitespace;

/// Clean a raw cell value into its output form.
///
/// - empty, whitespace-only and NaN-like values -> placeholder `"-"`
/// - text -> trimmed, internal whitespace collapsed
/// - dates -> `YYYY-MM-DD`
/// - whole floats -> integers (Excel stores every number as a float)
/// - other numbers and booleans pass through
pub fn clean_scalar(value: &CellValue) -> Scalar {
    match value {
        CellValue::Empty => Scalar::placeholder(),
        CellValue::Text(s) => {
            let collapsed = collapse_whitespace(s);
            if collapsed.is_empty() || is_nan_like(&collapsed) {
                Scalar::placeholder()
            } else {
                Scalar::Text(collapsed)
            }
        }
        CellValue::Int(i) => Scalar::Int(*i),
        CellValue::Float(f) => clean_float(*f),
        CellValue::Bool(b) => Scalar::Bool(*b),
        CellValue::Date(dt) => Scalar::Text(dt.format("%Y-%m-%d").to_string()),
    }
}

fn clean_float(f: f64) -> Scalar {
    if !f.is_finite() {
        return Scalar::placeholder();
    }
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        Scalar::Int(f as i64)
    } else {
        Scalar::Float(f)
    }
}

/// True for textual spellings of "no value" that spreadsheets commonly carry.
pub fn is_nan_like(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "nan" | "none" | "null" | "n/a" | "#n/a" | "na" | "nat"
    )
}

/// Parse a duration such as "3 weeks", "10 days", "2 months" or "5" into days.
///
/// Weeks count 7 days, months 30. A bare number is taken as days.
/// Returns None if no number is present or the unit is unrecognized.
pub fn parse_duration_days(s: &str) -> Option<i64> {
    let lower = s.trim().to_lowercase();
    let (number, rest) = split_leading_number(&lower)?;
    let unit = rest.trim();

    let multiplier = if unit.is_empty() || unit.starts_with('d') {
        1.0
    } else if unit.starts_with('w') {
        7.0
    } else if unit.starts_with("mo") {
        30.0
    } else {
        return None;
    };

    let days = (number * multiplier).round();
    if days.is_finite() && days >= 0.0 {
        Some(days as i64)
    } else {
        None
    }
}

/// Find the first number in `s`; return it and the text following it.
///
/// Commas followed by exactly three digits group thousands ("1,000");
/// any other comma is a decimal separator ("1,5").
fn split_leading_number(s: &str) -> Option<(f64, &str)> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let tail = &s[start..];
    let end = tail
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(tail.len());
    let digits = tail[..end].trim_end_matches(['.', ',']);
    let normalized = if has_thousands_groups(digits) {
        digits.replace(',', "")
    } else {
        digits.replace(',', ".")
    };
    let number: f64 = normalized.parse().ok()?;
    Some((number, &tail[end..]))
}

fn has_thousands_groups(digits: &str) -> bool {
    let integer = digits.split('.').next().unwrap_or(digits);
    let mut groups = integer.split(',');
    let lead = groups.next().unwrap_or("");
    let rest: Vec<&str> = groups.collect();
    !rest.is_empty()
        && (1..=3).contains(&lead.len())
        && rest.iter().all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Outcome of validating a URL cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCheck {
    pub valid: bool,
    /// File or document identifier for recognized URL patterns.
    pub identifier: Option<String>,
}

/// Validate a URL and extract an identifier when it matches a known pattern.
///
/// Valid means an absolute http(s) URL with a host. Figma URLs of the form
/// `figma.com/{file,design,proto,board}/<id>/...` yield `<id>`.
pub fn check_url(s: &str) -> UrlCheck {
    let parsed = match Url::parse(s.trim()) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => u,
        _ => {
            return UrlCheck {
                valid: false,
                identifier: None,
            }
        }
    };

    UrlCheck {
        valid: true,
        identifier: figma_file_id(&parsed),
    }
}

fn figma_file_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    if host != "figma.com" && !host.ends_with(".figma.com") {
        return None;
    }
    let mut segments = url.path_segments()?;
    let kind = segments.next()?;
    if !matches!(kind, "file" | "design" | "proto" | "board") {
        return None;
    }
    segments
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%B %d, %Y", "%b %d, %Y",
    "%d %B %Y", "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a textual date in one of the common spreadsheet spellings.
pub fn parse_text_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}
