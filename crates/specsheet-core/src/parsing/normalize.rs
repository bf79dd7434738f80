/// Normalize a raw header or label to its canonical key.
///
/// Steps:
/// 1. Lowercase
/// 2. Replace every run of non-alphanumeric characters with one underscore
/// 3. Strip leading and trailing underscores
///
/// The result is idempotent: `canonical_key(canonical_key(x)) == canonical_key(x)`.
pub fn canonical_key(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut prev_underscore = true; // start true to skip leading underscores
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            result.push(c);
            prev_underscore = false;
        } else if !prev_underscore {
            result.push('_');
            prev_underscore = true;
        }
    }
    if result.ends_with('_') {
        result.pop();
    }
    result
}

/// Trim surrounding whitespace and collapse internal whitespace runs to one space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
