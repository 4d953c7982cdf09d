//! Unit extraction from column names.

/// Unit reported for columns without a bracketed unit.
pub const NO_UNITS: &str = "-";

/// Extract the unit from a column name such as `Temp (K)` or `Pressure [Pa]`.
///
/// Parentheses win over square brackets. The unit is the text between the
/// first opening and the first closing bracket of the chosen kind; names
/// without a complete pair yield [`NO_UNITS`].
///
/// When the first closing bracket comes before the first opening one
/// (`"a)b(c"`), the result is an empty string. This mirrors how datasets
/// already published with this convention were labelled, so it is kept.
///
/// ```
/// use mdfpack::metadata::extract_units;
///
/// assert_eq!(extract_units("Temp (K)"), "K");
/// assert_eq!(extract_units("Pressure [Pa]"), "Pa");
/// assert_eq!(extract_units("Yield"), "-");
/// ```
pub fn extract_units(name: &str) -> String {
    between(name, '(', ')')
        .or_else(|| between(name, '[', ']'))
        .unwrap_or(NO_UNITS)
        .to_string()
}

fn between(name: &str, open: char, close: char) -> Option<&str> {
    let start = name.find(open)? + open.len_utf8();
    let end = name.find(close)?;
    Some(name.get(start..end).unwrap_or(""))
}
