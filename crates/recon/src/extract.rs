/// Derive the canonical stock code from a display label.
///
/// The code is the first whitespace-delimited token. Absent or blank input
/// yields an empty string; this never fails.
pub fn extract_stock_code(raw: Option<&str>) -> String {
    raw.and_then(|s| s.split_whitespace().next())
        .map(|token| token.trim().to_string())
        .unwrap_or_default()
}
