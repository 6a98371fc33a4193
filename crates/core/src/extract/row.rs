use std::collections::HashSet;

/// How many leading tokens of a row may carry the ticker code.
pub const CODE_SCAN_TOKENS: usize = 6;

/// Returns the tracked page code a table row belongs to, if any.
///
/// Cells are split on whitespace into uppercase tokens. The first token is checked first,
/// then the first [`CODE_SCAN_TOKENS`] tokens in order. Only whole tokens match: a short
/// ticker that merely appears inside a longer instrument name is not a hit.
pub fn classify_row<S: AsRef<str>>(cells: &[S], target_codes: &HashSet<String>) -> Option<String> {
    let tokens: Vec<String> = cells
        .iter()
        .flat_map(|cell| cell.as_ref().split_whitespace())
        .map(str::to_uppercase)
        .take(CODE_SCAN_TOKENS)
        .collect();

    let first = tokens.first()?;
    if target_codes.contains(first) {
        return Some(first.clone());
    }

    tokens.into_iter().find(|t| target_codes.contains(t))
}
