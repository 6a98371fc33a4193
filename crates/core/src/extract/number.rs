/// Parses a locale-formatted number such as `1 234,56`, `+1,20%` or `744.90`.
///
/// Space-like thousands separators and percent signs are dropped and a decimal comma is
/// read as a decimal point. Returns `None` for empty text, `NaN`, infinities and anything
/// else that is not a finite number.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !is_grouping_space(*c) && *c != '%')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn is_grouping_space(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{00A0}' | '\u{202F}' | '\u{2007}')
}
