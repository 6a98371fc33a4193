use super::number::parse_number;
use regex::Regex;
use std::sync::LazyLock;

/// Space-grouped thousands (`1 200 000`, `12 345,60`) first, then plain numbers (`744,90`,
/// `+1.2`). Alternation is leftmost-first, so a grouped number is never split in two.
static NUMERIC_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "[-+]?[0-9]{1,3}(?:[ \u{00A0}\u{202F}][0-9]{3})+(?:[.,][0-9]+)?|[-+]?[0-9]+(?:[.,][0-9]+)?",
    )
    .expect("numeric token pattern is valid")
});

/// Magnitude rules used to tell the last price from the percent change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionThresholds {
    /// The last price must be strictly greater than this.
    pub min_price_exclusive: f64,
    /// A percent change lies in `[-percent_band, percent_band]`.
    pub percent_band: f64,
}

impl Default for ExtractionThresholds {
    fn default() -> Self {
        Self {
            min_price_exclusive: 0.0,
            percent_band: 50.0,
        }
    }
}

/// Reads `(last_price, percent_change)` out of a row's rendered text with the default
/// thresholds. See [`extract_quote_with`].
pub fn extract_quote(row_text: &str) -> (Option<f64>, Option<f64>) {
    extract_quote_with(row_text, &ExtractionThresholds::default())
}

/// Picks the first strictly positive number as the last price and the first number inside
/// the percent band that differs from it as the percent change.
///
/// This is a layout heuristic. A row that lists a small unrelated figure (a ticker with
/// digits removed, a time of day) before the price will be misread.
pub fn extract_quote_with(
    row_text: &str,
    thresholds: &ExtractionThresholds,
) -> (Option<f64>, Option<f64>) {
    let values = numeric_values(row_text);
    let last = pick_price(&values, thresholds);
    let pct = pick_percent(&values, last, thresholds);
    (last, pct)
}

/// First value strictly above the minimum price.
pub fn pick_price(values: &[f64], thresholds: &ExtractionThresholds) -> Option<f64> {
    values
        .iter()
        .copied()
        .find(|v| *v > thresholds.min_price_exclusive)
}

/// First value inside the closed percent band that is not the chosen price. Callers that
/// took the price from somewhere else (a "Dernier cours" column) pass that price here.
pub fn pick_percent(
    values: &[f64],
    price: Option<f64>,
    thresholds: &ExtractionThresholds,
) -> Option<f64> {
    let band = thresholds.percent_band;
    values
        .iter()
        .copied()
        .find(|v| (-band..=band).contains(v) && Some(*v) != price)
}

/// All readable numbers in `text`, in order of appearance.
pub fn numeric_values(text: &str) -> Vec<f64> {
    NUMERIC_TOKEN
        .find_iter(text)
        .filter(|m| !glued_to_letter(text, m.start(), m.end()))
        .filter_map(|m| parse_number(m.as_str()))
        .collect()
}

// Digits inside a word (`S2M`, `MASI20`) belong to a name, not a figure.
fn glued_to_letter(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_some_and(char::is_alphabetic) || after.is_some_and(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn reads_price_and_percent_from_a_live_market_row() {
        let (last, pct) = extract_quote("SNP 744,90 +1,20% 1 200 000");
        assert!(approx(last, 744.90));
        assert!(approx(pct, 1.20));
    }

    #[test]
    fn keeps_grouped_numbers_whole() {
        assert_eq!(
            numeric_values("TGC 1\u{00A0}020,00 -0,49% 12 345"),
            vec![1020.0, -0.49, 12_345.0]
        );
    }

    #[test]
    fn negative_percent_is_found_after_price() {
        let (last, pct) = extract_quote("IAM 109,50 -2,35 % 98 765");
        assert!(approx(last, 109.50));
        assert!(approx(pct, -2.35));
    }

    #[test]
    fn percent_must_differ_from_price() {
        // The price itself sits inside the band; the percent is the next in-band value.
        let (last, pct) = extract_quote("XYZ 12,00 12,00 0,50%");
        assert!(approx(last, 12.0));
        assert!(approx(pct, 0.5));
    }

    #[test]
    fn band_is_closed() {
        let (_, pct) = extract_quote("ABC 600,00 -50,00%");
        assert!(approx(pct, -50.0));
        let (_, pct) = extract_quote("ABC 600,00 50,01%");
        assert_eq!(pct, None);
    }

    #[test]
    fn row_without_numbers_is_all_absent() {
        assert_eq!(extract_quote("HPS Suspendu"), (None, None));
        assert_eq!(extract_quote(""), (None, None));
    }

    #[test]
    fn no_positive_value_means_no_price() {
        let (last, pct) = extract_quote("HPS 0 -1,5");
        assert_eq!(last, None);
        assert!(approx(pct, 0.0));
    }

    #[test]
    fn digits_inside_names_are_ignored() {
        let (last, _) = extract_quote("S2M 212,00 +0,95%");
        assert!(approx(last, 212.0));
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let strict = ExtractionThresholds {
            min_price_exclusive: 5.0,
            percent_band: 10.0,
        };
        let (last, pct) = extract_quote_with("ABC 3,00 450,00 12,00 -4,00", &strict);
        assert!(approx(last, 450.0));
        assert!(approx(pct, 3.0));
    }

    #[test]
    fn percent_skips_a_price_chosen_elsewhere() {
        let values = numeric_values("XYZ 11,80 12,00");
        let t = ExtractionThresholds::default();
        assert!(approx(pick_price(&values, &t), 11.8));
        // With 12,00 taken as the price, 11,80 is the only other in-band value.
        assert!(approx(pick_percent(&values, Some(12.0), &t), 11.8));
        assert!(approx(pick_percent(&values, Some(11.8), &t), 12.0));
        assert_eq!(pick_percent(&[12.0], Some(12.0), &t), None);
    }

    #[test]
    fn space_separated_integer_cells_read_as_one_grouped_number() {
        // Joined cell text cannot tell `571 120` (two cells) from a grouped 571120; the
        // row reader keeps header columns apart before this fallback is reached.
        assert_eq!(numeric_values("571 120"), vec![571_120.0]);
        assert_eq!(numeric_values("571 1200"), vec![571.0, 1200.0]);
        assert_eq!(numeric_values("571,00 120,00"), vec![571.0, 120.0]);
    }
}
