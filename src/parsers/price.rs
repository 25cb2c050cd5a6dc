/// Currency suffix appended to formatted price deltas.
pub const CURRENCY_SUFFIX: &str = "₽";

/// Parse a locale-formatted price ("1 234 ₽", "99.5 $").
///
/// Every character other than an ASCII digit or '.' is discarded, then the
/// longest leading decimal number is read. Thousands commas are therefore
/// dropped together with the separators. No digits parses to `0.0`.
pub fn parse_price(price_text: &str) -> f64 {
    let kept: String = price_text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in kept.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }

    kept[..end].parse::<f64>().unwrap_or(0.0)
}

/// Absolute difference of two raw prices, formatted with two decimals and the
/// currency suffix.
pub fn format_price_difference(price_a: &str, price_b: &str) -> String {
    let delta = (parse_price(price_a) - parse_price(price_b)).abs();
    format!("{:.2} {}", delta, CURRENCY_SUFFIX)
}
