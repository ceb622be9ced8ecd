//! Amount normalization. Deadlines stay as opaque display text; amounts get
//! a numeric reading for stats and sorting, with the display text preserved.

use regex::Regex;

/// Parse the first dollar-like token in `text` into a numeric amount.
///
/// Handles `$2,500,000`, `$1.5M`, `250K`, `$3B`. Suffixes are
/// case-insensitive. Returns `None` when no amount is present ("Amount TBD",
/// prose with no figures) — unknown is a value here, not an error.
pub fn extract_dollar_amount(text: &str) -> Option<f64> {
    let dollar = Regex::new(r"\$\s*([\d,]+(?:\.\d+)?)\s*([KkMmBb])?").expect("valid regex");
    let suffixed = Regex::new(r"\b([\d,]+(?:\.\d+)?)\s*([KkMmBb])\b").expect("valid regex");

    let caps = dollar.captures(text).or_else(|| suffixed.captures(text))?;

    let digits = caps.get(1)?.as_str().replace(',', "");
    let base: f64 = digits.parse().ok()?;

    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(s) if s == "K" => 1_000.0,
        Some(s) if s == "M" => 1_000_000.0,
        Some(s) if s == "B" => 1_000_000_000.0,
        _ => 1.0,
    };

    Some(base * multiplier)
}
