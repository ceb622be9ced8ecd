//! URL sanitization for links pulled out of prose and AI responses.
//!
//! Mined URLs routinely arrive wrapped in markdown punctuation and citation
//! footnotes ("https://ed.gov/grants)[3]."). The cleaner strips those
//! artifacts in a fixed order, then validates the result. An empty string is
//! the universal "invalid" sentinel; this function never errors.

use regex::Regex;

/// Clean a raw extracted URL. Returns the cleaned URL, or "" if what remains
/// is not a plausible absolute web URL.
pub fn clean_extracted_url(raw: &str) -> String {
    let mut url = raw.trim().to_string();

    // Citation footnotes first: "[3]" or "[12]." glued to the end.
    let footnote = Regex::new(r"\[\d+\]\.?$").expect("valid regex");
    url = footnote.replace(&url, "").to_string();

    // Then any run of trailing closing punctuation.
    let trailing = Regex::new(r"[\)\]\}\.,:;!?]+$").expect("valid regex");
    url = trailing.replace(&url, "").trim().to_string();

    let valid = Regex::new(r#"^https?://[^\s<>"]+\.[A-Za-z]{2,}"#).expect("valid regex");
    if url.len() > 10 && valid.is_match(&url) {
        url
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footnote_and_trailing_paren_are_stripped() {
        assert_eq!(
            clean_extracted_url("https://a.example.com/x)[1]."),
            "https://a.example.com/x"
        );
    }

    #[test]
    fn trailing_punctuation_run_is_stripped() {
        assert_eq!(
            clean_extracted_url("https://ed.gov/programs/grants.),"),
            "https://ed.gov/programs/grants"
        );
    }

    #[test]
    fn clean_url_passes_through() {
        assert_eq!(
            clean_extracted_url("https://tea.texas.gov/grants"),
            "https://tea.texas.gov/grants"
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            clean_extracted_url("  https://tea.texas.gov/grants  "),
            "https://tea.texas.gov/grants"
        );
    }

    #[test]
    fn non_http_scheme_is_invalid() {
        assert_eq!(clean_extracted_url("ftp://example.com/file"), "");
        assert_eq!(clean_extracted_url("javascript:void(0)"), "");
    }

    #[test]
    fn missing_tld_is_invalid() {
        assert_eq!(clean_extracted_url("https://localhost/grants"), "");
    }

    #[test]
    fn too_short_is_invalid() {
        assert_eq!(clean_extracted_url("http://a.b"), "");
        assert_eq!(clean_extracted_url(""), "");
    }

    #[test]
    fn footnote_without_period() {
        assert_eq!(
            clean_extracted_url("https://ed.gov/grants[12]"),
            "https://ed.gov/grants"
        );
    }
}
