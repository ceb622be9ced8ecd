//! Light detail sniffing over whatever text surrounds a candidate: link
//! text, list entries, response lines. Cheap patterns only; deep mining of
//! the opportunity's own page lives in `enrich`.

use regex::Regex;

use crate::textmine::{DEFAULT_AMOUNT, DEFAULT_DEADLINE};

/// Pull display-ready amount and deadline text out of `text`.
/// Falls back to the standard sentinels when nothing matches.
pub fn extract_details(text: &str) -> (String, String) {
    let amount = Regex::new(r"(?i)\$[\d,]+(?:\.\d+)?\s*(?:[KMB]\b|million|billion|thousand)?")
        .expect("valid regex")
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| DEFAULT_AMOUNT.to_string());

    let deadline_patterns = [
        r"(?i)(?:deadline|due|closes?|applications?\s+due)[:\s]+([A-Z][a-z]+\s+\d{1,2},?\s+\d{4})",
        r"([A-Z][a-z]+\s+\d{1,2},?\s+\d{4})",
        r"(\d{1,2}/\d{1,2}/\d{2,4})",
    ];
    let mut deadline = DEFAULT_DEADLINE.to_string();
    for pattern in deadline_patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(caps) = re.captures(text) {
            if let Some(m) = caps.get(1) {
                deadline = m.as_str().to_string();
                break;
            }
        }
    }

    (amount, deadline)
}

/// Assign topical tags from candidate text. Every opportunity carries "K-12";
/// the rest are keyword-driven.
pub fn infer_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tags = vec!["K-12".to_string()];

    const STEM: &[&str] = &["stem", "science", "math", "engineering", "robotics"];
    const PD: &[&str] = &["professional development", "teacher training", "educator workshop"];
    const TECH: &[&str] = &["technology", "digital", "computer", "broadband", "connectivity", "device"];

    if STEM.iter().any(|k| lower.contains(k)) {
        tags.push("STEM".to_string());
    }
    if PD.iter().any(|k| lower.contains(k)) {
        tags.push("Professional Development".to_string());
    }
    if TECH.iter().any(|k| lower.contains(k)) {
        tags.push("Technology".to_string());
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_and_labeled_deadline() {
        let (amount, deadline) =
            extract_details("Awards up to $1.5M per district. Deadline: March 15, 2026.");
        assert_eq!(amount, "$1.5M");
        assert_eq!(deadline, "March 15, 2026");
    }

    #[test]
    fn bare_date_without_label() {
        let (_, deadline) = extract_details("Applications close April 1, 2026 at noon.");
        assert_eq!(deadline, "April 1, 2026");
    }

    #[test]
    fn slash_date() {
        let (_, deadline) = extract_details("Submit by 04/01/2026.");
        assert_eq!(deadline, "04/01/2026");
    }

    #[test]
    fn nothing_found_yields_sentinels() {
        let (amount, deadline) = extract_details("Competitive grant for school districts.");
        assert_eq!(amount, DEFAULT_AMOUNT);
        assert_eq!(deadline, DEFAULT_DEADLINE);
    }

    #[test]
    fn tags_accumulate() {
        let tags = infer_tags("STEM robotics grant with classroom technology funding");
        assert_eq!(tags, vec!["K-12", "STEM", "Technology"]);
    }

    #[test]
    fn base_tag_always_present() {
        assert_eq!(infer_tags("General facilities grant"), vec!["K-12"]);
    }
}
