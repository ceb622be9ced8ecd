//! Quality filter: decides whether an extracted title/URL pair looks like an
//! actionable funding opportunity rather than surrounding site noise.
//!
//! Denylists run first, then the actionable-term allowlist. Missing amount
//! and deadline together is a soft signal only; it logs a warning and never
//! rejects.

use tracing::warn;

/// Title substrings that mark non-opportunity pages. Lowercased matching.
const TITLE_DENYLIST: &[&str] = &[
    "budget",
    "summary report",
    "annual report",
    "meeting minutes",
    "legislative",
    "presentation",
    "press release",
    "newsletter",
    "webinar recording",
    "strategic plan",
];

/// URL fragments that mark documents and archives rather than live programs.
const URL_DENYLIST: &[&str] = &[
    ".pdf",
    ".ppt",
    ".xls",
    "/archive",
    "/legislative",
    "/minutes",
    "/budget",
    "/newsletter",
    "/press",
];

/// At least one of these must appear in the title or URL for a candidate to
/// count as actionable.
const ACTIONABLE_TERMS: &[&str] = &[
    "grant",
    "funding opportunity",
    "funding",
    "application",
    "apply",
    "rfp",
    "solicitation",
    "award",
    "competitive",
    "scholarship",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(&'static str),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Assess one candidate. `amount_text`/`deadline_text` are the display
/// strings; sentinel values ("Amount TBD", "See website for details") count
/// as missing.
pub fn assess(title: &str, url: &str, amount_text: &str, deadline_text: &str) -> Verdict {
    let title_lower = title.to_lowercase();
    let url_lower = url.to_lowercase();

    for term in TITLE_DENYLIST {
        if title_lower.contains(term) {
            return Verdict::Reject("denylisted title term");
        }
    }

    for fragment in URL_DENYLIST {
        if url_lower.contains(fragment) {
            return Verdict::Reject("denylisted url fragment");
        }
    }

    let actionable = ACTIONABLE_TERMS
        .iter()
        .any(|term| title_lower.contains(term) || url_lower.contains(term));
    if !actionable {
        return Verdict::Reject("no actionable term");
    }

    if !has_amount(amount_text) && !has_deadline(deadline_text) {
        warn!(title, "Candidate has neither amount nor deadline");
    }

    Verdict::Accept
}

fn has_amount(amount_text: &str) -> bool {
    !amount_text.trim().is_empty() && !amount_text.eq_ignore_ascii_case("amount tbd")
}

fn has_deadline(deadline_text: &str) -> bool {
    !deadline_text.trim().is_empty()
        && !deadline_text.eq_ignore_ascii_case("see website for details")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actionable_grant_title_is_accepted() {
        let verdict = assess(
            "Math Innovation Grant Program",
            "https://tea.texas.gov/grants/math-innovation",
            "$1.5M",
            "March 15, 2026",
        );
        assert_eq!(verdict, Verdict::Accept);
    }

    #[test]
    fn budget_title_is_rejected_even_with_funding_term() {
        let verdict = assess(
            "FY2026 Budget Summary for Grant Funding",
            "https://example.gov/finance",
            "$10M",
            "",
        );
        assert_eq!(verdict, Verdict::Reject("denylisted title term"));
    }

    #[test]
    fn archive_url_is_rejected() {
        let verdict = assess(
            "STEM Education Grant",
            "https://example.gov/archive/2019/stem-grant",
            "$250K",
            "",
        );
        assert_eq!(verdict, Verdict::Reject("denylisted url fragment"));
    }

    #[test]
    fn pdf_link_is_rejected() {
        let verdict = assess(
            "Grant Application Instructions",
            "https://example.gov/docs/instructions.pdf",
            "",
            "",
        );
        assert_eq!(verdict, Verdict::Reject("denylisted url fragment"));
    }

    #[test]
    fn non_actionable_title_is_rejected() {
        let verdict = assess(
            "About Our Department",
            "https://example.gov/about",
            "",
            "",
        );
        assert_eq!(verdict, Verdict::Reject("no actionable term"));
    }

    #[test]
    fn actionable_term_in_url_is_enough() {
        let verdict = assess(
            "Open Opportunities for Districts",
            "https://example.gov/grants/open",
            "",
            "April 1, 2026",
        );
        assert_eq!(verdict, Verdict::Accept);
    }

    #[test]
    fn missing_amount_and_deadline_still_accepts() {
        let verdict = assess(
            "Rural Schools Grant",
            "https://example.gov/rural-schools",
            "Amount TBD",
            "See website for details",
        );
        assert_eq!(verdict, Verdict::Accept);
    }
}
