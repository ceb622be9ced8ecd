//! Detail enrichment: fetch a candidate's own page and mine the fields the
//! listing did not carry. Strictly best-effort; a fetch failure or a page
//! with none of the labels leaves the candidate exactly as it was.

use regex::Regex;
use tracing::{debug, warn};

use fundscout_common::CandidateOpportunity;

use crate::textmine::{DEFAULT_AMOUNT, DEFAULT_DEADLINE};
use crate::traits::ContentFetcher;

/// Enrich `candidate` in place from its linked page.
pub async fn enrich(candidate: &mut CandidateOpportunity, fetcher: &dyn ContentFetcher) {
    let content = match fetcher.fetch(&candidate.url).await {
        Ok(text) => text,
        Err(e) => {
            warn!(url = %candidate.url, error = %e, "Enrichment fetch failed");
            return;
        }
    };

    // Each field is mined independently; one hit never depends on another.
    if candidate.enrichment.eligibility.is_none() {
        candidate.enrichment.eligibility = capture(
            &content,
            r"(?i)elig\w+[:\s]+([^\n]{10,200})",
        );
    }
    if candidate.enrichment.description.is_none() {
        candidate.enrichment.description = capture(
            &content,
            r"(?i)(?:description|overview|purpose)[:\s]+([^\n]{20,400})",
        )
        .or_else(|| first_paragraph(&content));
    }
    if candidate.enrichment.contact.is_none() {
        candidate.enrichment.contact = capture(
            &content,
            r"(?i)contact[:\s]+([^\n]{5,120})",
        );
    }
    if candidate.enrichment.application_process.is_none() {
        candidate.enrichment.application_process = capture(
            &content,
            r"(?i)(?:how to apply|application process|to apply)[:\s]+([^\n]{10,300})",
        );
    }

    if candidate.amount_text == DEFAULT_AMOUNT {
        if let Some(amount) = capture(
            &content,
            r"(?i)(?:award|amount|funding|up to)[:\s]*(\$[\d,]+(?:\.\d+)?\s*(?:[KMB]\b|million|billion)?)",
        ) {
            candidate.amount_text = amount;
        }
    }
    if candidate.deadline_text == DEFAULT_DEADLINE {
        if let Some(deadline) = capture(
            &content,
            r"(?i)(?:deadline|due date|applications?\s+due|closes?)[:\s]+([^\n.]{3,80})",
        ) {
            candidate.deadline_text = deadline;
        }
    }

    debug!(
        url = %candidate.url,
        eligibility = candidate.enrichment.eligibility.is_some(),
        description = candidate.enrichment.description.is_some(),
        "Enrichment pass done"
    );
}

fn capture(content: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).expect("valid regex");
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First substantial prose paragraph, as a description of last resort.
fn first_paragraph(content: &str) -> Option<String> {
    content
        .split("\n\n")
        .map(str::trim)
        .find(|p| p.len() >= 80 && !p.starts_with(['#', '|', '>', '[', '!', '-']))
        .map(|p| {
            let mut text: String = p.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.len() > 400 {
                // Back off to a char boundary so the cut never splits a code point.
                let mut cut = 400;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            text
        })
}
