//! Text mining over free-form AI responses.
//!
//! Two paths. The structured path parses repeated TITLE/AMOUNT/DEADLINE/URL
//! records and is exclusive: if it matches at all, the fallback never runs.
//! The fallback pairs heuristic title lines with URLs mined by an ordered
//! rule cascade.

use regex::Regex;
use tracing::debug;

use crate::urlclean::clean_extracted_url;

/// Records surfaced per source per pass.
const MAX_MINED: usize = 5;

const MIN_TITLE_CHARS: usize = 10;
const MAX_TITLE_CHARS: usize = 120;

pub const DEFAULT_AMOUNT: &str = "Amount TBD";
pub const DEFAULT_DEADLINE: &str = "See website for details";

#[derive(Debug, Clone, PartialEq)]
pub struct MinedRecord {
    pub title: String,
    pub amount_text: String,
    pub deadline_text: String,
    pub url: String,
}

/// Mine opportunity records from a free-text response.
pub fn extract(text: &str) -> Vec<MinedRecord> {
    let structured = extract_structured(text);
    if !structured.is_empty() {
        debug!(records = structured.len(), "Structured records found");
        return structured;
    }
    extract_fallback(text)
}

// ---------------------------------------------------------------------------
// Structured path
// ---------------------------------------------------------------------------

fn extract_structured(text: &str) -> Vec<MinedRecord> {
    let record = Regex::new(
        r"(?is)TITLE:\s*(.+?)\s*\n\s*AMOUNT:\s*(.+?)\s*\n\s*DEADLINE:\s*(.+?)\s*\n\s*URL:\s*(\S+)",
    )
    .expect("valid regex");

    let mut records = Vec::new();
    for caps in record.captures_iter(text) {
        let title = tidy_field(&caps[1]);
        let url = clean_extracted_url(&caps[4]);
        // A record whose URL does not survive cleaning has nothing to link
        // to, so it is dropped rather than stored with a broken target.
        if title.is_empty() || url.is_empty() {
            continue;
        }
        records.push(MinedRecord {
            title,
            amount_text: field_or(&caps[2], DEFAULT_AMOUNT),
            deadline_text: field_or(&caps[3], DEFAULT_DEADLINE),
            url,
        });
        if records.len() >= MAX_MINED {
            break;
        }
    }
    records
}

fn tidy_field(raw: &str) -> String {
    raw.trim()
        .trim_matches('*')
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn field_or(raw: &str, default: &str) -> String {
    let value = tidy_field(raw);
    if value.is_empty() || value.eq_ignore_ascii_case("n/a") || value.eq_ignore_ascii_case("unknown")
    {
        default.to_string()
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Fallback path: title heuristics x URL cascade
// ---------------------------------------------------------------------------

struct UrlRule {
    name: &'static str,
    pattern: &'static str,
    group: usize,
}

/// Evaluated in order; earlier rules are more precise. The parenthesized rule
/// matches an extra leading character so that markdown link bodies
/// ("[text](url)") are not re-captured.
const URL_RULES: &[UrlRule] = &[
    UrlRule {
        name: "markdown_link",
        pattern: r#"\[[^\]]*\]\((https?://[^)\s]+)\)"#,
        group: 1,
    },
    UrlRule {
        name: "labeled",
        pattern: r#"(?i)(?:URL|Link|Website|Source)\s*:\s*(https?://[^\s<>"\]]+)"#,
        group: 1,
    },
    UrlRule {
        name: "parenthesized",
        pattern: r#"(^|[^\]])\((https?://[^)\s]+)\)"#,
        group: 2,
    },
    UrlRule {
        name: "bare",
        pattern: r#"https?://[^\s<>"\)\]]+"#,
        group: 0,
    },
];

/// Mine URLs from prose: every rule's hits are cleaned and deduplicated,
/// preserving discovery order across the cascade.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut urls = Vec::new();

    for rule in URL_RULES {
        let re = Regex::new(rule.pattern).expect("valid regex");
        for caps in re.captures_iter(text) {
            let raw = match caps.get(rule.group) {
                Some(m) => m.as_str(),
                None => continue,
            };
            let cleaned = clean_extracted_url(raw);
            if !cleaned.is_empty() && seen.insert(cleaned.clone()) {
                debug!(rule = rule.name, url = %cleaned, "URL mined");
                urls.push(cleaned);
            }
        }
    }
    urls
}

const GRANT_NOUNS: &[&str] = &[
    "grant",
    "funding",
    "program",
    "initiative",
    "opportunity",
    "scholarship",
    "award",
];

const EDUCATION_TERMS: &[&str] = &[
    "school",
    "student",
    "education",
    "district",
    "teacher",
    "classroom",
    "k-12",
    "stem",
];

const DISQUALIFYING_PREFIXES: &[&str] = &[
    "http",
    "for more",
    "contact",
    "phone",
    "email",
    "source:",
    "url:",
    "link:",
    "website:",
    "note:",
];

fn extract_titles(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut titles = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let heading = trimmed.starts_with('#')
            || (trimmed.starts_with("**") && trimmed.trim_end_matches(['.', ':']).ends_with("**"));
        let bullet = leading_number(trimmed) || (!heading && trimmed.starts_with(['-', '*']));

        let stripped = strip_markers(trimmed);
        let lower = stripped.to_lowercase();

        let has_noun = GRANT_NOUNS.iter().any(|n| lower.contains(n));
        let has_education = EDUCATION_TERMS.iter().any(|t| lower.contains(t));

        // Headers and bold spans stand alone; bulleted or numbered lines need
        // a grant-like noun; plain prose needs an education term as well.
        let qualifies = heading || (bullet && has_noun) || (has_noun && has_education);
        if !qualifies {
            continue;
        }
        if stripped.len() < MIN_TITLE_CHARS || stripped.len() > MAX_TITLE_CHARS {
            continue;
        }
        if DISQUALIFYING_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            continue;
        }

        if seen.insert(lower) {
            titles.push(stripped);
        }
    }
    titles
}

fn leading_number(line: &str) -> bool {
    let mut chars = line.chars();
    let mut saw_digit = false;
    for c in chars.by_ref() {
        if c.is_ascii_digit() {
            saw_digit = true;
        } else {
            return saw_digit && (c == '.' || c == ')');
        }
    }
    false
}

fn strip_markers(line: &str) -> String {
    let mut s = line.trim_start_matches(['-', '*', '#', ' ']).to_string();
    // Leading "1." / "2)" numbering.
    let numbering = Regex::new(r"^\d+[.)]\s*").expect("valid regex");
    s = numbering.replace(&s, "").to_string();
    s = s.replace("**", "");
    // Trailing inline link or citation remnants.
    let inline_url = Regex::new(r"\s*[\(\[]?https?://\S*$").expect("valid regex");
    s = inline_url.replace(&s, "").to_string();
    s.trim().trim_matches(':').trim().to_string()
}

fn extract_fallback(text: &str) -> Vec<MinedRecord> {
    let titles = extract_titles(text);
    let urls = extract_urls(text);

    let mut records = Vec::new();
    for (i, title) in titles.into_iter().enumerate() {
        // Positional pairing; once titles outnumber URLs, everything reuses
        // the first URL. A title with no URL at all is unusable.
        let url = match urls.get(i).or_else(|| urls.first()) {
            Some(u) => u.clone(),
            None => continue,
        };
        records.push(MinedRecord {
            title,
            amount_text: DEFAULT_AMOUNT.to_string(),
            deadline_text: DEFAULT_DEADLINE.to_string(),
            url,
        });
        if records.len() >= MAX_MINED {
            break;
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_records_parse() {
        let text = "\
Here are current opportunities:

TITLE: Math Innovation Grant
AMOUNT: $1.5M
DEADLINE: March 15, 2026
URL: https://tea.texas.gov/grants/math

TITLE: Rural Connectivity Program
AMOUNT: n/a
DEADLINE: Rolling
URL: https://tea.texas.gov/grants/rural)[2].
";
        let records = extract(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Math Innovation Grant");
        assert_eq!(records[0].amount_text, "$1.5M");
        assert_eq!(records[1].amount_text, DEFAULT_AMOUNT);
        assert_eq!(records[1].url, "https://tea.texas.gov/grants/rural");
    }

    #[test]
    fn structured_path_is_exclusive() {
        let text = "\
TITLE: Math Innovation Grant
AMOUNT: $1.5M
DEADLINE: March 15, 2026
URL: https://tea.texas.gov/grants/math

Also see the [general page](https://tea.texas.gov/other-grant-listing).
";
        let records = extract(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://tea.texas.gov/grants/math");
    }

    #[test]
    fn structured_record_without_valid_url_is_dropped() {
        let text = "\
TITLE: Broken Record Grant
AMOUNT: $100K
DEADLINE: June 1, 2026
URL: not-a-url
";
        // No usable structured record and no fallback URLs either.
        assert!(extract(text).is_empty());
    }

    #[test]
    fn url_cascade_order_and_dedup() {
        let text = "\
See [the grant page](https://ed.gov/grants/stem) for details.
Website: https://ed.gov/grants/apply
More info (https://ed.gov/grants/stem) and https://ed.gov/grants/bare.
";
        let urls = extract_urls(text);
        assert_eq!(
            urls,
            vec![
                "https://ed.gov/grants/stem".to_string(),
                "https://ed.gov/grants/apply".to_string(),
                "https://ed.gov/grants/bare".to_string(),
            ]
        );
    }

    #[test]
    fn markdown_body_is_not_recaptured_by_parenthesized_rule() {
        let text = "Apply via [portal](https://ed.gov/grants/portal).";
        let urls = extract_urls(text);
        assert_eq!(urls, vec!["https://ed.gov/grants/portal".to_string()]);
    }

    #[test]
    fn fallback_pairs_titles_with_urls_positionally() {
        let text = "\
1. Elementary STEM Grant Program
   https://ed.gov/grants/stem
2. Teacher Development Grant
   https://ed.gov/grants/teacher
3. Classroom Technology Grant
";
        let records = extract(text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].title, "Elementary STEM Grant Program");
        assert_eq!(records[0].url, "https://ed.gov/grants/stem");
        assert_eq!(records[1].url, "https://ed.gov/grants/teacher");
        // Third title reuses the first URL.
        assert_eq!(records[2].url, "https://ed.gov/grants/stem");
        assert_eq!(records[2].amount_text, DEFAULT_AMOUNT);
    }

    #[test]
    fn fallback_without_urls_yields_nothing() {
        let text = "- District Facilities Grant Program\n- Another Grant Initiative\n";
        assert!(extract(text).is_empty());
    }

    #[test]
    fn bold_spans_qualify_without_grant_nouns() {
        let text = "\
**Classroom Connectivity Drive 2026**
https://ed.gov/apply/connectivity
";
        let records = extract(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Classroom Connectivity Drive 2026");
    }

    #[test]
    fn prose_line_needs_education_and_funding_terms() {
        let text = "\
Teacher Residency Funding Pilot launches statewide
Midday traffic advisory for the capitol area
https://ed.gov/grants/residency
";
        let records = extract(text);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].title,
            "Teacher Residency Funding Pilot launches statewide"
        );
    }

    #[test]
    fn disqualified_and_short_lines_are_not_titles() {
        let text = "\
- For more grant information, contact our office
- Contact: grants@ed.gov
- Grant
- **After School Enrichment Grant**
https://ed.gov/grants/afterschool
";
        let records = extract(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "After School Enrichment Grant");
    }
}
