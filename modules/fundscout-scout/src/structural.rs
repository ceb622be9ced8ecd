//! Structural extraction: pull candidate links out of a source's own markup
//! using the per-source CSS selector list.
//!
//! Selectors are tried in profile order and the first one that matches
//! anything wins. A partial selector match means the page layout is known,
//! so falling through to broader selectors would only add noise.

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use fundscout_common::SourceProfile;

const MAX_RAW_LINKS: usize = 50;
const MAX_CANDIDATES: usize = 20;
const MAX_TITLE_CHARS: usize = 200;

const FUNDING_KEYWORDS: &[&str] = &[
    "grant",
    "funding",
    "award",
    "rfp",
    "solicitation",
    "opportunit",
    "application",
    "competitive",
    "scholarship",
];

const EDUCATION_KEYWORDS: &[&str] = &[
    "school",
    "student",
    "education",
    "district",
    "teacher",
    "k-12",
    "classroom",
    "stem",
    "learning",
    "academic",
];

/// Navigation and boilerplate labels, checked before the keyword gate.
/// Matched against the visible link text only, never the href, so path
/// segments like "search-results-detail" stay eligible.
const NAV_DENYLIST: &[&str] = &[
    "about us",
    "contact us",
    "login",
    "sign in",
    "privacy",
    "terms of use",
    "sitemap",
    "facebook",
    "twitter",
    "instagram",
    "youtube",
    "linkedin",
];

/// Labels that only signal navigation when they are the whole link text
/// ("Homeschool Grant" must not die on "home").
const NAV_EXACT: &[&str] = &["home", "search"];

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedLink {
    pub title: String,
    pub url: String,
}

/// Extract candidate links from `html` using the profile's selector list.
pub fn extract_links(html: &str, profile: &SourceProfile) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html);

    let mut raw: Vec<(String, String)> = Vec::new();
    for selector_str in &profile.selectors {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(e) => {
                warn!(source = %profile.id, selector = %selector_str, error = ?e, "Invalid selector");
                continue;
            }
        };

        let matches: Vec<(String, String)> = document
            .select(&selector)
            .filter_map(|element| {
                let href = element.value().attr("href")?.trim().to_string();
                let text = element.text().collect::<String>();
                let title: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if href.is_empty() || title.is_empty() {
                    return None;
                }
                Some((title, href))
            })
            .collect();

        if !matches.is_empty() {
            debug!(source = %profile.id, selector = %selector_str, links = matches.len(), "Selector matched");
            raw = matches;
            break;
        }
    }

    // Dedupe by href, preserving discovery order.
    let mut seen = std::collections::HashSet::new();
    raw.retain(|(_, href)| seen.insert(href.clone()));
    raw.truncate(MAX_RAW_LINKS);

    let mut candidates = Vec::new();
    for (title, href) in raw {
        if href.starts_with('#') || href.starts_with("javascript:") {
            continue;
        }

        let title_lower = title.to_lowercase();
        if NAV_EXACT.iter().any(|term| title_lower == *term)
            || NAV_DENYLIST.iter().any(|term| title_lower.contains(term))
        {
            continue;
        }

        let combined = format!("{} {}", title_lower, href.to_lowercase());
        let has_funding = FUNDING_KEYWORDS.iter().any(|k| combined.contains(k));
        let has_education = EDUCATION_KEYWORDS.iter().any(|k| combined.contains(k));
        if !has_funding || !has_education {
            continue;
        }

        let absolute = match resolve(&profile.url, &href) {
            Some(u) => u,
            None => continue,
        };

        let mut title = title;
        if title.len() > MAX_TITLE_CHARS {
            // Back off to a char boundary so the cut never splits a code point.
            let mut cut = MAX_TITLE_CHARS;
            while !title.is_char_boundary(cut) {
                cut -= 1;
            }
            title.truncate(cut);
        }

        candidates.push(ExtractedLink {
            title,
            url: absolute,
        });
        if candidates.len() >= MAX_CANDIDATES {
            break;
        }
    }

    candidates
}

fn resolve(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let joined = base.join(href).ok()?;
    match joined.scheme() {
        "http" | "https" => Some(joined.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundscout_common::{OriginClass, SourceStatus};

    fn test_profile(selectors: &[&str]) -> SourceProfile {
        SourceProfile {
            id: "tx_tea".to_string(),
            name: "Texas Education Agency".to_string(),
            url: "https://tea.texas.gov/finance-and-grants/grants".to_string(),
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            status: SourceStatus::Active,
            origin: OriginClass::State,
        }
    }

    #[test]
    fn first_matching_selector_wins() {
        let html = r#"
            <div class="grants"><a href="/grants/math">School Math Grant Program</a></div>
            <div class="other"><a href="/grants/noise">Student Grant Noise</a></div>
        "#;
        let profile = test_profile(&[".missing a", ".grants a", ".other a"]);
        let links = extract_links(html, &profile);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "School Math Grant Program");
        assert_eq!(links[0].url, "https://tea.texas.gov/grants/math");
    }

    #[test]
    fn requires_funding_and_education_keywords() {
        let html = r#"
            <a href="/grants/a">District Technology Grant</a>
            <a href="/news/b">District Technology News</a>
            <a href="/grants/c">Highway Repair Grant</a>
        "#;
        let profile = test_profile(&["a"]);
        let links = extract_links(html, &profile);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "District Technology Grant");
    }

    #[test]
    fn nav_and_script_links_are_dropped() {
        let html = r##"
            <a href="#main">School Grant Skip Link</a>
            <a href="javascript:void(0)">School Grant Popup</a>
            <a href="https://facebook.com/agency">School Grants on Facebook</a>
            <a href="/grants/real">Charter School Grant Cycle</a>
        "##;
        let profile = test_profile(&["a"]);
        let links = extract_links(html, &profile);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://tea.texas.gov/grants/real");
    }

    #[test]
    fn denylist_checks_link_text_not_href() {
        let html = r#"
            <a href="/grants/search-results-detail/12345">STEM Education Grant for K-12 Schools</a>
            <a href="/search">Search</a>
        "#;
        let profile = test_profile(&["a"]);
        let links = extract_links(html, &profile);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "STEM Education Grant for K-12 Schools");
    }

    #[test]
    fn exact_nav_labels_do_not_shadow_real_titles() {
        let html = r#"
            <a href="/">Home</a>
            <a href="/grants/homeschool">Homeschool Student Grant Program</a>
        "#;
        let profile = test_profile(&["a"]);
        let links = extract_links(html, &profile);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Homeschool Student Grant Program");
    }

    #[test]
    fn long_titles_are_truncated_on_char_boundaries() {
        let long = format!("School Grant Program {}", "é".repeat(120));
        let html = format!(r#"<a href="/grants/long">{long}</a>"#);
        let profile = test_profile(&["a"]);
        let links = extract_links(&html, &profile);
        assert_eq!(links.len(), 1);
        assert!(links[0].title.len() <= MAX_TITLE_CHARS);
        assert!(links[0].title.ends_with('é'));
    }

    #[test]
    fn duplicate_hrefs_keep_first_occurrence() {
        let html = r#"
            <a href="/grants/one">Student Success Grant</a>
            <a href="/grants/one">Student Success Grant (repeat)</a>
        "#;
        let profile = test_profile(&["a"]);
        let links = extract_links(html, &profile);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Student Success Grant");
    }

    #[test]
    fn no_selector_match_yields_empty() {
        let html = "<p>Maintenance page</p>";
        let profile = test_profile(&[".grants a"]);
        assert!(extract_links(html, &profile).is_empty());
    }

    #[test]
    fn candidate_cap_is_enforced() {
        let mut html = String::new();
        for i in 0..30 {
            html.push_str(&format!(
                r#"<a href="/grants/{i}">School Grant Program {i}</a>"#
            ));
        }
        let profile = test_profile(&["a"]);
        let links = extract_links(&html, &profile);
        assert_eq!(links.len(), MAX_CANDIDATES);
    }
}
