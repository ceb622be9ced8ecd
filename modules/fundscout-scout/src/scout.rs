//! Per-source discovery orchestrator.
//!
//! Sources are processed one at a time, start to finish, so the identity
//! gate always sees every earlier insert. For each source the strategies
//! run in fixed order: official crawl through the content-crawling service,
//! AI discovery through the language-query service, then a structural scrape
//! of the live markup. The first strategy that yields at least one
//! filter-surviving candidate is final for that source.

use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Result};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use fundscout_common::{
    identity_key, CandidateOpportunity, DiscoveryMethod, Enrichment, FundScoutError, OriginClass,
    Reliability, SourceProfile, SourceStatus, StoredOpportunity,
};
use fundscout_store::Store;

use crate::details::{extract_details, infer_tags};
use crate::enrich::enrich;
use crate::filter::{self, Verdict};
use crate::notify;
use crate::report::{Outcome, RunReport};
use crate::structural;
use crate::textmine;
use crate::traits::{AlertSender, ContentFetcher, QueryService};
use crate::urlclean::clean_extracted_url;

/// Response fragments that mean a bot wall, not content.
const BOT_DEFENSE_MARKERS: &[&str] = &["captcha", "radware", "access denied"];

/// URL path fragments that suggest a funding page during official crawl.
const FUNDING_PATH_HINTS: &[&str] = &["grant", "fund", "rfp", "solicit", "opportunit", "scholarship"];

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Default, Clone, Serialize)]
pub struct ScoutStats {
    pub sources_processed: u32,
    pub sources_skipped: u32,
    pub sources_failed: u32,
    pub candidates_extracted: u32,
    pub candidates_rejected: u32,
    pub opportunities_stored: u32,
    pub duplicates_ignored: u32,
    pub alerts_sent: u32,
}

impl fmt::Display for ScoutStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed: {}, skipped: {}, failed: {}, candidates: {} ({} rejected), stored: {} ({} duplicates), alerts: {}",
            self.sources_processed,
            self.sources_skipped,
            self.sources_failed,
            self.candidates_extracted,
            self.candidates_rejected,
            self.opportunities_stored,
            self.duplicates_ignored,
            self.alerts_sent,
        )
    }
}

pub struct Scout {
    store: Store,
    fetcher: Option<Box<dyn ContentFetcher>>,
    query: Option<Box<dyn QueryService>>,
    sender: Box<dyn AlertSender>,
    http: reqwest::Client,
}

impl Scout {
    pub fn new(
        store: Store,
        fetcher: Option<Box<dyn ContentFetcher>>,
        query: Option<Box<dyn QueryService>>,
        sender: Box<dyn AlertSender>,
    ) -> Result<Self> {
        if fetcher.is_none() {
            warn!("No content-crawling service configured, official crawl disabled");
        }
        if query.is_none() {
            warn!("No language-query service configured, AI discovery disabled");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            store,
            fetcher,
            query,
            sender,
            http,
        })
    }

    /// Run one discovery pass over `sources`. Per-source failures land in
    /// the report; only persistence errors abort the run.
    pub async fn run(&self, sources: &[SourceProfile]) -> Result<(ScoutStats, RunReport)> {
        let mut stats = ScoutStats::default();
        let mut report = RunReport::new();
        let mut new_opportunities: Vec<StoredOpportunity> = Vec::new();

        info!(run_id = %report.run_id, sources = sources.len(), "Scout run starting");

        for source in sources {
            match source.status {
                SourceStatus::Blocked | SourceStatus::Inactive => {
                    debug!(source = %source.id, status = %source.status, "Skipping source");
                    stats.sources_skipped += 1;
                    report.record(
                        &source.id,
                        Outcome::Skipped {
                            status: source.status.to_string(),
                        },
                    );
                    continue;
                }
                SourceStatus::NeedsVerification => {
                    info!(source = %source.id, "Source needs verification, results may be stale");
                }
                SourceStatus::Active => {}
            }

            stats.sources_processed += 1;

            match self.discover(source, &mut stats).await {
                Ok(candidates) if candidates.is_empty() => {
                    report.record(&source.id, Outcome::Empty);
                }
                Ok(candidates) => {
                    let method = candidates[0].method.to_string();
                    let extracted = candidates.len() as u32;
                    let mut stored = 0u32;

                    for candidate in candidates {
                        let identity =
                            identity_key(&source.id, &candidate.title, chrono::Utc::now());
                        let opp =
                            StoredOpportunity::from_candidate(candidate, identity, source);

                        // Store failures are the one hard error in a run.
                        let inserted = self
                            .store
                            .insert_if_absent(&opp)
                            .await
                            .map_err(|e| FundScoutError::Persistence(e.to_string()))?;
                        if inserted {
                            info!(source = %source.id, title = %opp.title, "New opportunity stored");
                            stats.opportunities_stored += 1;
                            stored += 1;
                            new_opportunities.push(opp);
                        } else {
                            debug!(identity = %opp.identity, "Duplicate ignored");
                            stats.duplicates_ignored += 1;
                        }
                    }

                    report.record(
                        &source.id,
                        Outcome::Found {
                            method,
                            candidates: extracted,
                            stored,
                        },
                    );
                }
                Err(e) => {
                    warn!(source = %source.id, error = %e, "Source failed");
                    stats.sources_failed += 1;
                    report.record(
                        &source.id,
                        Outcome::Failed {
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        let subscribers = self.store.subscribers().await?;
        stats.alerts_sent =
            notify::send_alerts(&subscribers, &new_opportunities, self.sender.as_ref()).await as u32;

        info!(run_id = %report.run_id, "Scout run complete");
        Ok((stats, report))
    }

    /// Strategy chain for one source. Returns the first non-empty candidate
    /// batch; Ok(empty) when every available strategy ran clean but found
    /// nothing; Err only when every available strategy failed outright.
    async fn discover(
        &self,
        source: &SourceProfile,
        stats: &mut ScoutStats,
    ) -> Result<Vec<CandidateOpportunity>> {
        let mut any_succeeded = false;
        let mut last_error: Option<anyhow::Error> = None;

        if let Some(fetcher) = &self.fetcher {
            match self.official_crawl(source, fetcher.as_ref(), stats).await {
                Ok(candidates) => {
                    any_succeeded = true;
                    if !candidates.is_empty() {
                        return Ok(self.finalize(candidates, stats).await);
                    }
                }
                Err(e) => {
                    warn!(source = %source.id, error = %e, "Official crawl failed");
                    last_error = Some(e);
                }
            }
        }

        if let Some(query) = &self.query {
            match self.ai_discovery(source, query.as_ref(), stats).await {
                Ok(candidates) => {
                    any_succeeded = true;
                    if !candidates.is_empty() {
                        return Ok(self.finalize(candidates, stats).await);
                    }
                }
                Err(e) => {
                    warn!(source = %source.id, error = %e, "AI discovery failed");
                    last_error = Some(e);
                }
            }
        }

        match self.structural_scrape(source, stats).await {
            Ok(candidates) => {
                any_succeeded = true;
                if !candidates.is_empty() {
                    return Ok(self.finalize(candidates, stats).await);
                }
            }
            Err(e) => {
                warn!(source = %source.id, error = %e, "Structural scrape failed");
                last_error = Some(e);
            }
        }

        if any_succeeded {
            Ok(Vec::new())
        } else {
            Err(last_error.unwrap_or_else(|| anyhow!("no discovery strategy available")))
        }
    }

    /// Filtered candidates get one enrichment pass each (when the crawler is
    /// available) and their quality boost before the identity gate.
    async fn finalize(
        &self,
        mut candidates: Vec<CandidateOpportunity>,
        stats: &mut ScoutStats,
    ) -> Vec<CandidateOpportunity> {
        stats.candidates_extracted += candidates.len() as u32;

        if let Some(fetcher) = &self.fetcher {
            for candidate in &mut candidates {
                enrich(candidate, fetcher.as_ref()).await;
                if candidate.enrichment.eligibility.is_some()
                    && candidate.enrichment.description.is_some()
                {
                    candidate.quality_score = (candidate.quality_score + 1.0).clamp(0.0, 10.0);
                }
            }
        }

        candidates
    }

    // -----------------------------------------------------------------------
    // Strategy 1: official crawl via the content-crawling service
    // -----------------------------------------------------------------------

    async fn official_crawl(
        &self,
        source: &SourceProfile,
        fetcher: &dyn ContentFetcher,
        stats: &mut ScoutStats,
    ) -> Result<Vec<CandidateOpportunity>> {
        let text = fetcher.fetch(&source.url).await?;
        check_bot_defense(&text)?;

        let url_re = Regex::new(r#"https?://[^\s<>"\)\]]+"#).expect("valid regex");
        let mut seen = std::collections::HashSet::new();
        let mut candidates = Vec::new();

        for m in url_re.find_iter(&text) {
            let url = clean_extracted_url(m.as_str());
            if url.is_empty() || !is_funding_url(&url) || !seen.insert(url.clone()) {
                continue;
            }

            let title = title_window(&text, m.start());
            if title.len() < 10 {
                continue;
            }

            match self.build_candidate(
                title,
                url,
                DiscoveryMethod::OfficialCrawl,
                source,
                None,
                None,
            ) {
                Some(candidate) => candidates.push(candidate),
                None => stats.candidates_rejected += 1,
            }
            if candidates.len() >= 20 {
                break;
            }
        }

        debug!(source = %source.id, candidates = candidates.len(), "Official crawl done");
        Ok(candidates)
    }

    // -----------------------------------------------------------------------
    // Strategy 2: AI discovery via the language-query service
    // -----------------------------------------------------------------------

    async fn ai_discovery(
        &self,
        source: &SourceProfile,
        query: &dyn QueryService,
        stats: &mut ScoutStats,
    ) -> Result<Vec<CandidateOpportunity>> {
        let prompt = discovery_prompt(source);
        let response = query.ask(&prompt).await?;

        let records = textmine::extract(&response);
        if records.is_empty() {
            return Err(FundScoutError::MalformedAiResponse(format!(
                "no records mined from {} chars of response",
                response.len()
            ))
            .into());
        }

        let mut candidates = Vec::new();
        for record in records {
            match self.build_candidate(
                record.title,
                record.url,
                DiscoveryMethod::AiDiscovery,
                source,
                Some(record.amount_text),
                Some(record.deadline_text),
            ) {
                Some(candidate) => candidates.push(candidate),
                None => stats.candidates_rejected += 1,
            }
        }

        Ok(candidates)
    }

    // -----------------------------------------------------------------------
    // Strategy 3: structural scrape of the live markup
    // -----------------------------------------------------------------------

    async fn structural_scrape(
        &self,
        source: &SourceProfile,
        stats: &mut ScoutStats,
    ) -> Result<Vec<CandidateOpportunity>> {
        let resp = self
            .http
            .get(&source.url)
            .send()
            .await
            .map_err(|e| FundScoutError::SourceUnreachable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(
                FundScoutError::SourceUnreachable(format!("status {status} from {}", source.url))
                    .into(),
            );
        }
        let html = resp.text().await?;
        check_bot_defense(&html)?;

        let mut candidates = Vec::new();
        for link in structural::extract_links(&html, source) {
            match self.build_candidate(
                link.title,
                link.url,
                DiscoveryMethod::Structural,
                source,
                None,
                None,
            ) {
                Some(candidate) => candidates.push(candidate),
                None => stats.candidates_rejected += 1,
            }
        }

        Ok(candidates)
    }

    // -----------------------------------------------------------------------
    // Candidate assembly
    // -----------------------------------------------------------------------

    /// Sanitize, filter, and flesh out one title/URL pair. None means the
    /// quality filter rejected it; invalid candidates are dropped silently
    /// apart from the counter.
    fn build_candidate(
        &self,
        title: String,
        url: String,
        method: DiscoveryMethod,
        source: &SourceProfile,
        amount_text: Option<String>,
        deadline_text: Option<String>,
    ) -> Option<CandidateOpportunity> {
        let url = clean_extracted_url(&url);
        if url.is_empty() {
            return None;
        }

        let (sniffed_amount, sniffed_deadline) = extract_details(&title);
        let amount_text = amount_text.unwrap_or(sniffed_amount);
        let deadline_text = deadline_text.unwrap_or(sniffed_deadline);

        match filter::assess(&title, &url, &amount_text, &deadline_text) {
            Verdict::Accept => {}
            Verdict::Reject(reason) => {
                debug!(title = %title, reason, "Candidate rejected");
                return None;
            }
        }

        let (quality_score, reliability) = match source.origin {
            OriginClass::Federal => (8.0, Reliability::High),
            OriginClass::State => (7.0, Reliability::High),
            OriginClass::DirectCrawl => (5.0, Reliability::Medium),
        };

        Some(CandidateOpportunity {
            tags: infer_tags(&title),
            title,
            url,
            amount_text,
            deadline_text,
            method,
            enrichment: Enrichment::default(),
            quality_score,
            reliability,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_bot_defense(body: &str) -> Result<()> {
    let lower = body.to_lowercase();
    for marker in BOT_DEFENSE_MARKERS {
        if lower.contains(marker) {
            return Err(FundScoutError::BotDefense(marker.to_string()).into());
        }
    }
    Ok(())
}

fn is_funding_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    FUNDING_PATH_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Text window preceding a URL occurrence, used as a title candidate during
/// official crawl. Reaches back to the start of the line, capped at 100
/// chars, with markdown syntax stripped.
fn title_window(text: &str, url_start: usize) -> String {
    let before = &text[..url_start];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let mut window_start = line_start.max(before.len().saturating_sub(100));
    // The 100-byte cap can land inside a multibyte char; snap forward to a
    // boundary before slicing.
    while !before.is_char_boundary(window_start) {
        window_start += 1;
    }
    let window = &before[window_start..];

    window
        .replace(['[', ']', '(', ')', '*', '#', '>', '|'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c == ':' || c == '.' || c.is_whitespace())
        .to_string()
}

fn discovery_prompt(source: &SourceProfile) -> String {
    format!(
        "List K-12 education funding opportunities currently accepting applications \
         from {} ({}). Reply with one block per opportunity in exactly this format:\n\
         TITLE: <opportunity name>\n\
         AMOUNT: <award amount or n/a>\n\
         DEADLINE: <application deadline or n/a>\n\
         URL: <direct link to the opportunity>\n\
         Include only opportunities that are currently open.",
        source.name, source.url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_defense_markers_are_detected() {
        assert!(check_bot_defense("please complete the CAPTCHA to continue").is_err());
        assert!(check_bot_defense("protected by Radware").is_err());
        assert!(check_bot_defense("<h1>Grant Programs</h1>").is_ok());
    }

    #[test]
    fn funding_url_hints() {
        assert!(is_funding_url("https://tea.texas.gov/grants/math"));
        assert!(is_funding_url("https://ed.gov/funding-opportunities"));
        assert!(!is_funding_url("https://tea.texas.gov/about/contact"));
    }

    #[test]
    fn title_window_stops_at_line_start() {
        let text = "Some earlier line\n- School Safety Grant Program: https://tea.texas.gov/grants/safety";
        let start = text.find("https://").unwrap();
        assert_eq!(title_window(text, start), "School Safety Grant Program");
    }

    #[test]
    fn title_window_snaps_to_char_boundaries() {
        // Rendered markdown routinely carries curly quotes; the window cap
        // lands mid-character here.
        let text = format!(
            "{}{}Classroom Reading Grant applications open at https://ed.gov/grants/reading",
            "x".repeat(51),
            "é".repeat(40),
        );
        let start = text.find("https://").unwrap();
        let title = title_window(&text, start);
        assert!(title.contains("Classroom Reading Grant"));
    }

    #[test]
    fn title_window_strips_markdown() {
        let text = "## **District Technology Grant** (https://ed.gov/grants/tech)";
        let start = text.find("https://").unwrap();
        assert_eq!(title_window(text, start), "District Technology Grant");
    }

    #[test]
    fn prompt_names_the_source() {
        let source = crate::sources::find("tx_tea").unwrap();
        let prompt = discovery_prompt(&source);
        assert!(prompt.contains("Texas Education Agency"));
        assert!(prompt.contains("TITLE:"));
    }
}
