use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a monitored source. Only `Active` sources are scraped;
/// `NeedsVerification` sources still run but their finds are flagged for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Active,
    NeedsVerification,
    Blocked,
    Inactive,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceStatus::Active => write!(f, "active"),
            SourceStatus::NeedsVerification => write!(f, "needs_verification"),
            SourceStatus::Blocked => write!(f, "blocked"),
            SourceStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Where a source sits in the funding chain. Drives baseline quality scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginClass {
    State,
    Federal,
    DirectCrawl,
}

impl fmt::Display for OriginClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginClass::State => write!(f, "state"),
            OriginClass::Federal => write!(f, "federal"),
            OriginClass::DirectCrawl => write!(f, "direct_crawl"),
        }
    }
}

/// Which pipeline strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    OfficialCrawl,
    AiDiscovery,
    Structural,
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryMethod::OfficialCrawl => write!(f, "official_crawl"),
            DiscoveryMethod::AiDiscovery => write!(f, "ai_discovery"),
            DiscoveryMethod::Structural => write!(f, "structural"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    High,
    Medium,
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reliability::High => write!(f, "high"),
            Reliability::Medium => write!(f, "medium"),
        }
    }
}

/// A monitored funding source. The roster lives in code and is edited
/// out-of-band, so profiles are plain data validated by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Stable identifier, never shown to users. Subscriptions key off this.
    pub id: String,
    pub name: String,
    /// Canonical funding-programs page.
    pub url: String,
    /// CSS selectors tried in order; the first one that matches wins.
    pub selectors: Vec<String>,
    pub status: SourceStatus,
    pub origin: OriginClass,
}

/// Detail fields mined from an opportunity's own page. All optional;
/// enrichment is best-effort and never blocks a candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enrichment {
    pub eligibility: Option<String>,
    pub description: Option<String>,
    pub contact: Option<String>,
    pub application_process: Option<String>,
}

/// An opportunity as extracted, before the identity gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateOpportunity {
    pub title: String,
    pub url: String,
    /// Display text, e.g. "$1.5M" or "Amount TBD". Never parsed for storage.
    pub amount_text: String,
    /// Display text, e.g. "March 15, 2026" or "See website for details".
    pub deadline_text: String,
    pub tags: Vec<String>,
    pub method: DiscoveryMethod,
    pub enrichment: Enrichment,
    /// 0.0 to 10.0.
    pub quality_score: f32,
    pub reliability: Reliability,
}

/// An opportunity as persisted, with its dedup identity assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredOpportunity {
    pub identity: String,
    pub source_id: String,
    pub source_name: String,
    pub title: String,
    pub url: String,
    pub amount_text: String,
    pub deadline_text: String,
    pub tags: Vec<String>,
    pub method: DiscoveryMethod,
    pub enrichment: Enrichment,
    pub quality_score: f32,
    pub reliability: Reliability,
    pub found_at: DateTime<Utc>,
}

impl StoredOpportunity {
    pub fn from_candidate(
        candidate: CandidateOpportunity,
        identity: String,
        source: &SourceProfile,
    ) -> Self {
        Self {
            identity,
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            title: candidate.title,
            url: candidate.url,
            amount_text: candidate.amount_text,
            deadline_text: candidate.deadline_text,
            tags: candidate.tags,
            method: candidate.method,
            enrichment: candidate.enrichment,
            quality_score: candidate.quality_score,
            reliability: candidate.reliability,
            found_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFrequency {
    Daily,
    Weekly,
}

impl fmt::Display for AlertFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertFrequency::Daily => write!(f, "daily"),
            AlertFrequency::Weekly => write!(f, "weekly"),
        }
    }
}

/// An alert subscription. `source_ids` holds stable source identifiers,
/// not display names, so renaming a source never detaches subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    pub frequency: AlertFrequency,
    pub source_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}
