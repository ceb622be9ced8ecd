//! Opportunity and subscriber persistence backed by SQLite.
//!
//! The identity column is the dedup gate: `insert_if_absent` uses
//! `INSERT OR IGNORE` so re-discovering a stored opportunity is a silent
//! no-op, never an error. Writes are serialized (single connection), which
//! matches the one-source-at-a-time batch model.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;

use fundscout_common::normalize::extract_dollar_amount;
use fundscout_common::{
    AlertFrequency, DiscoveryMethod, Enrichment, Reliability, StoredOpportunity, Subscriber,
};

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreStats {
    pub total_opportunities: i64,
    pub total_subscribers: i64,
    /// Sum of all parseable amounts. Opportunities with no numeric amount
    /// contribute zero.
    pub total_funding: f64,
}

impl Store {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS opportunities (
                identity            TEXT PRIMARY KEY,
                source_id           TEXT NOT NULL,
                source_name         TEXT NOT NULL,
                title               TEXT NOT NULL,
                url                 TEXT NOT NULL,
                amount_text         TEXT NOT NULL,
                deadline_text       TEXT NOT NULL,
                tags                TEXT NOT NULL,
                method              TEXT NOT NULL,
                eligibility         TEXT,
                description         TEXT,
                contact             TEXT,
                application_process TEXT,
                quality_score       REAL NOT NULL,
                reliability         TEXT NOT NULL,
                found_at            TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                email      TEXT PRIMARY KEY,
                frequency  TEXT NOT NULL,
                source_ids TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_opportunities_found_at ON opportunities (found_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert an opportunity unless its identity is already present.
    /// Returns true if a new row was written.
    pub async fn insert_if_absent(&self, opp: &StoredOpportunity) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO opportunities
                (identity, source_id, source_name, title, url, amount_text, deadline_text,
                 tags, method, eligibility, description, contact, application_process,
                 quality_score, reliability, found_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&opp.identity)
        .bind(&opp.source_id)
        .bind(&opp.source_name)
        .bind(&opp.title)
        .bind(&opp.url)
        .bind(&opp.amount_text)
        .bind(&opp.deadline_text)
        .bind(serde_json::to_string(&opp.tags)?)
        .bind(opp.method.to_string())
        .bind(&opp.enrichment.eligibility)
        .bind(&opp.enrichment.description)
        .bind(&opp.enrichment.contact)
        .bind(&opp.enrichment.application_process)
        .bind(opp.quality_score as f64)
        .bind(opp.reliability.to_string())
        .bind(opp.found_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Most recent opportunities, newest first, with offset/limit paging
    /// and an optional source filter.
    pub async fn list_recent(
        &self,
        limit: i64,
        offset: i64,
        source_id: Option<&str>,
    ) -> Result<Vec<StoredOpportunity>> {
        let rows = match source_id {
            Some(sid) => {
                sqlx::query(
                    r#"
                    SELECT * FROM opportunities
                    WHERE source_id = ?
                    ORDER BY found_at DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(sid)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT * FROM opportunities
                    ORDER BY found_at DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(opportunity_from_row).collect()
    }

    /// Create or replace a subscription. Last write wins on email.
    pub async fn upsert_subscriber(&self, sub: &Subscriber) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO subscribers (email, frequency, source_ids, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&sub.email)
        .bind(sub.frequency.to_string())
        .bind(serde_json::to_string(&sub.source_ids)?)
        .bind(sub.created_at)
        .execute(&self.pool)
        .await?;

        info!(email = %sub.email, sources = sub.source_ids.len(), "Subscriber saved");
        Ok(())
    }

    pub async fn subscribers(&self) -> Result<Vec<Subscriber>> {
        let rows = sqlx::query("SELECT email, frequency, source_ids, created_at FROM subscribers")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(subscriber_from_row).collect()
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let total_opportunities =
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM opportunities")
                .fetch_one(&self.pool)
                .await?
                .0;

        let total_subscribers = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM subscribers")
            .fetch_one(&self.pool)
            .await?
            .0;

        let amounts = sqlx::query_as::<_, (String,)>("SELECT amount_text FROM opportunities")
            .fetch_all(&self.pool)
            .await?;

        let total_funding: f64 = amounts
            .iter()
            .filter_map(|(text,)| extract_dollar_amount(text))
            .sum();

        Ok(StoreStats {
            total_opportunities,
            total_subscribers,
            total_funding,
        })
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn opportunity_from_row(row: &SqliteRow) -> Result<StoredOpportunity> {
    let tags: Vec<String> = serde_json::from_str(row.try_get("tags")?)?;
    let found_at: DateTime<Utc> = row.try_get("found_at")?;

    Ok(StoredOpportunity {
        identity: row.try_get("identity")?,
        source_id: row.try_get("source_id")?,
        source_name: row.try_get("source_name")?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        amount_text: row.try_get("amount_text")?,
        deadline_text: row.try_get("deadline_text")?,
        tags,
        method: method_from_str(row.try_get("method")?)?,
        enrichment: Enrichment {
            eligibility: row.try_get("eligibility")?,
            description: row.try_get("description")?,
            contact: row.try_get("contact")?,
            application_process: row.try_get("application_process")?,
        },
        quality_score: row.try_get::<f64, _>("quality_score")? as f32,
        reliability: reliability_from_str(row.try_get("reliability")?)?,
        found_at,
    })
}

fn subscriber_from_row(row: &SqliteRow) -> Result<Subscriber> {
    let source_ids: Vec<String> = serde_json::from_str(row.try_get("source_ids")?)?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Subscriber {
        email: row.try_get("email")?,
        frequency: frequency_from_str(row.try_get("frequency")?)?,
        source_ids,
        created_at,
    })
}

fn method_from_str(s: &str) -> Result<DiscoveryMethod> {
    match s {
        "official_crawl" => Ok(DiscoveryMethod::OfficialCrawl),
        "ai_discovery" => Ok(DiscoveryMethod::AiDiscovery),
        "structural" => Ok(DiscoveryMethod::Structural),
        other => anyhow::bail!("unknown discovery method in database: {other}"),
    }
}

fn reliability_from_str(s: &str) -> Result<Reliability> {
    match s {
        "high" => Ok(Reliability::High),
        "medium" => Ok(Reliability::Medium),
        other => anyhow::bail!("unknown reliability in database: {other}"),
    }
}

fn frequency_from_str(s: &str) -> Result<AlertFrequency> {
    match s {
        "daily" => Ok(AlertFrequency::Daily),
        "weekly" => Ok(AlertFrequency::Weekly),
        other => anyhow::bail!("unknown alert frequency in database: {other}"),
    }
}
