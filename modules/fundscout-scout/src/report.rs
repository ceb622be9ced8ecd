//! Run report — persisted JSON record of what happened to every source in a
//! discovery run. One file per run under `{DATA_DIR}/runs/`.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::scout::ScoutStats;

/// Root data directory, controlled by `DATA_DIR` env var (default: `"data"`).
pub fn data_dir() -> PathBuf {
    PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    outcomes: Vec<SourceOutcome>,
}

#[derive(Serialize)]
pub struct SourceOutcome {
    pub source_id: String,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Terminal state of one source in one run. Failures live here, in the
/// report, not in the run's return value: a dead source never aborts the
/// sources after it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Found {
        method: String,
        candidates: u32,
        stored: u32,
    },
    Empty,
    Skipped {
        status: String,
    },
    Failed {
        reason: String,
    },
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, source_id: &str, outcome: Outcome) {
        self.outcomes.push(SourceOutcome {
            source_id: source_id.to_string(),
            ts: Utc::now(),
            outcome,
        });
    }

    pub fn outcomes(&self) -> &[SourceOutcome] {
        &self.outcomes
    }

    /// Serialize the report to JSON and write to disk.
    /// Returns the file path on success.
    pub fn save(&self, stats: &ScoutStats) -> Result<PathBuf> {
        let dir = data_dir().join("runs");
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.json", self.run_id));

        let output = SerializedReport {
            run_id: &self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            stats,
            outcomes: &self.outcomes,
        };

        std::fs::write(&path, serde_json::to_string_pretty(&output)?)?;
        info!(path = %path.display(), sources = self.outcomes.len(), "Run report saved");

        Ok(path)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct SerializedReport<'a> {
    run_id: &'a str,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    stats: &'a ScoutStats,
    outcomes: &'a [SourceOutcome],
}
