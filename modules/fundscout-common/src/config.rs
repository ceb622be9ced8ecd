use std::env;

/// Application configuration loaded from environment variables.
///
/// Service credentials are optional: a missing crawler URL or query key
/// disables the corresponding discovery strategy instead of failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Content-crawling service
    pub crawler_base_url: Option<String>,
    pub crawler_api_key: Option<String>,

    // Language-query service
    pub query_api_key: Option<String>,
    pub query_base_url: Option<String>,
    pub query_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:fundscout.db?mode=rwc".to_string()),
            crawler_base_url: optional_env("CRAWLER_BASE_URL"),
            crawler_api_key: optional_env("CRAWLER_API_KEY"),
            query_api_key: optional_env("QUERY_API_KEY"),
            query_base_url: optional_env("QUERY_BASE_URL"),
            query_model: env::var("QUERY_MODEL").unwrap_or_else(|_| "sonar".to_string()),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
