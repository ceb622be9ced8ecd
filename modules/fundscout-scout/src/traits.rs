// Trait abstractions for the scout's external collaborators.
//
// ContentFetcher wraps the content-crawling service, QueryService the
// language-query service, AlertSender the notification channel. All three
// are constructor-injected so tests run with mocks: no network, no keys.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch a URL rendered to readable text (markdown).
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[async_trait]
pub trait QueryService: Send + Sync {
    /// Send a prompt to the language-query service, get free text back.
    async fn ask(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait AlertSender: Send + Sync {
    /// Fire-and-forget delivery; failures are the implementation's problem
    /// to log, never the run's problem to abort on.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

#[async_trait]
impl ContentFetcher for crawler_client::CrawlerClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        Ok(self.fetch(url).await?)
    }
}

#[async_trait]
impl QueryService for query_client::QueryClient {
    async fn ask(&self, prompt: &str) -> Result<String> {
        Ok(self.ask(prompt).await?)
    }
}

/// Sender used when no delivery channel is configured: logs the alert and
/// succeeds. Real delivery (SMTP relay) is an external collaborator.
pub struct LogSender;

#[async_trait]
impl AlertSender for LogSender {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!(recipient, subject, body_chars = body.len(), "Alert (log only)");
        Ok(())
    }
}
