use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crawler_client::CrawlerClient;
use fundscout_common::Config;
use fundscout_scout::scout::Scout;
use fundscout_scout::sources;
use fundscout_scout::traits::{ContentFetcher, LogSender, QueryService};
use fundscout_store::Store;
use query_client::QueryClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fundscout=info".parse()?))
        .init();

    info!("FundScout starting...");

    let config = Config::from_env();

    let store = Store::connect(&config.database_url).await?;

    let fetcher: Option<Box<dyn ContentFetcher>> = config
        .crawler_base_url
        .as_deref()
        .map(|base| {
            Box::new(CrawlerClient::new(base, config.crawler_api_key.as_deref()))
                as Box<dyn ContentFetcher>
        });

    let query: Option<Box<dyn QueryService>> = config.query_api_key.as_deref().map(|key| {
        let mut client = QueryClient::new(key, &config.query_model);
        if let Some(base) = config.query_base_url.as_deref() {
            client = client.with_base_url(base);
        }
        Box::new(client) as Box<dyn QueryService>
    });

    let scout = Scout::new(store, fetcher, query, Box::new(LogSender))?;

    let (stats, report) = scout.run(&sources::roster()).await?;
    report.save(&stats)?;

    info!("Scout run complete. {stats}");

    Ok(())
}
