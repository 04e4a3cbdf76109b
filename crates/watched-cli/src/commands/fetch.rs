use chrono::Utc;
use tracing::{error, info};
use watched_config::Config;
use watched_models::WatchedItem;
use watched_sources::{load_fallback, normalize, FetchSettings, Fetcher, SerializdClient};

/// Fetch and normalize watch history. Never fails; the worst case is an empty list.
pub fn run_fetch(email: &str, password: &str, config: &Config) -> Vec<WatchedItem> {
    tracing::debug!("Fetch command started");
    let serializd = &config.serializd;

    let client = match SerializdClient::from_config(serializd) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create Serializd client: {}", e);
            return Vec::new();
        }
    };

    let fallback = load_fallback(serializd.fallback_file.as_deref(), Utc::now());
    let mut fetcher = Fetcher::new(client, FetchSettings::from_config(serializd), fallback);
    let outcome = fetcher.fetch(email, password);

    let items = normalize(outcome.records());
    info!(source = outcome.label(), items = items.len(), "Watch history ready");
    items
}
