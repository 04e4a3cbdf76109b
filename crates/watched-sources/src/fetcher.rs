use serde_json::Value;
use tracing::{debug, error, info, warn};
use watched_config::SerializdConfig;
use crate::fallback::json_kind;
use crate::serializd::diary;
use crate::traits::ServiceApi;

/// What to probe and where to look for records
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub username: String,
    /// Candidate paths in priority order; `{username}` is substituted
    pub probe_endpoints: Vec<String>,
    /// Top-level keys that may hold the record list, in priority order
    pub data_keys: Vec<String>,
    /// Public diary page to scrape before using fallback data
    pub diary_url: Option<String>,
    pub site_url: String,
}

impl FetchSettings {
    pub fn from_config(config: &SerializdConfig) -> Self {
        Self {
            username: config.username.clone(),
            probe_endpoints: config.probe_endpoints.clone(),
            data_keys: config.data_keys.clone(),
            diary_url: config
                .scrape_diary
                .then(|| diary::diary_url(&config.site_url, &config.username)),
            site_url: config.site_url.clone(),
        }
    }

    /// Probe paths with the username filled in
    pub fn resolved_endpoints(&self) -> Vec<String> {
        let encoded = urlencoding::encode(&self.username);
        self.probe_endpoints
            .iter()
            .map(|path| path.replace("{username}", &encoded))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Records found in a probe response
    Upstream(Vec<Value>),
    /// Latest entry scraped from the diary page
    Diary(Vec<Value>),
    /// Nothing usable was fetched
    Fallback(Vec<Value>),
    /// Login failed; there is nothing to report
    Unauthenticated,
}

impl FetchOutcome {
    pub fn records(&self) -> &[Value] {
        match self {
            FetchOutcome::Upstream(records)
            | FetchOutcome::Diary(records)
            | FetchOutcome::Fallback(records) => records,
            FetchOutcome::Unauthenticated => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Upstream(_) => "upstream",
            FetchOutcome::Diary(_) => "diary",
            FetchOutcome::Fallback(_) => "fallback",
            FetchOutcome::Unauthenticated => "unauthenticated",
        }
    }
}

pub struct Fetcher<A: ServiceApi> {
    api: A,
    settings: FetchSettings,
    fallback: Vec<Value>,
}

impl<A: ServiceApi> Fetcher<A> {
    pub fn new(api: A, settings: FetchSettings, fallback: Vec<Value>) -> Self {
        Self { api, settings, fallback }
    }

    /// Log in, probe for watch history and degrade to fallback data.
    ///
    /// Never fails: a login error yields `Unauthenticated`, anything after
    /// login yields `Fallback`.
    pub fn fetch(&mut self, email: &str, password: &str) -> FetchOutcome {
        match self.api.login(email, password) {
            Ok(session) => match session.username.as_deref() {
                Some(name) => info!("Login successful (user {})", name),
                None => info!("Login successful"),
            },
            Err(e) => {
                error!("Login failed: {}", e);
                return FetchOutcome::Unauthenticated;
            }
        }

        if let Some(records) = self.probe() {
            info!("Found {} watched records upstream", records.len());
            return FetchOutcome::Upstream(records);
        }

        if let Some(records) = self.scrape_diary() {
            return FetchOutcome::Diary(records);
        }

        info!("No watch history available, using {} fallback records", self.fallback.len());
        FetchOutcome::Fallback(self.fallback.clone())
    }

    /// First probe answering 200 with JSON, reduced to its record list
    fn probe(&self) -> Option<Vec<Value>> {
        let (endpoint, body) = self.first_json_response()?;
        let records = extract_records(&body, &self.settings.data_keys);
        if records.is_none() {
            warn!("No watched records found in response from {}", endpoint);
        }
        records
    }

    fn first_json_response(&self) -> Option<(String, Value)> {
        for endpoint in self.settings.resolved_endpoints() {
            info!("Trying endpoint: {}", endpoint);
            match self.api.get_json(&endpoint) {
                Ok(body) => {
                    info!("Found user data at {}", endpoint);
                    return Some((endpoint, body));
                }
                Err(e) => warn!("{}", e),
            }
        }
        warn!("None of {} endpoints returned user data", self.settings.probe_endpoints.len());
        None
    }

    fn scrape_diary(&self) -> Option<Vec<Value>> {
        let url = self.settings.diary_url.as_deref()?;
        info!("Scraping diary page {}", url);

        let html = match self.api.get_page(url) {
            Ok(html) => html,
            Err(e) => {
                warn!("Diary page unavailable: {}", e);
                return None;
            }
        };

        match diary::parse_latest_episode(&html, &self.settings.site_url) {
            Some(latest) => {
                info!(title = %latest.show_title, season = ?latest.season, episode = %latest.episode, "Latest diary entry");
                Some(vec![latest.to_record()])
            }
            None => {
                debug!("Diary page has no server-rendered episode links");
                None
            }
        }
    }
}

/// Pull the record list out of a probe response.
///
/// The first configured key present in the object wins, even when its value
/// is unusable. Returns `None` for a non-object body, no matching key, a
/// non-array value or an empty array.
pub fn extract_records(body: &Value, data_keys: &[String]) -> Option<Vec<Value>> {
    let object = match body.as_object() {
        Some(object) => object,
        None => {
            debug!("Response body is a JSON {}, not an object", json_kind(body));
            return None;
        }
    };
    debug!("Keys in user data: {:?}", object.keys().collect::<Vec<_>>());

    let (key, value) = data_keys
        .iter()
        .find_map(|key| object.get(key).map(|value| (key, value)))?;
    info!("Found '{}' in user data", key);

    match value {
        Value::Array(records) if !records.is_empty() => Some(records.clone()),
        Value::Array(_) => None,
        other => {
            debug!("'{}' holds a JSON {}, expected an array", key, json_kind(other));
            None
        }
    }
}
