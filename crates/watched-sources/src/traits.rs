use serde_json::Value;
use crate::error::SourceError;

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: Option<String>,
}

/// HTTP operations the fetcher needs from a tracking service.
///
/// `get_json` succeeds only for a 200 response whose body parses as JSON.
pub trait ServiceApi {
    fn login(&mut self, email: &str, password: &str) -> Result<Session, SourceError>;

    fn get_json(&self, path: &str) -> Result<Value, SourceError>;

    /// Fetch a public HTML page by absolute URL
    fn get_page(&self, url: &str) -> Result<String, SourceError>;
}
