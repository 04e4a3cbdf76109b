use std::time::Duration;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER};
use serde::{Deserialize, Serialize};
use tracing::debug;
use watched_config::SerializdConfig;
use crate::error::SourceError;
use crate::traits::Session;

/// Name of the cookie the web app keeps its session token in
pub const SESSION_COOKIE: &str = "tvproduction";

const APP_HEADER: &str = "x-requested-with";
const APP_NAME: &str = "serializd_vercel";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    username: Option<String>,
}

/// Create a blocking client carrying the headers the Serializd web app sends
pub fn create_serializd_client(config: &SerializdConfig) -> Result<Client, SourceError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(APP_HEADER, HeaderValue::from_static(APP_NAME));
    if let Ok(origin) = HeaderValue::from_str(&config.site_url) {
        headers.insert(ORIGIN, origin.clone());
        headers.insert(REFERER, origin);
    }

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.timeout_secs.map(Duration::from_secs))
        .build()?;
    Ok(client)
}

pub fn cookie_header(token: &str) -> String {
    format!("{}={}", SESSION_COOKIE, token)
}

/// Exchange email and password for a session token
pub fn login(client: &Client, api_base_url: &str, email: &str, password: &str) -> Result<Session, SourceError> {
    let url = format!("{}/login", api_base_url.trim_end_matches('/'));
    debug!("POST {}", url);

    let response = client
        .post(&url)
        .json(&LoginRequest { email, password })
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().unwrap_or_default();
        return Err(SourceError::Auth(format!("{} - {}", status, error_text.trim())));
    }

    let body = response.text()?;
    let login: LoginResponse = serde_json::from_str(&body)
        .map_err(|e| SourceError::Auth(format!("unexpected login response: {}", e)))?;

    if login.token.is_empty() {
        return Err(SourceError::Auth("login response carried an empty token".to_string()));
    }

    Ok(Session {
        token: login.token,
        username: login.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header() {
        assert_eq!(cookie_header("abc123"), "tvproduction=abc123");
    }

    #[test]
    fn test_login_response_username_optional() {
        let login: LoginResponse = serde_json::from_str(r#"{"token":"t0k3n"}"#).unwrap();
        assert_eq!(login.token, "t0k3n");
        assert!(login.username.is_none());

        let login: LoginResponse = serde_json::from_str(r#"{"token":"t","username":"someone"}"#).unwrap();
        assert_eq!(login.username.as_deref(), Some("someone"));
    }

    #[test]
    fn test_login_response_requires_token() {
        assert!(serde_json::from_str::<LoginResponse>(r#"{"username":"someone"}"#).is_err());
    }

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(create_serializd_client(&SerializdConfig::default()).is_ok());
    }
}
