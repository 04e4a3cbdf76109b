use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info};
use watched_config::SerializdConfig;
use crate::error::SourceError;
use crate::serializd::auth;
use crate::traits::{ServiceApi, Session};

pub struct SerializdClient {
    client: Client,
    api_base_url: String,
    token: Option<String>,
}

impl SerializdClient {
    pub fn from_config(config: &SerializdConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: auth::create_serializd_client(config)?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    fn token(&self) -> Result<&str, SourceError> {
        self.token.as_deref().ok_or(SourceError::NotAuthenticated)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

impl ServiceApi for SerializdClient {
    fn login(&mut self, email: &str, password: &str) -> Result<Session, SourceError> {
        info!("Logging in to Serializd as {}", email);
        let session = auth::login(&self.client, &self.api_base_url, email, password)?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    fn get_json(&self, path: &str) -> Result<Value, SourceError> {
        let token = self.token()?;
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(COOKIE, auth::cookie_header(token))
            .send()?;

        let status = response.status();
        debug!("{} responded {}", path, status);
        if status != StatusCode::OK {
            return Err(SourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|source| SourceError::Decode {
            path: path.to_string(),
            source,
        })
    }

    fn get_page(&self, url: &str) -> Result<String, SourceError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                path: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text()?)
    }
}
