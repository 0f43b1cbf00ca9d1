//! Transport to a UniFi OS controller.
//!
//! Controllers authenticate with a session cookie obtained from
//! `/api/auth/login` and serve the network application under
//! `/proxy/network`. Consoles ship a self-signed certificate.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::UbiquitiError;

fn default_timeout() -> u64 {
    30
}

fn default_site() -> String {
    "default".to_string()
}

/// Connection settings for one UniFi controller.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// Controller hostname or IP address.
    pub host: String,
    pub username: String,
    pub password: String,
    /// Network application site name.
    #[serde(default = "default_site")]
    pub site: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Raw access to the station list.
#[async_trait]
pub trait ControllerTransport: Send + Sync {
    /// Fetch `stat/sta` as raw JSON entries.
    async fn stations(&self) -> Result<Vec<serde_json::Value>, UbiquitiError>;
}

#[derive(Debug, Deserialize)]
struct StationEnvelope {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// HTTPS transport against a real controller.
pub struct HttpController {
    client: reqwest::Client,
    base: String,
    site: String,
    username: String,
    password: String,
    session: RwLock<Option<String>>,
}

impl HttpController {
    /// Build a client for the configured controller.
    ///
    /// # Errors
    ///
    /// Returns [`UbiquitiError::Http`] when the client cannot be built.
    pub fn new(config: &ControllerConfig) -> Result<Self, UbiquitiError> {
        // consoles ship a self-signed certificate for their local address
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            client,
            base: format!("https://{}", config.host),
            site: config.site.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            session: RwLock::new(None),
        })
    }

    async fn login(&self) -> Result<String, UbiquitiError> {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.base))
            .json(&serde_json::json!({
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(UbiquitiError::Status(response.status().as_u16()));
        }
        let cookie = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .collect::<Vec<_>>()
            .join("; ");
        if cookie.is_empty() {
            return Err(UbiquitiError::MissingSession);
        }
        *self.session.write().await = Some(cookie.clone());
        Ok(cookie)
    }

    async fn session(&self) -> Result<String, UbiquitiError> {
        if let Some(cookie) = self.session.read().await.clone() {
            return Ok(cookie);
        }
        self.login().await
    }

    async fn fetch_stations(&self, cookie: &str) -> Result<reqwest::Response, UbiquitiError> {
        let response = self
            .client
            .get(format!(
                "{}/proxy/network/api/s/{}/stat/sta",
                self.base, self.site
            ))
            .header(reqwest::header::COOKIE, cookie)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl ControllerTransport for HttpController {
    async fn stations(&self) -> Result<Vec<serde_json::Value>, UbiquitiError> {
        let cookie = self.session().await?;
        let mut response = self.fetch_stations(&cookie).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            // session expired, log in again and retry once
            let cookie = self.login().await?;
            response = self.fetch_stations(&cookie).await?;
        }
        if !response.status().is_success() {
            return Err(UbiquitiError::Status(response.status().as_u16()));
        }
        let envelope: StationEnvelope = response.json().await?;
        Ok(envelope.data)
    }
}
