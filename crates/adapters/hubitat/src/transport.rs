//! Transport to the Hubitat Maker API.
//!
//! The Maker API is an app installed on the hub; every call carries the app
//! id in the path and the access token as a query parameter.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::HubitatError;

fn default_timeout() -> u64 {
    30
}

/// Connection settings for one hub's Maker API app.
#[derive(Debug, Clone, Deserialize)]
pub struct MakerConfig {
    /// Hub hostname or IP address.
    pub host: String,
    /// Maker API app id.
    pub app_id: String,
    /// Maker API access token.
    pub token: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Raw access to the Maker API endpoints.
#[async_trait]
pub trait MakerTransport: Send + Sync {
    /// Fetch `/devices/all` as raw JSON entries.
    async fn devices(&self) -> Result<Vec<serde_json::Value>, HubitatError>;

    /// Issue `/devices/{id}/{command}[/{argument}]`.
    async fn command(
        &self,
        device: &str,
        command: &str,
        argument: Option<&str>,
    ) -> Result<(), HubitatError>;
}

/// HTTP transport against a real hub.
pub struct HttpMaker {
    client: reqwest::Client,
    base: String,
    token: String,
}

impl HttpMaker {
    /// Build a client for the configured hub.
    ///
    /// # Errors
    ///
    /// Returns [`HubitatError::Http`] when the client cannot be built.
    pub fn new(config: &MakerConfig) -> Result<Self, HubitatError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base: format!("http://{}/apps/api/{}", config.host, config.app_id),
            token: config.token.clone(),
        })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, HubitatError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base))
            .query(&[("access_token", self.token.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(HubitatError::Status(response.status().as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl MakerTransport for HttpMaker {
    async fn devices(&self) -> Result<Vec<serde_json::Value>, HubitatError> {
        let response = self.get("/devices/all").await?;
        Ok(response.json().await?)
    }

    async fn command(
        &self,
        device: &str,
        command: &str,
        argument: Option<&str>,
    ) -> Result<(), HubitatError> {
        let path = match argument {
            Some(argument) => format!("/devices/{device}/{command}/{argument}"),
            None => format!("/devices/{device}/{command}"),
        };
        self.get(&path).await?;
        Ok(())
    }
}
