//! Transport to the Hue bridge.
//!
//! The trait exists so the origin logic can be tested against canned
//! payloads; [`HttpBridge`] is the real thing. Hue bridges serve the CLIP
//! v2 API over HTTPS with a self-signed certificate, authenticated by the
//! `hue-application-key` header.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::PhilipsError;

fn default_timeout() -> u64 {
    30
}

/// Connection settings for one Hue bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Bridge hostname or IP address.
    pub host: String,
    /// Application key obtained from the bridge pairing flow.
    pub token: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Raw access to CLIP v2 resource collections.
#[async_trait]
pub trait BridgeTransport: Send + Sync {
    /// Fetch the `data` array of `/clip/v2/resource/{rtype}`.
    async fn get_resource(&self, rtype: &str) -> Result<Vec<serde_json::Value>, PhilipsError>;

    /// PUT a body against `/clip/v2/resource/{rtype}/{id}`.
    async fn put_resource(
        &self,
        rtype: &str,
        id: &str,
        body: serde_json::Value,
    ) -> Result<(), PhilipsError>;
}

#[derive(Debug, Deserialize)]
struct ResourceEnvelope {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// HTTPS transport against a real bridge.
pub struct HttpBridge {
    client: reqwest::Client,
    base: String,
    token: String,
}

impl HttpBridge {
    /// Build a client for the configured bridge.
    ///
    /// # Errors
    ///
    /// Returns [`PhilipsError::Http`] when the client cannot be built.
    pub fn new(config: &BridgeConfig) -> Result<Self, PhilipsError> {
        // bridges ship a self-signed certificate for their local address
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            client,
            base: format!("https://{}/clip/v2/resource", config.host),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl BridgeTransport for HttpBridge {
    async fn get_resource(&self, rtype: &str) -> Result<Vec<serde_json::Value>, PhilipsError> {
        let response = self
            .client
            .get(format!("{}/{rtype}", self.base))
            .header("hue-application-key", &self.token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PhilipsError::Status(response.status().as_u16()));
        }
        let envelope: ResourceEnvelope = response.json().await?;
        Ok(envelope.data)
    }

    async fn put_resource(
        &self,
        rtype: &str,
        id: &str,
        body: serde_json::Value,
    ) -> Result<(), PhilipsError> {
        let response = self
            .client
            .put(format!("{}/{rtype}/{id}", self.base))
            .header("hue-application-key", &self.token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PhilipsError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_timeout_when_deserializing_config() {
        let config: BridgeConfig =
            serde_json::from_value(serde_json::json!({"host": "bridge.local", "token": "key"}))
                .unwrap();
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn should_build_http_client_from_config() {
        let config = BridgeConfig {
            host: "192.168.1.10".to_string(),
            token: "key".to_string(),
            timeout_secs: 5,
        };
        let bridge = HttpBridge::new(&config).unwrap();
        assert_eq!(bridge.base, "https://192.168.1.10/clip/v2/resource");
    }
}
