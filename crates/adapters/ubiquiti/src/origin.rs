//! Origin port implementation for one UniFi controller.

use async_trait::async_trait;

use luma_app::ports::{Origin, OriginCommand};
use luma_domain::error::LumaError;
use luma_domain::snapshot::{ClientState, OriginSnapshot};
use luma_domain::time::now;

use crate::error::UbiquitiError;
use crate::payload::StationEntry;
use crate::transport::ControllerTransport;

/// One UniFi controller exposed as an origin.
pub struct UbiquitiOrigin<T> {
    name: String,
    transport: T,
}

impl<T: ControllerTransport> UbiquitiOrigin<T> {
    pub fn new(name: impl Into<String>, transport: T) -> Self {
        Self {
            name: name.into(),
            transport,
        }
    }

    async fn snapshot(&self) -> Result<OriginSnapshot, UbiquitiError> {
        let raw = self.transport.stations().await?;
        let taken = now();
        let mut snapshot = OriginSnapshot::new(taken);

        for value in raw {
            let station: StationEntry = match serde_json::from_value(value) {
                Ok(station) => station,
                Err(error) => {
                    tracing::warn!(origin = %self.name, %error, "skipping malformed station");
                    continue;
                }
            };
            let label = station.display().map(str::to_string);
            let last_seen = station.seen_at().unwrap_or(taken);
            snapshot.clients.insert(
                station.mac.to_lowercase(),
                ClientState { label, last_seen },
            );
        }

        Ok(snapshot)
    }
}

#[async_trait]
impl<T: ControllerTransport> Origin for UbiquitiOrigin<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn refresh(&self) -> Result<OriginSnapshot, LumaError> {
        self.snapshot().await.map_err(|err| err.into_luma(&self.name))
    }

    async fn perform(&self, _command: &OriginCommand) -> Result<(), LumaError> {
        Err(UbiquitiError::Unsupported.into_luma(&self.name))
    }
}
