use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ExternalIpGetterConfig;
use crate::error::{Error, Result};
use crate::util::read_max;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RESPONSE_BODY: usize = 1024;

#[async_trait]
pub trait PublicIpSource: Send + Sync {
    async fn public_ip(&self) -> Result<IpAddr>;
}

/// Asks an IP-echo service (ipify and the like) which address we come from.
pub struct ExternalIpGetter {
    client: Client,
    url: String,
}

impl ExternalIpGetter {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Uses the first configured URL; the rest are never queried.
    pub fn from_config(config: &ExternalIpGetterConfig) -> Result<Self> {
        let url = config.urls.first().ok_or(Error::NoGetterUrl)?;
        Self::new(url.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PublicIpSource for ExternalIpGetter {
    async fn public_ip(&self) -> Result<IpAddr> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        let bounded = read_max(response.bytes_stream(), MAX_RESPONSE_BODY).await?;
        if bounded.exceeded {
            return Err(Error::BodyTooLarge {
                limit: MAX_RESPONSE_BODY,
            });
        }

        debug!(
            status = %status,
            "Public IP response from {}: {:?}",
            self.url,
            String::from_utf8_lossy(&bounded.bytes)
        );

        parse_ip_body(&bounded.bytes)
    }
}

/// The whole body, minus surrounding whitespace, must be an IP literal.
fn parse_ip_body(body: &[u8]) -> Result<IpAddr> {
    let invalid = || Error::InvalidIp {
        body: String::from_utf8_lossy(body).into_owned(),
    };

    let text = std::str::from_utf8(body).map_err(|_| invalid())?;
    text.trim().parse().map_err(|_| invalid())
}
