use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Request};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::provider::{ModifyOutcome, RecordUpdater};
use crate::config::Settings;
use crate::error::Result;
use crate::sign::{sign, CanonicalHeaders, Credentials};
use crate::util::read_max;

pub const DNSPOD_API_HOST: &str = "dnspod.tencentcloudapi.com";
pub const DNSPOD_ENDPOINT: &str = "https://dnspod.tencentcloudapi.com";
pub const DNSPOD_VERSION: &str = "2021-03-23";
pub const MODIFY_DYNAMIC_DNS: &str = "ModifyDynamicDNS";

const CONTENT_TYPE: &str = "application/json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RESPONSE_BODY: usize = 4 * 1024;

/// Body of the `ModifyDynamicDNS` action. Without a `Value` field DNSPod uses
/// the address the request came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyDynamicDnsRequest {
    pub domain: String,
    pub sub_domain: String,
    pub record_id: u64,
    pub record_line: String,
    pub ttl: u32,
}

impl From<&Settings> for ModifyDynamicDnsRequest {
    fn from(settings: &Settings) -> Self {
        Self {
            domain: settings.domain.clone(),
            sub_domain: settings.sub_domain.clone(),
            record_id: settings.record_id,
            record_line: settings.record_line.clone(),
            ttl: settings.ttl,
        }
    }
}

pub struct DnspodClient {
    client: Client,
    endpoint: String,
    credentials: Credentials,
    payload: ModifyDynamicDnsRequest,
}

impl DnspodClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: DNSPOD_ENDPOINT.to_string(),
            credentials: settings.credentials(),
            payload: ModifyDynamicDnsRequest::from(settings),
        })
    }

    /// Send requests somewhere other than the public API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Build the signed request as it would be sent at `now`.
    pub fn build_request(&self, now: DateTime<Utc>) -> Result<Request> {
        let body = serde_json::to_vec(&self.payload)?;

        let headers = CanonicalHeaders::normalize([
            ("Host", DNSPOD_API_HOST),
            ("Content-Type", CONTENT_TYPE),
            ("X-TC-Action", MODIFY_DYNAMIC_DNS),
        ]);
        let authorization = sign("POST", "", &headers, &body, now, &self.credentials);

        let request = self
            .client
            .post(&self.endpoint)
            .header("Host", DNSPOD_API_HOST)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-TC-Timestamp", now.timestamp().to_string())
            .header("Authorization", authorization)
            .header("X-TC-Action", MODIFY_DYNAMIC_DNS)
            .header("X-TC-Version", DNSPOD_VERSION)
            .body(body)
            .build()?;

        Ok(request)
    }
}

#[async_trait]
impl RecordUpdater for DnspodClient {
    async fn update_record(&self) -> Result<ModifyOutcome> {
        let request = self.build_request(Utc::now())?;
        debug!(
            "Calling {} for {}.{}",
            MODIFY_DYNAMIC_DNS, self.payload.sub_domain, self.payload.domain
        );

        let response = self.client.execute(request).await?;
        let status = response.status();
        let bounded = read_max(response.bytes_stream(), MAX_RESPONSE_BODY).await?;
        let body = String::from_utf8_lossy(&bounded.bytes).into_owned();

        if bounded.exceeded {
            warn!(
                status = %status,
                max_body_size = MAX_RESPONSE_BODY,
                "{} response body too large: {}",
                MODIFY_DYNAMIC_DNS,
                body
            );
        } else {
            info!(status = %status, "{} response: {}", MODIFY_DYNAMIC_DNS, body);
        }

        Ok(ModifyOutcome {
            status,
            body,
            truncated: bounded.exceeded,
        })
    }

    fn provider_name(&self) -> &'static str {
        "dnspod"
    }
}
