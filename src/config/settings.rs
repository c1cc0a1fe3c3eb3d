use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::sign::Credentials;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_interval", alias = "intervalS")]
    pub interval_seconds: u64,
    #[serde(alias = "secretKey")]
    pub secret_key: String,
    #[serde(alias = "secretId")]
    pub secret_id: String,
    #[serde(default, alias = "updateAtStartup")]
    pub update_at_startup: bool,

    pub domain: String,
    #[serde(alias = "subDomain")]
    pub sub_domain: String,
    #[serde(alias = "recordId")]
    pub record_id: u64,
    #[serde(alias = "recordLine")]
    pub record_line: String,
    pub ttl: u32,

    #[serde(default = "default_log_level", alias = "logLevel")]
    pub log_level: String,

    // Must stay last: TOML tables cannot precede plain values
    #[serde(default, alias = "externalPublicIPGetter")]
    pub external_ip_getter: ExternalIpGetterConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalIpGetterConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Only the first URL is queried.
    #[serde(default)]
    pub urls: Vec<String>,
}

pub const DEFAULT_INTERVAL_SECONDS: u64 = 300; // 5 minutes

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECONDS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Read a config file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let settings: Settings = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        };

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_seconds == 0 {
            bail!("interval seconds must be greater than zero");
        }
        if self.secret_key.is_empty() {
            bail!("secret key is required");
        }
        if self.secret_id.is_empty() {
            bail!("secret ID is required");
        }
        if self.domain.is_empty() {
            bail!("domain is required");
        }
        if self.sub_domain.is_empty() {
            bail!("sub domain is required");
        }
        if self.record_id == 0 {
            bail!("record ID must be greater than zero");
        }
        if self.record_line.is_empty() {
            bail!("record line is required");
        }
        if self.ttl == 0 {
            bail!("ttl must be greater than zero");
        }

        if self.external_ip_getter.enabled {
            if self.external_ip_getter.urls.is_empty() {
                bail!("external public IP getter's URL list is required");
            }

            for url in &self.external_ip_getter.urls {
                if url.is_empty() {
                    bail!("external public IP getter's URL can not be empty");
                }
                let parsed = reqwest::Url::parse(url).with_context(|| {
                    format!("external public IP getter's URL is invalid: {}", url)
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    bail!("external public IP getter's URL scheme is invalid: {}", url);
                }
            }
        }

        Ok(())
    }

    /// The managed record's fully qualified name.
    pub fn hostname(&self) -> String {
        format!("{}.{}", self.sub_domain, self.domain)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.secret_id, &self.secret_key)
    }

    /// A copy that is safe to log or print.
    pub fn redacted(&self) -> Self {
        Self {
            secret_key: "********".to_string(),
            ..self.clone()
        }
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        #[cfg(unix)]
        {
            PathBuf::from("/etc/dnspod-ddns")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\ProgramData\dnspod-ddns")
        }
    }
}
