use std::net::IpAddr;

use tracing::{info, warn};

use super::external::PublicIpSource;
use super::lookup::DnsLookup;
use crate::error::{Error, Result};

/// What one resolution attempt found out about the public address.
#[derive(Debug)]
pub enum Resolution {
    /// A new address was learned; `previous` is `None` when there was no baseline.
    Changed {
        previous: Option<IpAddr>,
        current: IpAddr,
    },
    Unchanged(IpAddr),
    /// The external getter failed. The record is updated anyway.
    Unavailable(Error),
}

impl Resolution {
    pub fn needs_update(&self) -> bool {
        !matches!(self, Resolution::Unchanged(_))
    }
}

/// Tracks the public address through an IP-echo service.
///
/// The first baseline comes from resolving the managed record itself, so a
/// restart does not force an update when the record is already correct.
pub struct PublicIpResolver {
    hostname: String,
    lookup: Box<dyn DnsLookup>,
    source: Box<dyn PublicIpSource>,
}

impl PublicIpResolver {
    pub fn new(
        hostname: impl Into<String>,
        lookup: Box<dyn DnsLookup>,
        source: Box<dyn PublicIpSource>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            lookup,
            source,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Compare the current public address against `last_known` and update it.
    pub async fn resolve(&self, last_known: &mut Option<IpAddr>) -> Resolution {
        if last_known.is_none() {
            match self.lookup_record().await {
                Ok(ip) => *last_known = Some(ip),
                Err(e) => warn!("{}, asking the external IP getter instead", e),
            }
        }

        let Some(previous) = *last_known else {
            return match self.source.public_ip().await {
                Ok(current) => {
                    *last_known = Some(current);
                    Resolution::Changed {
                        previous: None,
                        current,
                    }
                }
                Err(e) => Resolution::Unavailable(e),
            };
        };

        match self.source.public_ip().await {
            Ok(current) if same_address(current, previous) => Resolution::Unchanged(current),
            Ok(current) => {
                *last_known = Some(current);
                Resolution::Changed {
                    previous: Some(previous),
                    current,
                }
            }
            Err(e) => Resolution::Unavailable(e),
        }
    }

    async fn lookup_record(&self) -> Result<IpAddr> {
        let ips = self
            .lookup
            .lookup_ip(&self.hostname)
            .await
            .map_err(|source| Error::Lookup {
                host: self.hostname.clone(),
                source,
            })?;

        let first = *ips.first().ok_or_else(|| Error::NoAddresses {
            host: self.hostname.clone(),
        })?;

        info!(
            "Lookup of {} returned {:?}, using {} as baseline",
            self.hostname, ips, first
        );
        Ok(first)
    }
}

/// Address equality, treating `::ffff:a.b.c.d` as `a.b.c.d`.
fn same_address(a: IpAddr, b: IpAddr) -> bool {
    a.to_canonical() == b.to_canonical()
}
