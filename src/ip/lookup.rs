use std::io;
use std::net::IpAddr;

use async_trait::async_trait;

#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Resolve a hostname to its addresses, in resolver order.
    async fn lookup_ip(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// The operating system's resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl DnsLookup for SystemResolver {
    async fn lookup_ip(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}
