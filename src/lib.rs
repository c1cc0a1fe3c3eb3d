//! Keeps a DNSPod record pointed at this host's public IP address.
//!
//! The daemon periodically calls DNSPod's `ModifyDynamicDNS` action, signed
//! with TC3-HMAC-SHA256. When an external IP getter is configured the call is
//! only made when the public address actually changed.

pub mod config;
pub mod daemon;
pub mod dns;
pub mod error;
pub mod ip;
pub mod sign;
pub mod util;

pub use error::{Error, Result};
