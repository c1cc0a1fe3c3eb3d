use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::{Settings, DEFAULT_INTERVAL_SECONDS};
use crate::dns::{DnspodClient, ModifyOutcome, RecordUpdater};
use crate::error::{Error, Result};
use crate::ip::{ExternalIpGetter, PublicIpResolver, Resolution, SystemResolver};

/// Source of the periodic update ticks.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick. Returns `false` once no more ticks will come.
    async fn tick(&mut self) -> bool;
}

/// Ticks every `period`, starting one period from now. Ticks missed while a
/// cycle is running are dropped, not replayed.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// The configured interval, or the default when it is zero.
pub fn effective_interval(seconds: u64) -> Duration {
    if seconds == 0 {
        warn!(
            "Interval of 0 seconds is not usable, using {} seconds instead",
            DEFAULT_INTERVAL_SECONDS
        );
        return Duration::from_secs(DEFAULT_INTERVAL_SECONDS);
    }
    Duration::from_secs(seconds)
}

#[derive(Debug)]
pub enum CycleOutcome {
    Updated(ModifyOutcome),
    Skipped(IpAddr),
    Failed(Error),
}

/// Runs update cycles: resolve the public IP when a getter is configured,
/// then call the provider unless the address is known to be unchanged.
pub struct UpdateEngine {
    updater: Arc<dyn RecordUpdater>,
    resolver: Option<PublicIpResolver>,
    update_at_startup: bool,
    last_public_ip: Option<IpAddr>,
}

impl UpdateEngine {
    pub fn new(
        updater: Arc<dyn RecordUpdater>,
        resolver: Option<PublicIpResolver>,
        update_at_startup: bool,
    ) -> Self {
        Self {
            updater,
            resolver,
            update_at_startup,
            last_public_ip: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let updater = Arc::new(DnspodClient::new(settings)?);

        let resolver = if settings.external_ip_getter.enabled {
            let getter = ExternalIpGetter::from_config(&settings.external_ip_getter)?;
            Some(PublicIpResolver::new(
                settings.hostname(),
                Box::new(SystemResolver),
                Box::new(getter),
            ))
        } else {
            None
        };

        Ok(Self::new(updater, resolver, settings.update_at_startup))
    }

    pub fn last_public_ip(&self) -> Option<IpAddr> {
        self.last_public_ip
    }

    /// One pass of resolve-then-maybe-update. Never fails; the outcome says what happened.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match &self.resolver {
            Some(resolver) => match resolver.resolve(&mut self.last_public_ip).await {
                Resolution::Unchanged(ip) => {
                    debug!("Public IP {} not changed, skip update", ip);
                    return CycleOutcome::Skipped(ip);
                }
                Resolution::Changed {
                    previous: Some(previous),
                    current,
                } => {
                    info!("Public IP changed from {} to {}, update now", previous, current);
                }
                Resolution::Changed {
                    previous: None,
                    current,
                } => {
                    info!(
                        "Public IP of {} is {}, update now",
                        resolver.hostname(),
                        current
                    );
                }
                Resolution::Unavailable(e) => {
                    warn!("Failed to get external public IP: {}; updating anyway", e);
                }
            },
            None => debug!("External IP getter disabled, updating unconditionally"),
        }

        match self.updater.update_record().await {
            Ok(outcome) => {
                if outcome.status.is_success() {
                    info!(
                        "{} record update sent ({})",
                        self.updater.provider_name(),
                        outcome.status
                    );
                } else {
                    warn!(
                        "{} record update answered with {}",
                        self.updater.provider_name(),
                        outcome.status
                    );
                }
                CycleOutcome::Updated(outcome)
            }
            Err(e) => {
                error!(
                    "Failed to update record via {}: {}",
                    self.updater.provider_name(),
                    e
                );
                CycleOutcome::Failed(e)
            }
        }
    }

    /// Loop until the ticker stops or `shutdown` flips to `true`.
    pub async fn run<T: Ticker>(mut self, mut ticker: T, mut shutdown: watch::Receiver<bool>) {
        if self.update_at_startup {
            info!("Updating DNS record at startup");
            self.run_cycle().await;
        }

        loop {
            tokio::select! {
                more = ticker.tick() => {
                    if !more {
                        info!("Ticker stopped, leaving update loop");
                        break;
                    }
                    debug!("Updating DNS record");
                    self.run_cycle().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received, leaving update loop");
                        break;
                    }
                }
            }
        }
    }
}
