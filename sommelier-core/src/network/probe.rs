//! HTTP reachability probe.
//!
//! For hosts without a platform connectivity callback: poll an endpoint and
//! feed the outcome to the monitor. Any HTTP response, whatever its status,
//! proves the network path works; transport errors and timeouts count as
//! offline.

use std::fmt;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;
use url::Url;

use super::{ConnectivityReporter, TARGET};
use crate::config::NetworkMonitorConfig;
use crate::error::NetworkError;

pub struct ReachabilityProbe {
    client: reqwest::Client,
    url: Url,
    every: Duration,
}

impl fmt::Debug for ReachabilityProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReachabilityProbe")
            .field("url", &self.url.as_str())
            .field("every", &self.every)
            .finish()
    }
}

impl ReachabilityProbe {
    pub fn new(
        url: &str,
        every: Duration,
        timeout: Duration,
    ) -> Result<Self, NetworkError> {
        let url = Url::parse(url).map_err(|err| {
            NetworkError::InvalidProbeUrl(format!("{url}: {err}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NetworkError::InvalidProbeUrl(format!(
                "{url}: unsupported scheme"
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url, every })
    }

    /// Build a probe from config; `None` when no probe URL is configured.
    pub fn from_config(
        config: &NetworkMonitorConfig,
    ) -> Result<Option<Self>, NetworkError> {
        config
            .probe_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                Self::new(url, config.probe_interval(), config.probe_timeout())
            })
            .transpose()
    }

    /// One reachability check.
    pub async fn check(&self) -> bool {
        match self.client.head(self.url.clone()).send().await {
            Ok(response) => {
                debug!(target: TARGET, status = %response.status(), "probe reached endpoint");
                true
            }
            Err(err) => {
                debug!(target: TARGET, error = %err, "probe failed");
                false
            }
        }
    }

    /// Poll until the monitor behind `reporter` shuts down. A check in
    /// flight is abandoned as soon as that happens.
    pub fn spawn(self, reporter: ConnectivityReporter) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                let online = tokio::select! {
                    () = reporter.closed() => break,
                    online = async {
                        ticker.tick().await;
                        self.check().await
                    } => online,
                };
                if !reporter.report(online) {
                    break;
                }
            }
            debug!(target: TARGET, url = %self.url, "network monitor gone; probe stopping");
        })
    }
}
