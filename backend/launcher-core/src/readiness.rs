//! Wait for the child server to accept HTTP requests before navigating.

use crate::config::ReadinessTimings;
use crate::error::readiness::ReadinessError;
use crate::policy::certificate::is_trusted_host;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, trace};
use reqwest::Client;
use tokio::time::sleep as TokioSleep;
use url::Url;

const CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// HTTP client for probing `url`.
///
/// Invalid certificates are tolerated only for the local host.
#[track_caller]
pub fn build_client(url: &Url) -> Result<Client, ReadinessError> {
    let accept_invalid = is_trusted_host(url);
    if accept_invalid {
        trace!("Accepting invalid certificates for {url}");
    }

    Client::builder()
        .danger_accept_invalid_certs(accept_invalid)
        .timeout(CHECK_TIMEOUT)
        .build()
        .map_err(|e| ReadinessError::Client {
            message: format!("Failed to build HTTP client: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })
}

/// One probe: `true` on any 2xx response.
pub async fn check_reachable(client: &Client, url: &Url) -> bool {
    match client.get(url.clone()).send().await {
        Ok(resp) if resp.status().is_success() => {
            debug!("Reachability check succeeded for {url}");
            true
        }
        Ok(resp) => {
            debug!("Reachability check failed for {url}: status={}", resp.status());
            false
        }
        Err(e) => {
            trace!("Reachability check failed for {url}: {e}");
            false
        }
    }
}

/// Poll `url` with exponential backoff until it answers.
///
/// # Arguments
///
/// * `url` - Address the window will load
/// * `timings` - Initial and maximum interval, and the total time allowed
/// * `server_exited` - Checked between attempts; stops the wait once the child is gone
///
/// # Errors
///
/// * [`ReadinessError::Timeout`] - No 2xx response within `timings.timeout`
/// * [`ReadinessError::ServerExited`] - The child exited before answering
/// * [`ReadinessError::Client`] - The HTTP client could not be built
pub async fn wait_until_reachable<F>(
    url: &Url,
    timings: &ReadinessTimings,
    server_exited: F,
) -> Result<(), ReadinessError>
where
    F: Fn() -> bool,
{
    let client = build_client(url)?;

    let mut backoff = ExponentialBackoff {
        initial_interval: timings.initial_interval,
        max_interval: timings.max_interval,
        max_elapsed_time: Some(timings.timeout),
        ..Default::default()
    };
    backoff.reset();

    debug!("Waiting for server at {url} (up to {:?})", timings.timeout);

    loop {
        if check_reachable(&client, url).await {
            info!("Server is reachable at {url}");
            return Ok(());
        }

        if server_exited() {
            return Err(ReadinessError::ServerExited {
                message: format!("Server exited before {url} became reachable"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Server not ready, retrying after {duration:?}");
                TokioSleep(duration).await;
            }
            None => {
                return Err(ReadinessError::Timeout {
                    message: format!(
                        "Server at {url} did not become reachable within {:?}",
                        timings.timeout
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }
}
