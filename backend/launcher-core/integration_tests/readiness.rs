use launcher_core::config::ReadinessTimings;
use launcher_core::error::readiness::ReadinessError;
use launcher_core::readiness::{build_client, check_reachable, wait_until_reachable};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_timings(timeout: Duration) -> ReadinessTimings {
    ReadinessTimings {
        timeout,
        initial_interval: Duration::from_millis(20),
        max_interval: Duration::from_millis(100),
    }
}

/// A local port with nothing listening on it.
fn closed_port_url() -> Url {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    Url::parse(&format!("http://127.0.0.1:{port}")).unwrap()
}

/// **VALUE**: Verifies a 2xx response counts as reachable.
#[tokio::test]
async fn given_server_returning_ok_when_checked_then_reachable() {
    // GIVEN: A server answering 200
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let url = Url::parse(&server.uri()).unwrap();

    // WHEN: Checking once
    let client = build_client(&url).unwrap();
    let reachable = check_reachable(&client, &url).await;

    // THEN: Reachable
    assert!(reachable);
}

/// **VALUE**: Verifies an error status does not count as reachable.
///
/// **WHY THIS MATTERS**: Streamlit answers 503 briefly while booting. Navigating then shows
/// an error page in the window.
#[tokio::test]
async fn given_server_returning_503_when_checked_then_not_reachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let url = Url::parse(&server.uri()).unwrap();

    let client = build_client(&url).unwrap();

    assert!(!check_reachable(&client, &url).await);
}

/// **VALUE**: Verifies the poll keeps trying until the server comes up.
///
/// **WHY THIS MATTERS**: This replaces the old fixed 5-second delay. On a slow machine the
/// server answers late; the poll must wait for it rather than give up after one attempt.
///
/// **BUG THIS CATCHES**: Would catch a loop that returns after the first failed probe.
#[tokio::test]
async fn given_server_ready_after_failures_when_waiting_then_succeeds() {
    // GIVEN: A server that fails twice, then answers 200
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(2)
        .mount(&server)
        .await;
    let url = Url::parse(&server.uri()).unwrap();

    // WHEN: Waiting
    let result = wait_until_reachable(&url, &fast_timings(Duration::from_secs(5)), || false).await;

    // THEN: Succeeds after retries
    assert!(result.is_ok(), "Should succeed once the server answers: {result:?}");
    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() >= 3, "Should have retried, saw {}", requests.len());
}

/// **VALUE**: Verifies the wait is bounded and ends in an explicit timeout.
///
/// **BUG THIS CATCHES**: Would catch a missing `max_elapsed_time`, which would leave the
/// window blank forever instead of showing the error dialog.
#[tokio::test]
async fn given_unreachable_server_when_waiting_then_times_out() {
    // GIVEN: Nothing listening
    let url = closed_port_url();
    let started = Instant::now();

    // WHEN: Waiting with a short bound
    let result = wait_until_reachable(&url, &fast_timings(Duration::from_millis(300)), || false).await;

    // THEN: Timeout, reasonably close to the bound
    assert!(matches!(result, Err(ReadinessError::Timeout { .. })));
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "Should give up near the configured bound"
    );
}

/// **VALUE**: Verifies the wait stops as soon as the child has exited.
///
/// **WHY THIS MATTERS**: If Python or Streamlit is missing, the child dies at once. The user
/// should see the dialog right away, not after the full timeout.
#[tokio::test]
async fn given_exited_server_when_waiting_then_stops_early() {
    // GIVEN: Nothing listening and a child reported as exited on the second check
    let url = closed_port_url();
    let checks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&checks);

    // WHEN: Waiting with a long bound
    let result = wait_until_reachable(&url, &fast_timings(Duration::from_secs(30)), move || {
        counter.fetch_add(1, Ordering::SeqCst) >= 1
    })
    .await;

    // THEN: ServerExited after two checks
    assert!(matches!(result, Err(ReadinessError::ServerExited { .. })));
    assert_eq!(checks.load(Ordering::SeqCst), 2);
}
