use super::fake_window::FakeWindow;

use launcher_core::config::LauncherConfig;
use launcher_core::policy::LinkAction;
use launcher_core::server::ServerCommand;
use launcher_core::supervisor::Supervisor;

use std::sync::Arc;

use url::Url;

/// Supervisor with a window attached but no server, for routing tests.
async fn supervisor_with_window() -> (Supervisor<FakeWindow>, Arc<FakeWindow>) {
    let mut config = LauncherConfig::default();
    config.readiness.timeout = String::from("2s");
    config.readiness.initial_interval = String::from("10ms");
    config.readiness.max_interval = String::from("50ms");

    let supervisor =
        Supervisor::with_command(&config, ServerCommand::new("/nonexistent", [""; 0], "/"))
            .unwrap();
    let window = Arc::new(FakeWindow::default());
    // Spawn fails, navigation fails fast; the window stays attached
    supervisor.startup(Arc::clone(&window)).await.unwrap();
    (supervisor, window)
}

/// **VALUE**: Verifies window-open requests are denied and handed to the browser.
///
/// **WHY THIS MATTERS**: Streamlit renders external links with `target="_blank"`. Without
/// interception they either do nothing or open a bare webview window.
///
/// **BUG THIS CATCHES**: Would catch the handler denying the window but never calling the
/// system browser.
#[tokio::test]
async fn given_link_with_new_window_target_when_routed_then_opens_in_browser() {
    // GIVEN: A supervisor with an attached window
    let (supervisor, window) = supervisor_with_window().await;
    let target = Url::parse("https://www.bloomberg.com/markets").unwrap();

    // WHEN: Content requests a new window
    let action = supervisor.route_new_window(&target);

    // THEN: Sent to the browser
    assert_eq!(action, LinkAction::OpenExternal);
    assert_eq!(window.external(), [target]);
}

/// **VALUE**: Verifies server-origin navigation is allowed and others are diverted.
#[tokio::test]
async fn given_navigations_when_routed_then_only_server_origin_proceeds() {
    // GIVEN: A supervisor with an attached window
    let (supervisor, window) = supervisor_with_window().await;
    let internal = Url::parse("http://localhost:8501/?tab=news").unwrap();
    let external = Url::parse("https://docs.streamlit.io").unwrap();
    let script = Url::parse("javascript:void(0)").unwrap();

    // WHEN / THEN: Internal stays, external opens in the browser, scripts are blocked
    assert!(supervisor.route_navigation(&internal));
    assert!(!supervisor.route_navigation(&external));
    assert!(!supervisor.route_navigation(&script));
    assert_eq!(window.external(), [external]);
}

/// **VALUE**: Verifies routing after shutdown does not touch the dropped window.
#[tokio::test]
async fn given_shut_down_supervisor_when_routing_then_nothing_is_opened() {
    let (supervisor, window) = supervisor_with_window().await;
    supervisor.shutdown();

    let action = supervisor.route_new_window(&Url::parse("https://example.com").unwrap());

    assert_eq!(action, LinkAction::OpenExternal);
    assert!(window.external().is_empty());
}
