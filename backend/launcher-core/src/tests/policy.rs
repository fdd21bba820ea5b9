// Unit tests for certificate and link policies

use crate::policy::certificate::is_trusted_host;
use crate::policy::{LinkAction, LinkPolicy};

use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn policy() -> LinkPolicy {
    LinkPolicy::new(url("http://localhost:8501"))
}

/// **VALUE**: Verifies invalid certificates are tolerated only for localhost.
///
/// **WHY THIS MATTERS**: The exemption exists for the local server. Extending it to any
/// other host disables TLS validation for real sites.
///
/// **BUG THIS CATCHES**: Would catch a prefix match (`starts_with("http://localhost")`)
/// that also trusts `localhost.evil.com`.
#[test]
fn given_urls_when_checking_certificate_policy_then_only_localhost_is_exempt() {
    // GIVEN / WHEN / THEN
    assert!(is_trusted_host(&url("http://localhost:9999")));
    assert!(is_trusted_host(&url("https://localhost:8501/app")));
    assert!(is_trusted_host(&url("https://LOCALHOST")));

    assert!(!is_trusted_host(&url("https://example.com")));
    assert!(!is_trusted_host(&url("https://localhost.evil.com")));
    assert!(!is_trusted_host(&url("https://evil.com/?next=http://localhost")));
    assert!(!is_trusted_host(&url("http://127.0.0.1:8501")));
}

/// **VALUE**: Verifies new-window requests never stay in the app.
///
/// **BUG THIS CATCHES**: Would catch `target="_blank"` links spawning extra webview windows,
/// which would have full page access and no bridge.
#[test]
fn given_new_window_requests_when_routed_then_open_externally_or_block() {
    let policy = policy();

    assert_eq!(
        policy.for_new_window(&url("https://streamlit.io/docs")),
        LinkAction::OpenExternal
    );
    assert_eq!(
        policy.for_new_window(&url("http://localhost:8501/other")),
        LinkAction::OpenExternal,
        "Even same-origin popups go to the browser"
    );
    assert_eq!(
        policy.for_new_window(&url("mailto:desk@example.com")),
        LinkAction::OpenExternal
    );
    assert_eq!(
        policy.for_new_window(&url("about:blank")),
        LinkAction::Block
    );
    assert_eq!(
        policy.for_new_window(&url("file:///etc/passwd")),
        LinkAction::Block
    );
}

/// **VALUE**: Verifies in-window navigation stays on the server origin.
#[test]
fn given_navigations_when_routed_then_server_origin_stays_and_others_leave() {
    let policy = policy();

    assert_eq!(
        policy.for_navigation(&url("http://localhost:8501/?page=2")),
        LinkAction::Stay
    );
    assert_eq!(
        policy.for_navigation(&url("tauri://localhost/index.html")),
        LinkAction::Stay,
        "Bundled loading page must load"
    );
    assert_eq!(
        policy.for_navigation(&url("http://tauri.localhost/index.html")),
        LinkAction::Stay
    );
    assert_eq!(
        policy.for_navigation(&url("http://localhost:9000")),
        LinkAction::OpenExternal,
        "Different port is a different origin"
    );
    assert_eq!(
        policy.for_navigation(&url("https://github.com")),
        LinkAction::OpenExternal
    );
    assert_eq!(
        policy.for_navigation(&url("javascript:alert(1)")),
        LinkAction::Block
    );
}
