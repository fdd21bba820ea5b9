use launcher_core::server::port::find_listener;

use std::net::TcpListener;

/// **VALUE**: Verifies a port held by a listener is reported with its owner.
///
/// **WHY THIS MATTERS**: A leftover Streamlit from a crashed launch keeps 8501. The launcher
/// warns about it before spawning, because the readiness poll would otherwise succeed
/// against the stale server.
///
/// **BUG THIS CATCHES**: Would catch the socket filter matching the wrong state (e.g.
/// ESTABLISHED instead of LISTEN) or the wrong port field.
#[test]
fn given_bound_listener_when_finding_listener_then_reports_port() {
    // GIVEN: A listener on an ephemeral port
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    // WHEN: Looking for the listener
    let result = find_listener(port);

    // THEN: Found, on that port
    let owner = result
        .expect("socket table should be readable")
        .expect("listener should be found");
    assert_eq!(owner.port, port);

    // AND: When the OS reports an owner, it is this test process
    if let Some(pid) = owner.pid {
        assert_eq!(pid, std::process::id());
    }
}

/// **VALUE**: Verifies a free port is reported as free.
#[test]
fn given_released_port_when_finding_listener_then_returns_none() {
    // GIVEN: A port that was bound and released
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    // WHEN: Looking for a listener
    let result = find_listener(port).expect("socket table should be readable");

    // THEN: Nothing listens
    assert!(result.is_none(), "Port {port} should be free");
}
