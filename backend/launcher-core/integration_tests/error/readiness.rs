use launcher_core::error::readiness::ReadinessError;
use launcher_core::error::supervisor::SupervisorError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies readiness timeouts carry their kind, message and location.
///
/// **BUG THIS CATCHES**: Would catch a Timeout formatted like a generic error, which makes
/// "server too slow" indistinguishable from "server crashed" in the log.
#[test]
#[track_caller]
fn given_timeout_error_when_formatted_then_includes_kind_and_location() {
    let err = ReadinessError::Timeout {
        message: "Server at http://localhost:8501/ did not become reachable within 30s".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    let error_string = err.to_string();

    assert!(error_string.starts_with("Timeout Error: "));
    assert!(error_string.contains("http://localhost:8501/"));
    assert!(error_string.contains("[readiness.rs:"));
}

/// **VALUE**: Verifies the early-exit variant is distinguishable from a timeout.
#[test]
#[track_caller]
fn given_server_exited_error_when_formatted_then_names_exit() {
    let err = ReadinessError::ServerExited {
        message: "Server exited before http://localhost:8501/ became reachable".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    assert!(err.to_string().starts_with("Server Exited Error: "));
}

/// **VALUE**: Verifies the single-instance violation is reported clearly.
#[test]
#[track_caller]
fn given_already_running_error_when_formatted_then_includes_message() {
    let err = SupervisorError::AlreadyRunning {
        message: "A launcher window is already attached".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    let error_string = err.to_string();

    assert!(error_string.starts_with("Already Running Error: "));
    assert!(error_string.contains("already attached"));
}
