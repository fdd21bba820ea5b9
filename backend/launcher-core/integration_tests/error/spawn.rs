use launcher_core::error::CoreError;
use launcher_core::error::spawn::SpawnError;
use launcher_core::server::ServerCommand;
use launcher_core::server::spawn::spawn_server;

use common::ErrorLocation;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

/// **VALUE**: Verifies that `SpawnError::Spawn` includes location tracking.
///
/// **WHY THIS MATTERS**: Spawn failures are only logged (the user sees the generic dialog
/// later). The log line is the only clue, so it must say where the spawn failed.
///
/// **BUG THIS CATCHES**: Would catch the location being dropped from the Display format.
#[test]
#[track_caller]
fn given_spawn_error_when_formatted_then_includes_location() {
    // GIVEN: A Spawn error with location
    let err = SpawnError::Spawn {
        message: "Failed to spawn venv/bin/python".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::NotFound, "not found")),
    };

    // WHEN: Formatting
    let error_string = err.to_string();

    // THEN: Type, message and file location
    assert!(error_string.starts_with("Spawn Error: "));
    assert!(error_string.contains("Failed to spawn venv/bin/python"));
    assert!(error_string.contains("[spawn.rs:"));
}

/// **VALUE**: Verifies a missing interpreter is reported as a Spawn error with its IO source.
///
/// **WHY THIS MATTERS**: The most common failure is an install without `venv/`. The log must
/// name the interpreter path and keep the OS error as the source.
///
/// **BUG THIS CATCHES**: Would catch spawn_server() panicking or swallowing the NotFound error.
#[tokio::test]
async fn given_missing_interpreter_when_spawning_then_returns_spawn_error_with_source() {
    // GIVEN: A command whose program does not exist
    let command = ServerCommand::new("/nonexistent/venv/bin/python", ["-m", "streamlit"], "/");

    // WHEN: Spawning
    let result = spawn_server(&command, 8501);

    // THEN: Spawn error naming the program, with the IO error as source
    let err = result.expect_err("spawn should fail");
    assert!(matches!(err, SpawnError::Spawn { .. }));
    assert!(err.to_string().contains("/nonexistent/venv/bin/python"));

    let source = err.source().expect("should keep the IO error");
    let io = source
        .downcast_ref::<IoError>()
        .expect("source should be an io::Error");
    assert_eq!(io.kind(), ErrorKind::NotFound);
}

/// **VALUE**: Verifies CoreError stays transparent over the wrapped error.
#[test]
fn given_spawn_error_when_wrapped_in_core_error_then_display_is_unchanged() {
    // GIVEN: A Stream error
    let inner = SpawnError::Stream {
        message: "Child process has no stdout".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };
    let expected = inner.to_string();

    // WHEN: Wrapping
    let core: CoreError = inner.into();

    // THEN: Same message
    assert_eq!(core.to_string(), expected);
}
