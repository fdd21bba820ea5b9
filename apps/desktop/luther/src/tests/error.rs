// Unit tests for the desktop error type

use crate::error::LutherError;

use launcher_core::config::LauncherConfig;
use launcher_core::error::CoreError;
use launcher_core::error::supervisor::SupervisorError;

use common::ErrorLocation;

use std::error::Error;
use std::panic::Location;

/// **VALUE**: Verifies core errors keep their source when wrapped.
///
/// **WHY THIS MATTERS**: Setup failures are reported once, by Tauri, from the
/// `LutherError`. The underlying config or supervisor error must still be reachable.
///
/// **BUG THIS CATCHES**: Would catch a conversion that flattens the core error to text only.
#[test]
fn given_core_error_when_converted_then_source_is_preserved() {
    // GIVEN: A core error from an invalid config
    let mut config = LauncherConfig::default();
    config.server.port = 0;
    let core: CoreError = config.validate().unwrap_err().into();

    // WHEN: Converting into LutherError
    let err = LutherError::from(core);

    // THEN: Core variant, with the core error as source and its text in the message
    assert!(matches!(err, LutherError::Core { .. }));
    let source = err.source().expect("core error should be the source");
    assert!(source.downcast_ref::<CoreError>().is_some());
    assert!(err.to_string().starts_with("Core Error: "));
    assert!(err.to_string().contains("port"));
}

/// **VALUE**: Verifies the location recorded on conversion points at the caller.
#[test]
fn given_core_error_when_converted_then_location_is_this_file() {
    let core = CoreError::from(SupervisorError::AlreadyRunning {
        message: String::from("Test"),
        location: ErrorLocation::from(Location::caller()),
    });

    let err = LutherError::from(core);

    let LutherError::Core { location, .. } = err else {
        panic!("expected Core variant");
    };
    assert_eq!(location.file_name(), "error.rs");
}

/// **VALUE**: Verifies window errors format with their kind prefix.
#[test]
fn given_window_error_when_displayed_then_has_kind_prefix() {
    // GIVEN: A window creation error
    let err = LutherError::Window {
        message: String::from("Failed to create window 'main'"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Formatting
    let text = err.to_string();

    // THEN: Kind, message and location
    assert!(text.starts_with("Window Error: Failed to create window 'main'"));
    assert!(text.contains("[error.rs:"));
}
