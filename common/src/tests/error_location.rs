use crate::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every error in the launcher carries an ErrorLocation. If capture
/// breaks, the "[file:line:col]" suffix in log lines points nowhere.
///
/// **BUG THIS CATCHES**: Would catch if `Location::caller()` stops being propagated or if
/// the constructor swaps line and column.
#[test]
#[track_caller]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN: Current caller location
    // WHEN: Creating ErrorLocation from caller
    let location = ErrorLocation::from(Location::caller());

    // THEN: Should capture file, line, and column
    assert!(
        location.file.contains("error_location.rs"),
        "Should capture file path"
    );
    assert!(location.line > 0, "Should capture line number");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the Display format is "[file_name:line:column]" without directories.
///
/// **WHY THIS MATTERS**: Error strings end up in the log file and in the stdout log. Full
/// paths (including drive letters on Windows) make lines long and break the colon count.
///
/// **BUG THIS CATCHES**: Would catch if Display goes back to printing the full path, or if
/// the bracket format changes and log grepping stops working.
#[test]
#[track_caller]
fn given_error_location_when_formatted_then_uses_bracketed_file_name() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::from(Location::caller());

    // WHEN: Formatting as string
    let formatted = format!("{location}");

    // THEN: Should produce "[error_location.rs:line:column]"
    assert_eq!(
        formatted,
        format!("[error_location.rs:{}:{}]", location.line, location.column)
    );
    assert_eq!(
        formatted.matches(':').count(),
        2,
        "Should have exactly 2 colons"
    );
}

/// **VALUE**: Verifies that `#[track_caller]` helpers report their call sites.
///
/// **BUG THIS CATCHES**: Would catch if errors built inside helper functions all report the
/// helper's own line instead of the caller's.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    // GIVEN: A helper function that captures location
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    // WHEN: Capturing location from different call sites
    let loc1 = capture_location();
    let loc2 = capture_location();

    // THEN: Should have same file but sequential line numbers
    assert_eq!(loc1.file, loc2.file, "Should have same file");
    assert_eq!(loc1.line + 1, loc2.line, "Lines should be sequential");
}

/// **VALUE**: Verifies `file_name()` strips directories.
#[test]
fn given_nested_path_when_file_name_called_then_returns_last_component() {
    // GIVEN: A location with a nested path
    let location = ErrorLocation {
        file: "backend/launcher-core/src/server/spawn.rs",
        line: 10,
        column: 4,
    };

    // WHEN / THEN
    assert_eq!(location.file_name(), "spawn.rs");
    assert_eq!(format!("{location}"), "[spawn.rs:10:4]");
}
