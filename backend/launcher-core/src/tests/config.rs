// Unit tests for LauncherConfig loading and validation

use crate::config::LauncherConfig;
use crate::error::config::ConfigError;

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

/// **VALUE**: Verifies that defaults reproduce the fixed launcher settings.
///
/// **WHY THIS MATTERS**: Most installs never ship a launcher.json. The defaults are the
/// behaviour: port 8501, `main.py`, 1920x1080 with a 1200x800 minimum.
///
/// **BUG THIS CATCHES**: Would catch a changed default silently moving the server port or
/// shrinking the window.
#[test]
fn given_default_config_when_inspected_then_matches_launcher_constants() {
    // GIVEN / WHEN: Default config
    let config = LauncherConfig::default();

    // THEN: Fixed values
    assert_eq!(config.server.url(), "http://localhost:8501");
    assert_eq!(config.server.script, "main.py");
    assert!(config.server.headless);
    assert_eq!((config.window.width, config.window.height), (1920, 1080));
    assert_eq!((config.window.min_width, config.window.min_height), (1200, 800));
    assert_eq!(config.window.background_rgb(), Some((0x0F, 0x0F, 0x0F)));
    assert!(config.validate().is_ok(), "Defaults must validate");
}

/// **VALUE**: Verifies the default readiness timings parse to the documented durations.
#[test]
fn given_default_readiness_when_parsed_then_yields_bounded_poll() {
    // GIVEN: Default config
    let config = LauncherConfig::default();

    // WHEN: Parsing timings
    let timings = config.readiness.timings().unwrap();

    // THEN: 250ms initial, 2s max interval, 30s overall
    assert_eq!(timings.initial_interval, Duration::from_millis(250));
    assert_eq!(timings.max_interval, Duration::from_secs(2));
    assert_eq!(timings.timeout, Duration::from_secs(30));
}

/// **VALUE**: Verifies a missing file yields defaults rather than an error.
///
/// **BUG THIS CATCHES**: Would catch `load()` treating "no config" as a failure, which
/// would log an error on every normal start.
#[test]
fn given_missing_config_file_when_loading_then_returns_defaults() {
    // GIVEN: An empty directory
    let dir = TempDir::new().unwrap();

    // WHEN: Loading
    let config = LauncherConfig::load(dir.path()).unwrap();

    // THEN: Defaults
    assert_eq!(config, LauncherConfig::default());
}

/// **VALUE**: Verifies partial files only override the keys they name.
///
/// **WHY THIS MATTERS**: Users write `{"server": {"port": 8600}}`, not the whole document.
/// Every field needs a serde default or such files fail to parse.
#[test]
fn given_partial_config_file_when_loading_then_merges_with_defaults() {
    // GIVEN: A config overriding only the port and timeout
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("launcher.json"),
        r#"{ "server": { "port": 8600 }, "readiness": { "timeout": "45s" } }"#,
    )
    .unwrap();

    // WHEN: Loading
    let config = LauncherConfig::load(dir.path()).unwrap();

    // THEN: Overrides applied, everything else default
    assert_eq!(config.server.port, 8600);
    assert_eq!(config.server.host, "localhost");
    assert_eq!(config.readiness.timeout, "45s");
    assert_eq!(config.readiness.initial_interval, "250ms");
    assert_eq!(config.window.title, "Luther Terminal");
}

/// **VALUE**: Verifies unparsable JSON is reported with the file path.
#[test]
fn given_corrupt_config_file_when_loading_then_returns_parse_error() {
    // GIVEN: Invalid JSON
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("launcher.json"), "{ not json").unwrap();

    // WHEN: Loading
    let result = LauncherConfig::load(dir.path());

    // THEN: ParseError naming the file
    match result {
        Err(err @ ConfigError::ParseError { .. }) => {
            assert!(err.to_string().contains("launcher.json"));
        }
        other => panic!("Expected ParseError, got {other:?}"),
    }
}

/// **VALUE**: Verifies a parsable but invalid file is rejected by validation on load.
#[test]
fn given_config_with_port_zero_when_loading_then_returns_validation_error() {
    // GIVEN: Port 0 (Streamlit would pick a random port the launcher cannot know)
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("launcher.json"),
        r#"{ "server": { "port": 0 } }"#,
    )
    .unwrap();

    // WHEN: Loading
    let result = LauncherConfig::load(dir.path());

    // THEN: Validation error
    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

/// **VALUE**: Verifies each validation rule independently.
///
/// **BUG THIS CATCHES**: Would catch a rule silently removed from `validate()`.
#[test]
fn given_invalid_values_when_validating_then_each_is_rejected() {
    // GIVEN: Configs each breaking one rule
    let mut bad_version = LauncherConfig::default();
    bad_version.version = 2;

    let mut empty_host = LauncherConfig::default();
    empty_host.server.host = String::from("  ");

    let mut window_below_minimum = LauncherConfig::default();
    window_below_minimum.window.width = 1000;

    let mut bad_background = LauncherConfig::default();
    bad_background.window.background = String::from("black");

    let mut bad_duration = LauncherConfig::default();
    bad_duration.readiness.timeout = String::from("soon");

    let mut zero_duration = LauncherConfig::default();
    zero_duration.readiness.initial_interval = String::from("0s");

    let mut inverted_intervals = LauncherConfig::default();
    inverted_intervals.readiness.initial_interval = String::from("5s");

    let cases = [
        ("version", bad_version),
        ("empty host", empty_host),
        ("window below minimum", window_below_minimum),
        ("background", bad_background),
        ("duration", bad_duration),
        ("zero duration", zero_duration),
        ("interval order", inverted_intervals),
    ];

    // WHEN / THEN: Every case fails validation
    for (name, config) in cases {
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
            "Should reject {name}"
        );
    }
}

/// **VALUE**: Verifies background parsing for the window colour.
#[test]
fn given_hex_backgrounds_when_parsed_then_only_rrggbb_is_accepted() {
    let mut config = LauncherConfig::default();

    config.window.background = String::from("#FF6D00");
    assert_eq!(config.window.background_rgb(), Some((0xFF, 0x6D, 0x00)));

    config.window.background = String::from("#FFF");
    assert_eq!(config.window.background_rgb(), None);

    config.window.background = String::from("#GG0000");
    assert_eq!(config.window.background_rgb(), None);
}
