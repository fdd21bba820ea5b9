// Unit tests for ServerCommand construction
// Process lifecycle tests live in integration_tests/server/process.rs

use crate::config::ServerConfig;
use crate::server::{ServerCommand, interpreter_path};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// **VALUE**: Verifies the exact Streamlit invocation built from default config.
///
/// **WHY THIS MATTERS**: The child is started with a fixed argument list. A typo in a flag
/// (e.g. `--server.port 8501` instead of `--server.port=8501`) makes Streamlit ignore it and
/// listen on a random port, so the readiness poll times out.
///
/// **BUG THIS CATCHES**: Would catch reordered, missing, or reformatted arguments.
#[test]
fn given_default_config_when_building_streamlit_command_then_uses_fixed_arguments() {
    // GIVEN: Default server config and an app root
    let config = ServerConfig::default();
    let app_root = Path::new("/opt/luther");

    // WHEN: Building the command
    let cmd = ServerCommand::streamlit(&config, app_root);

    // THEN: Arguments match the Streamlit invocation
    assert_eq!(
        cmd.args(),
        [
            "-m",
            "streamlit",
            "run",
            "main.py",
            "--server.port=8501",
            "--server.headless=true",
        ]
    );
    assert_eq!(cmd.working_dir(), app_root, "Should run from the app root");
    assert_eq!(cmd.program(), interpreter_path(app_root));
}

/// **VALUE**: Verifies the platform-specific virtualenv interpreter path.
///
/// **BUG THIS CATCHES**: Would catch using `bin/python` on Windows or `Scripts\python.exe`
/// on Unix, which fails to spawn with NotFound.
#[test]
fn given_app_root_when_resolving_interpreter_then_uses_platform_venv_layout() {
    // GIVEN: An app root
    let app_root = Path::new("app");

    // WHEN: Resolving the interpreter
    let path = interpreter_path(app_root);

    // THEN: Should point inside venv with the platform layout
    #[cfg(windows)]
    let expected: PathBuf = ["app", "venv", "Scripts", "python.exe"].iter().collect();
    #[cfg(not(windows))]
    let expected: PathBuf = ["app", "venv", "bin", "python"].iter().collect();

    assert_eq!(path, expected);
}

/// **VALUE**: Verifies interpreter overrides resolve relative to the app root.
///
/// **WHY THIS MATTERS**: A config override like `"interpreter": ".venv/bin/python"` must
/// not depend on the launcher's own working directory, which differs between dev runs and
/// installed bundles.
#[test]
fn given_relative_interpreter_override_when_building_command_then_joins_app_root() {
    // GIVEN: A relative interpreter override
    let config = ServerConfig {
        interpreter: Some(PathBuf::from(".venv/bin/python")),
        ..ServerConfig::default()
    };

    // WHEN: Building the command
    let cmd = ServerCommand::streamlit(&config, Path::new("/srv/app"));

    // THEN: Program is under the app root
    assert_eq!(cmd.program(), Path::new("/srv/app").join(".venv/bin/python"));
}

/// **VALUE**: Verifies port and headless settings flow into the flags.
#[test]
fn given_custom_port_and_headless_off_when_building_command_then_flags_follow_config() {
    // GIVEN: Non-default port and headless disabled
    let config = ServerConfig {
        port: 9000,
        headless: false,
        script: String::from("dashboard.py"),
        ..ServerConfig::default()
    };

    // WHEN: Building the command
    let cmd = ServerCommand::streamlit(&config, Path::new("root"));

    // THEN: Flags carry the configured values
    assert!(cmd.args().contains(&String::from("dashboard.py")));
    assert!(cmd.args().contains(&String::from("--server.port=9000")));
    assert!(cmd.args().contains(&String::from("--server.headless=false")));
}

/// **VALUE**: Verifies the tokio command pipes output and runs in the working directory.
///
/// **BUG THIS CATCHES**: Would catch losing `current_dir`, which makes `main.py` resolve
/// against the launcher's directory instead of the app root.
#[test]
fn given_server_command_when_converted_then_sets_program_and_directory() {
    // GIVEN: A command
    let cmd = ServerCommand::new("python3", ["-V"], "/tmp");

    // WHEN: Converting to a tokio command
    let tokio_cmd = cmd.to_command();
    let std_cmd = tokio_cmd.as_std();

    // THEN: Program, args and directory are carried over
    assert_eq!(std_cmd.get_program(), "python3");
    assert_eq!(std_cmd.get_args().collect::<Vec<_>>(), [OsStr::new("-V")]);
    assert_eq!(std_cmd.get_current_dir(), Some(Path::new("/tmp")));
}

/// **VALUE**: Verifies the Display form used in the "Starting server" log line.
#[test]
fn given_server_command_when_displayed_then_shows_program_and_args() {
    let cmd = ServerCommand::new("python", ["-m", "streamlit"], ".");

    assert_eq!(cmd.to_string(), "python -m streamlit");
}
