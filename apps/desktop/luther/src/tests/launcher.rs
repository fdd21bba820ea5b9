// Unit tests for config loading and app root resolution

use crate::launcher::{load_config, resolve_app_root};

use launcher_core::config::{LauncherConfig, ServerConfig};

use std::fs;
use std::path::{Path, PathBuf};

/// **VALUE**: Verifies a broken config file never blocks the launch.
///
/// **WHY THIS MATTERS**: The config is optional. A typo in it should cost the user
/// their overrides, not the application.
///
/// **BUG THIS CATCHES**: Would catch load errors being propagated out of setup.
#[test]
fn given_corrupt_config_when_loading_then_falls_back_to_defaults() {
    // GIVEN: A config dir with invalid JSON
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("launcher.json"), "{ not json").unwrap();

    // WHEN: Loading
    let config = load_config(dir.path());

    // THEN: Defaults
    assert_eq!(config, LauncherConfig::default());
}

/// **VALUE**: Verifies valid overrides are honored.
#[test]
fn given_valid_config_when_loading_then_overrides_apply() {
    // GIVEN: A config with a custom port
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("launcher.json"),
        r#"{ "version": 1, "server": { "port": 8600 } }"#,
    )
    .unwrap();

    // WHEN: Loading
    let config = load_config(dir.path());

    // THEN: Port overridden, everything else default
    assert_eq!(config.server.port, 8600);
    assert_eq!(config.window, LauncherConfig::default().window);
}

/// **VALUE**: Verifies the resource directory is the default app root.
#[test]
fn given_no_override_when_resolving_app_root_then_uses_resource_dir() {
    let root = resolve_app_root(&ServerConfig::default(), Path::new("/opt/luther/resources"));

    assert_eq!(root, PathBuf::from("/opt/luther/resources"));
}

/// **VALUE**: Verifies absolute and relative overrides resolve as documented.
///
/// **BUG THIS CATCHES**: Would catch relative roots resolving against the process's
/// working directory, which differs between dev runs and installed bundles.
#[test]
fn given_override_when_resolving_app_root_then_relative_joins_resource_dir() {
    // GIVEN: A relative and an absolute override
    let relative = ServerConfig {
        app_root: Some(PathBuf::from("terminal")),
        ..ServerConfig::default()
    };
    let absolute = ServerConfig {
        app_root: Some(PathBuf::from("/srv/terminal")),
        ..ServerConfig::default()
    };
    let resources = Path::new("/opt/luther/resources");

    // WHEN / THEN: Relative joins, absolute is kept
    assert_eq!(
        resolve_app_root(&relative, resources),
        PathBuf::from("/opt/luther/resources/terminal")
    );
    assert_eq!(
        resolve_app_root(&absolute, resources),
        PathBuf::from("/srv/terminal")
    );
}
