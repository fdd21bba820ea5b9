use crate::window::DesktopWindow;

use launcher_core::config::LauncherConfig;
use launcher_core::supervisor::Supervisor;

use std::sync::Arc;

/// Managed Tauri state: the loaded config and the one supervisor.
///
/// The supervisor outlives individual windows; on macOS a reopened window
/// is attached to the same instance.
#[derive(Clone)]
pub struct LauncherState {
    config: Arc<LauncherConfig>,
    supervisor: Arc<Supervisor<DesktopWindow>>,
}

impl LauncherState {
    pub fn new(config: LauncherConfig, supervisor: Supervisor<DesktopWindow>) -> Self {
        Self {
            config: Arc::new(config),
            supervisor: Arc::new(supervisor),
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn supervisor(&self) -> Arc<Supervisor<DesktopWindow>> {
        Arc::clone(&self.supervisor)
    }
}
