//! The Streamlit child process.
//!
//! - [`ServerCommand`]: interpreter, arguments and working directory
//! - [`spawn::spawn_server`]: start the child and forward its output to the log
//! - [`ServerProcess`]: handle used to observe and terminate the child
//! - [`port::find_listener`]: detect a stale process already holding the port

pub mod port;
pub mod spawn;

pub use spawn::{ServerExit, ServerProcess};

use crate::STREAMLIT_MODULE;
use crate::config::ServerConfig;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command as TokioCommand;

const VENV_DIR: &str = "venv";
const MODULE_FLAG: &str = "-m";
const RUN_SUBCOMMAND: &str = "run";

#[cfg(windows)]
const VENV_INTERPRETER: [&str; 2] = ["Scripts", "python.exe"];

#[cfg(not(windows))]
const VENV_INTERPRETER: [&str; 2] = ["bin", "python"];

/// Interpreter inside the app root's virtualenv.
///
/// `venv/bin/python` on Unix, `venv\Scripts\python.exe` on Windows.
pub fn interpreter_path(app_root: &Path) -> PathBuf {
    VENV_INTERPRETER
        .iter()
        .fold(app_root.join(VENV_DIR), |path, part| path.join(part))
}

/// A fully resolved child process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    program: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl ServerCommand {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I, working_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: working_dir.into(),
        }
    }

    /// `<python> -m streamlit run <script> --server.port=<port> --server.headless=<bool>`
    /// run from `app_root`.
    pub fn streamlit(config: &ServerConfig, app_root: &Path) -> Self {
        let program = match &config.interpreter {
            Some(interpreter) if interpreter.is_absolute() => interpreter.clone(),
            Some(interpreter) => app_root.join(interpreter),
            None => interpreter_path(app_root),
        };

        let args = [
            MODULE_FLAG.to_string(),
            STREAMLIT_MODULE.to_string(),
            RUN_SUBCOMMAND.to_string(),
            config.script.clone(),
            format!("--server.port={}", config.port),
            format!("--server.headless={}", config.headless),
        ];

        Self::new(program, args, app_root)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub(crate) fn to_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Display for ServerCommand {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.program.display())?;
        for arg in &self.args {
            write!(formatter, " {arg}")?;
        }
        Ok(())
    }
}
