use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location as PanicLocation;
use std::path::Path;

/// Source position attached to every error variant in the workspace.
///
/// Captured with `ErrorLocation::from(Location::caller())` inside
/// `#[track_caller]` functions so the position points at the failing call
/// site rather than the error constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl ErrorLocation {
    pub const fn from(location: &'static PanicLocation<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }

    /// File name without its directory, as shown in log lines.
    pub fn file_name(&self) -> &'static str {
        Path::new(self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.file)
    }
}

impl Display for ErrorLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(
            formatter,
            "[{}:{}:{}]",
            self.file_name(),
            self.line,
            self.column
        )
    }
}
