//! Diagnostics reported while expanding directives.

use std::fmt;
use std::path::PathBuf;

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// The directive was kept, possibly degraded (e.g. a skipped preview tab).
    Warning,
    /// The directive was removed from the output.
    Error,
}

/// A message scoped to one directive occurrence.
///
/// Displays as `[name] message (path:line)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    /// Directive name, empty for structural problems with no name (a stray `:::`).
    pub directive: String,
    pub message: String,
    pub path: Option<PathBuf>,
    pub line: usize,
}

impl Diagnostic {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.directive.is_empty() {
            write!(f, "[{}] ", self.directive)?;
        }
        f.write_str(&self.message)?;
        match &self.path {
            Some(path) => write!(f, " ({}:{})", path.display(), self.line),
            None => write!(f, " (line {})", self.line),
        }
    }
}
