//! Directive processing context.
//!
//! Provides file system access, source location and scoped diagnostics to
//! directive handlers.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Diagnostic, Level};

/// Callback used to read files (includes, partials, changelog fragments).
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send + Sync;

/// Context provided to a directive handler for one invocation.
///
/// Created by [`DirectiveProcessor`](crate::DirectiveProcessor) for each
/// directive. Messages recorded through [`warn`](Self::warn) and
/// [`error`](Self::error) are prefixed with the directive name and carry the
/// source location.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use tagdown_directives::DirectiveContext;
///
/// let read = |path: &Path| std::fs::read_to_string(path);
/// let ctx = DirectiveContext::new("include", Path::new("docs"), &read)
///     .with_source_path(Path::new("docs/guide.md"))
///     .with_line(42);
///
/// assert_eq!(ctx.resolve_path("snippets/example.md"), Path::new("docs/snippets/example.md"));
/// ctx.warn("example is outdated");
/// assert_eq!(
///     ctx.into_diagnostics()[0].to_string(),
///     "[include] example is outdated (docs/guide.md:42)",
/// );
/// ```
pub struct DirectiveContext<'a> {
    /// Name of the directive being processed.
    pub name: &'a str,
    /// Path to the source document (if known).
    pub source_path: Option<&'a Path>,
    /// Base directory for resolving relative paths.
    pub base_dir: &'a Path,
    /// Line number where the directive appears (1-indexed).
    pub line: usize,
    read_file: &'a dyn Fn(&Path) -> io::Result<String>,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl<'a> DirectiveContext<'a> {
    /// Create a context with no source path, at line 1.
    #[must_use]
    pub fn new(
        name: &'a str,
        base_dir: &'a Path,
        read_file: &'a dyn Fn(&Path) -> io::Result<String>,
    ) -> Self {
        Self {
            name,
            source_path: None,
            base_dir,
            line: 1,
            read_file,
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_source_path(mut self, source_path: &'a Path) -> Self {
        self.source_path = Some(source_path);
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Resolve a relative path against the base directory.
    #[must_use]
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Read a file using the context's read callback.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read(&self, path: &Path) -> io::Result<String> {
        (self.read_file)(path)
    }

    /// Record a warning; the directive output is kept.
    pub fn warn(&self, message: impl Into<String>) {
        self.record(Level::Warning, message.into());
    }

    /// Record an error without failing the handler.
    pub fn error(&self, message: impl Into<String>) {
        self.record(Level::Error, message.into());
    }

    /// Consume the context and return the recorded diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }

    pub(crate) fn diagnostic(&self, level: Level, message: String) -> Diagnostic {
        Diagnostic {
            level,
            directive: self.name.to_owned(),
            message,
            path: self.source_path.map(Path::to_path_buf),
            line: self.line,
        }
    }

    fn record(&self, level: Level, message: String) {
        let diagnostic = self.diagnostic(level, message);
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_read(_: &Path) -> io::Result<String> {
        Ok(String::new())
    }

    #[test]
    fn test_resolve_path() {
        let ctx = DirectiveContext::new("include", Path::new("docs"), &empty_read);
        assert_eq!(
            ctx.resolve_path("snippets/code.md"),
            PathBuf::from("docs/snippets/code.md")
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        let ctx = DirectiveContext::new("include", Path::new("/home/user/docs"), &empty_read);
        // Joining absolute path replaces the base
        assert_eq!(ctx.resolve_path("/etc/config"), PathBuf::from("/etc/config"));
    }

    #[test]
    fn test_read_file_error() {
        let missing = |_: &Path| -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::NotFound, "not found"))
        };
        let ctx = DirectiveContext::new("include", Path::new("."), &missing);
        assert!(ctx.read(Path::new("nonexistent.md")).is_err());
    }

    #[test]
    fn test_diagnostics_are_scoped() {
        let ctx = DirectiveContext::new("cypress-env-example", Path::new("."), &empty_read)
            .with_line(7);
        ctx.warn("JSON preview skipped");
        ctx.error("broken");

        let diagnostics = ctx.into_diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].level, Level::Warning);
        assert_eq!(diagnostics[0].directive, "cypress-env-example");
        assert_eq!(diagnostics[0].line, 7);
        assert_eq!(diagnostics[1].level, Level::Error);
    }
}
