//! Directive output types.

use std::path::PathBuf;

/// Output from directive processing.
///
/// - [`Text`](Self::Text): final replacement text, spliced in verbatim and
///   never rescanned
/// - [`Markdown`](Self::Markdown): content that is expanded again as a nested
///   document (changelog fragments)
/// - [`Included`](Self::Included): the content of a file, expanded as a
///   nested document whose relative paths resolve against that file's
///   directory (includes, partials)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveOutput {
    Text(String),
    Markdown(String),
    Included { path: PathBuf, markdown: String },
}

impl DirectiveOutput {
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create a markdown output for recursive processing.
    #[must_use]
    pub fn markdown(s: impl Into<String>) -> Self {
        Self::Markdown(s.into())
    }

    /// Create output for the content of the file at `path`.
    #[must_use]
    pub fn included(path: impl Into<PathBuf>, markdown: impl Into<String>) -> Self {
        Self::Included {
            path: path.into(),
            markdown: markdown.into(),
        }
    }

}
