//! Directive error types.

use std::io;

/// Boxed error returned by a [`LinkResolve`](crate::LinkResolve) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single directive.
///
/// A handler returning an error has its directive removed from the output;
/// the error message is reported with the directive name and location.
#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    /// Wrong number of positional arguments.
    #[error("expected {expected} arguments, found {found}")]
    ArgumentCount {
        /// Accepted count, e.g. "1 to 3".
        expected: &'static str,
        found: usize,
    },
    /// A required positional argument is missing.
    #[error("missing {0} argument")]
    MissingArgument(&'static str),
    /// A required `{key=value}` attribute is missing.
    #[error("missing `{0}` attribute")]
    MissingAttribute(&'static str),
    /// A closed-set parameter has a value outside the set.
    #[error("invalid {what} '{value}' (expected one of: {valid})")]
    InvalidOption {
        what: &'static str,
        value: String,
        valid: String,
    },
    /// A referenced file could not be read.
    #[error("Failed to read file: {path} ({source})")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },
    /// A link target could not be resolved.
    #[error("{0}")]
    Link(BoxError),
    /// The directive body does not have the required shape.
    #[error("{0}")]
    InvalidBody(String),
    /// A directory glob pattern was rejected.
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl DirectiveError {
    /// Build an [`InvalidOption`](Self::InvalidOption) listing the accepted values.
    pub(crate) fn invalid_option<'v>(
        what: &'static str,
        value: &str,
        valid: impl IntoIterator<Item = &'v str>,
    ) -> Self {
        Self::InvalidOption {
            what,
            value: value.to_owned(),
            valid: valid.into_iter().collect::<Vec<_>>().join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_message() {
        let err = DirectiveError::ReadFile {
            path: "missing".to_owned(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert!(err.to_string().starts_with("Failed to read file: missing"));
    }

    #[test]
    fn test_invalid_option_lists_valid_values() {
        let err = DirectiveError::invalid_option("note type", "tip", ["info", "warning"]);
        assert_eq!(
            err.to_string(),
            "invalid note type 'tip' (expected one of: info, warning)"
        );
    }
}
