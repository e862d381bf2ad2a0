//! `note` callouts.

use std::fmt::{self, Write};

use super::Choice;
use crate::{ContainerDirective, DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteKind {
    #[default]
    Info,
    Warning,
    Success,
    Danger,
    Bolt,
}

impl NoteKind {
    /// Font Awesome icon shown next to the callout.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Info => "fa-info-circle",
            Self::Warning => "fa-exclamation-triangle",
            Self::Success => "fa-check-circle",
            Self::Danger => "fa-exclamation-octagon",
            Self::Bolt => "fa-bolt",
        }
    }
}

impl Choice for NoteKind {
    const WHAT: &'static str = "note type";
    const ALL: &'static [Self] = &[
        Self::Info,
        Self::Warning,
        Self::Success,
        Self::Danger,
        Self::Bolt,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Bolt => "bolt",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callout box.
///
/// ```text
/// {% note warning Before you start %}
/// Body
/// {% endnote %}
///
/// :::note{type=warning title="Before you start"}
/// Body
/// :::
/// ```
pub struct NoteDirective;

impl ContainerDirective for NoteDirective {
    fn name(&self) -> &'static str {
        "note"
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        body: &str,
        _ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let kind = args
            .arg(0)
            .or_else(|| args.get("type"))
            .map_or(Ok(NoteKind::default()), NoteKind::parse)?;
        let title = args
            .rest(1)
            .or_else(|| args.get("title").map(str::to_owned))
            .or_else(|| args.content().map(str::to_owned));

        let mut out = format!("<Alert type=\"{kind}\" icon=\"{}\">\n\n", kind.icon());
        if let Some(title) = title {
            let _ = write!(out, "<strong class=\"alert-header\">{title}</strong>\n\n");
        }
        let body = body.trim();
        if !body.is_empty() {
            out.push_str(body);
            out.push_str("\n\n");
        }
        out.push_str("</Alert>");

        Ok(DirectiveOutput::Text(out))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn run(args: &DirectiveArgs, body: &str) -> Result<DirectiveOutput, DirectiveError> {
        let read = |_: &Path| -> std::io::Result<String> { Ok(String::new()) };
        let ctx = DirectiveContext::new("note", Path::new("."), &read);
        NoteDirective.process(args, body, &ctx)
    }

    #[test]
    fn test_hexo_note_with_title() {
        let args = DirectiveArgs::parse_hexo("warning Before you start");
        assert_eq!(
            run(&args, "\nRead this first.\n").unwrap(),
            DirectiveOutput::text(
                "<Alert type=\"warning\" icon=\"fa-exclamation-triangle\">\n\n\
                 <strong class=\"alert-header\">Before you start</strong>\n\n\
                 Read this first.\n\n\
                 </Alert>"
            )
        );
    }

    #[test]
    fn test_remark_note_defaults_to_info() {
        let args = DirectiveArgs::parse("", "");
        assert_eq!(
            run(&args, "Body\n").unwrap(),
            DirectiveOutput::text("<Alert type=\"info\" icon=\"fa-info-circle\">\n\nBody\n\n</Alert>")
        );
    }

    #[test]
    fn test_remark_attrs() {
        let args = DirectiveArgs::parse("", r#"type=bolt title="Fast path""#);
        let DirectiveOutput::Text(out) = run(&args, "Body").unwrap() else {
            panic!("expected text output");
        };
        assert!(out.starts_with("<Alert type=\"bolt\" icon=\"fa-bolt\">"));
        assert!(out.contains("<strong class=\"alert-header\">Fast path</strong>"));
    }

    #[test]
    fn test_unknown_type() {
        let args = DirectiveArgs::parse_hexo("tip");
        assert_eq!(
            run(&args, "Body").unwrap_err().to_string(),
            "invalid note type 'tip' (expected one of: info, warning, success, danger, bolt)"
        );
    }
}
