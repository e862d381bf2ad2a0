//! `badge`, `video`, `imgTag` and `image`.

use std::fmt::Write;

use super::Choice;
use crate::util::escape_html;
use crate::{DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput, LeafDirective};

/// Markup emitted for badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeStyle {
    /// `<Badge type="danger">removed</Badge>`
    #[default]
    Component,
    /// `<span class="badge badge-pill badge-danger">removed</span>`
    Legacy,
}

/// `{% badge danger removed %}` or `::badge[removed]{type=danger}`.
pub struct BadgeDirective {
    style: BadgeStyle,
}

impl BadgeDirective {
    #[must_use]
    pub fn new(style: BadgeStyle) -> Self {
        Self { style }
    }
}

impl LeafDirective for BadgeDirective {
    fn name(&self) -> &'static str {
        "badge"
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        _ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let kind = args
            .get("type")
            .or_else(|| args.arg(0))
            .ok_or(DirectiveError::MissingArgument("badge type"))?;
        let content = match args.content() {
            Some(content) => content.to_owned(),
            None => args.rest(1).unwrap_or_default(),
        };

        let html = match self.style {
            BadgeStyle::Component => format!("<Badge type=\"{kind}\">{content}</Badge>"),
            BadgeStyle::Legacy => {
                format!("<span class=\"badge badge-pill badge-{kind}\">{content}</span>")
            }
        };
        Ok(DirectiveOutput::Text(html))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoProvider {
    Youtube,
    Vimeo,
    Local,
}

impl Choice for VideoProvider {
    const WHAT: &'static str = "video provider";
    const ALL: &'static [Self] = &[Self::Youtube, Self::Vimeo, Self::Local];

    fn as_str(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Vimeo => "vimeo",
            Self::Local => "local",
        }
    }
}

impl VideoProvider {
    fn render(self, id: &str) -> String {
        let id = escape_html(id);
        match self {
            Self::Youtube => format!(
                "<iframe class=\"video\" src=\"https://www.youtube.com/embed/{id}\" \
                 frameborder=\"0\" allowfullscreen></iframe>"
            ),
            Self::Vimeo => format!(
                "<iframe class=\"video\" src=\"https://player.vimeo.com/video/{id}\" \
                 frameborder=\"0\" allowfullscreen></iframe>"
            ),
            Self::Local => format!(
                "<video class=\"video\" controls><source src=\"{id}\" type=\"video/mp4\" /></video>"
            ),
        }
    }
}

/// `{% video youtube ID %}` or `::video{provider=vimeo id=ID}`.
pub struct VideoDirective;

impl LeafDirective for VideoDirective {
    fn name(&self) -> &'static str {
        "video"
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        _ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let provider = args
            .get("provider")
            .or_else(|| args.arg(0))
            .ok_or(DirectiveError::MissingArgument("video provider"))?;
        let provider = VideoProvider::parse(provider)?;
        let id = args
            .get("id")
            .or_else(|| args.get("src"))
            .or_else(|| args.arg(1))
            .ok_or(DirectiveError::MissingArgument("video id"))?;

        Ok(DirectiveOutput::Text(provider.render(id)))
    }
}

/// Image with optional alt text and class.
///
/// ```text
/// {% imgTag /img/guides/test-runner.png "Test Runner" "no-border" %}
/// ::image[Test Runner]{src=/img/guides/test-runner.png .no-border}
/// ```
pub struct ImageDirective {
    name: &'static str,
}

impl ImageDirective {
    /// Handler registered under `name` (`imgTag` and `image` share it).
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl LeafDirective for ImageDirective {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        _ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let (src, alt, class) = if args.positional.is_empty() {
            let src = args
                .get("src")
                .ok_or(DirectiveError::MissingAttribute("src"))?;
            let alt = args.content().or_else(|| args.get("alt")).unwrap_or_default();
            let class = args
                .get("class")
                .map(str::to_owned)
                .or_else(|| (!args.classes.is_empty()).then(|| args.classes.join(" ")));
            (src, alt, class)
        } else {
            if args.positional.len() > 3 {
                return Err(DirectiveError::ArgumentCount {
                    expected: "1 to 3",
                    found: args.positional.len(),
                });
            }
            let src = args.arg(0).unwrap_or_default();
            let alt = args.arg(1).unwrap_or_default();
            (src, alt, args.arg(2).map(str::to_owned))
        };

        let mut html = format!(
            "<img src=\"{}\" alt=\"{}\"",
            escape_html(src),
            escape_html(alt)
        );
        if let Some(class) = class {
            let _ = write!(html, " class=\"{}\"", escape_html(&class));
        }
        html.push_str(" />");

        Ok(DirectiveOutput::Text(html))
    }
}
