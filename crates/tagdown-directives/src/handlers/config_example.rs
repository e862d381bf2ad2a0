//! Cypress configuration samples rendered as JS, TS and JSON tabs.
//!
//! The body holds one or two fenced code blocks. With two, the first is a
//! header (imports, helpers) placed above the config and the second is the
//! config body:
//!
//! ````text
//! :::cypress-config-example
//! ```js
//! const { downloadFile } = require('cypress-downloadfile/lib/addPlugin')
//! ```
//! ```js
//! {
//!   defaultCommandTimeout: 10000,
//! }
//! ```
//! :::
//! ````

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use super::Choice;
use crate::literal::parse_literal;
use crate::{ContainerDirective, DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigExampleKind {
    /// Body is the config object.
    Config,
    /// Body is the content of `setupNodeEvents(on, config)`.
    Plugin,
    /// Body is the `env` object.
    Env,
}

impl Choice for ConfigExampleKind {
    const WHAT: &'static str = "config example";
    const ALL: &'static [Self] = &[Self::Config, Self::Plugin, Self::Env];

    fn as_str(self) -> &'static str {
        match self {
            Self::Config => "cypress-config-example",
            Self::Plugin => "cypress-config-plugin-example",
            Self::Env => "cypress-env-example",
        }
    }
}

impl ConfigExampleKind {
    /// Argument passed to `defineConfig(...)`.
    fn config_object(self, body: &str) -> String {
        match self {
            Self::Config => body.to_owned(),
            Self::Plugin => format!(
                "{{\n  // setupNodeEvents can be defined in either\n  \
                 // the e2e or component configuration\n  \
                 e2e: {{\n    setupNodeEvents(on, config) {{\n{}\n    }},\n  }},\n}}",
                indent(body, "      ")
            ),
            Self::Env => format!("{{\n  env: {},\n}}", indent(body, "  ").trim_start()),
        }
    }

    /// File name of the legacy JSON preview tab, if this kind has one.
    fn json_file(self) -> Option<&'static str> {
        match self {
            Self::Config => Some("cypress.json"),
            Self::Plugin => None,
            Self::Env => Some("cypress.env.json"),
        }
    }
}

/// Handler for one [`ConfigExampleKind`].
pub struct ConfigExampleDirective {
    kind: ConfigExampleKind,
}

impl ConfigExampleDirective {
    #[must_use]
    pub fn new(kind: ConfigExampleKind) -> Self {
        Self { kind }
    }
}

impl ContainerDirective for ConfigExampleDirective {
    fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    fn process(
        &self,
        _args: &DirectiveArgs,
        body: &str,
        ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let blocks = code_blocks(body);
        let (header, body) = match blocks.as_slice() {
            [body] => (None, body.as_str()),
            [header, body] => (Some(header.as_str()), body.as_str()),
            _ => {
                return Err(DirectiveError::InvalidBody(format!(
                    "expected 1 or 2 code blocks, found {}",
                    blocks.len()
                )));
            }
        };

        let config = self.kind.config_object(body);
        let mut tabs = vec![
            Tab {
                file: "cypress.config.js",
                lang: "js",
                code: javascript(header, &config),
            },
            Tab {
                file: "cypress.config.ts",
                lang: "ts",
                code: typescript(header, &config),
            },
        ];

        if let Some(file) = self.kind.json_file() {
            let json = parse_literal(body).map_err(|e| e.to_string()).and_then(|value| {
                serde_json::to_string_pretty(&value).map_err(|e| e.to_string())
            });
            match json {
                Ok(code) => tabs.push(Tab {
                    file,
                    lang: "json",
                    code,
                }),
                Err(e) => ctx.warn(format!("{file} preview omitted: {e}")),
            }
        }

        Ok(DirectiveOutput::Text(render_tabs(&tabs)))
    }
}

struct Tab {
    file: &'static str,
    lang: &'static str,
    code: String,
}

fn render_tabs(tabs: &[Tab]) -> String {
    let mut out = String::from("<Tabs groupId=\"config-file\">\n");
    for (idx, tab) in tabs.iter().enumerate() {
        let default = if idx == 0 { " default" } else { "" };
        let _ = write!(
            out,
            "<TabItem value=\"{file}\" label=\"{file}\"{default}>\n\n```{lang}\n{code}\n```\n\n</TabItem>\n",
            file = tab.file,
            lang = tab.lang,
            code = tab.code,
        );
    }
    out.push_str("</Tabs>");
    out
}

fn javascript(header: Option<&str>, config: &str) -> String {
    let mut code = String::from("const { defineConfig } = require('cypress')\n");
    if let Some(header) = header {
        let _ = writeln!(code, "{header}");
    }
    let _ = write!(code, "\nmodule.exports = defineConfig({config})");
    code
}

fn typescript(header: Option<&str>, config: &str) -> String {
    let mut code = String::from("import { defineConfig } from 'cypress'\n");
    if let Some(header) = header {
        let _ = writeln!(code, "{header}");
    }
    let _ = write!(code, "\nexport default defineConfig({config})");
    code
}

/// Contents of the fenced code blocks in `markdown`, in order.
fn code_blocks(markdown: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                current = Some(String::new());
            }
            Event::Text(text) => {
                if let Some(block) = current.as_mut() {
                    block.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block.trim_end().to_owned());
                }
            }
            _ => {}
        }
    }

    blocks
}

/// Prefix every non-empty line with `prefix`.
fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
