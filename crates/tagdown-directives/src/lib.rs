//! Hexo tag and remark directive expansion for documentation sources.
//!
//! Documentation pages mix two directive syntaxes in ordinary Markdown:
//!
//! - Hexo tags: `{% badge danger removed %}`, `{% note info %}...{% endnote %}`
//! - remark directives: `::include{file=setup.md}`, `:::note{type=info}` ... `:::`
//!
//! A [`DirectiveProcessor`] tokenizes a document into a directive tree
//! (fenced code and inline code spans are opaque), looks every directive up in
//! an immutable [`DirectiveRegistry`] and splices the handler's output in place
//! of the directive. Failures are collected as [`Diagnostic`]s and only remove
//! the directive that failed.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use tagdown_directives::{
//!     BoxError, DirectiveProcessor, LinkResolve, RegistryOptions, default_registry,
//! };
//!
//! struct Sidebar;
//!
//! impl LinkResolve for Sidebar {
//!     fn resolve(&self, href: &str, _: Option<&Path>) -> Result<String, BoxError> {
//!         Ok(format!("/api/commands/{href}.html"))
//!     }
//! }
//!
//! let registry = default_registry(RegistryOptions::new(Arc::new(Sidebar)));
//! let processor = DirectiveProcessor::new(&registry);
//!
//! let output = processor.process("{% badge danger removed %} See {% url '.and()' and %}.");
//! assert_eq!(
//!     output.text,
//!     "<Badge type=\"danger\">removed</Badge> See [.and()](/api/commands/and.html)."
//! );
//! assert!(output.diagnostics.is_empty());
//! ```

mod args;
mod context;
mod diagnostic;
mod error;
mod fence;
mod handler;
mod handlers;
mod literal;
mod output;
mod parser;
mod processor;
mod registry;
mod util;

pub use args::DirectiveArgs;
pub use context::{DirectiveContext, ReadFileFn};
pub use diagnostic::{Diagnostic, Level};
pub use error::{BoxError, DirectiveError};
pub use handler::{ContainerDirective, LeafDirective, LinkResolve};
pub use handlers::{
    AssertionKind, BadgeDirective, BadgeStyle, ChangelogDirective, Choice, ConfigExampleDirective,
    ConfigExampleKind, HistoryDirective, ImageDirective, IncludeDirective, ListDirective,
    ListKind, NoteDirective, NoteKind, PartialDirective, RegistryOptions, RequirementKind,
    TimeoutKind, UrlDirective, UrlHashDirective, VideoDirective, VideoProvider, default_registry,
};
pub use literal::{LiteralError, parse_literal};
pub use output::DirectiveOutput;
pub use processor::{DirectiveProcessor, DirectiveProcessorConfig, ProcessedDocument};
pub use registry::{DirectiveKind, DirectiveRegistry, Handler};
pub use util::{escape_html, slugify};
