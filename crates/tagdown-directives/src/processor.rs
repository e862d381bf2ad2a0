//! Pipeline driver: tokenize, dispatch, invoke, splice.

use std::io;
use std::path::{Path, PathBuf};

use crate::context::ReadFileFn;
use crate::parser::{self, DirectiveNode, Node, Syntax};
use crate::{
    Diagnostic, DirectiveContext, DirectiveKind, DirectiveOutput, DirectiveRegistry, Handler,
    Level,
};

/// Configuration for one document's [`DirectiveProcessor`].
pub struct DirectiveProcessorConfig {
    /// Base directory for resolving relative paths (e.g., for `::include`).
    pub base_dir: PathBuf,
    /// Path to the source file being processed (if known).
    pub source_path: Option<PathBuf>,
    /// Callback to read files from the file system.
    ///
    /// Default: `std::fs::read_to_string`
    pub read_file: Option<Box<ReadFileFn>>,
    /// Maximum nesting of `Markdown` outputs (includes within includes).
    ///
    /// Default: 10
    pub max_include_depth: usize,
}

impl Default for DirectiveProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveProcessorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            source_path: None,
            read_file: None,
            max_include_depth: 10,
        }
    }

    /// Set the base directory for resolving relative paths.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the source file path.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Set the file reading callback.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + Sync + 'static,
    {
        self.read_file = Some(Box::new(read_file));
        self
    }

    /// Set the maximum include depth.
    #[must_use]
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    fn read_fn(&self) -> &dyn Fn(&Path) -> io::Result<String> {
        match &self.read_file {
            Some(f) => f.as_ref(),
            None => &default_read_file,
        }
    }
}

fn default_read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Result of expanding one document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessedDocument {
    /// Document text with every handled directive replaced.
    pub text: String,
    /// Warnings and errors in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ProcessedDocument {
    /// Whether any directive was dropped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Expands directives in a document using a shared [`DirectiveRegistry`].
///
/// Each run tokenizes the input into a directive tree, then walks it once:
/// container bodies are expanded first, the handler's output is spliced in
/// place of the directive, and scanning continues after it. `Text` output is
/// never rescanned. `Markdown` and `Included` output is expanded as a nested
/// document, up to `max_include_depth` levels; relative paths inside an
/// included file resolve against that file's directory. Unknown directives are kept exactly as
/// written, and input without directives comes back byte-identical.
///
/// # Example
///
/// ```
/// use tagdown_directives::{
///     DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput, DirectiveProcessor,
///     DirectiveRegistry, LeafDirective,
/// };
///
/// struct Kbd;
///
/// impl LeafDirective for Kbd {
///     fn name(&self) -> &str { "kbd" }
///     fn process(&self, args: &DirectiveArgs, _: &DirectiveContext)
///         -> Result<DirectiveOutput, DirectiveError> {
///         Ok(DirectiveOutput::text(format!("<kbd>{}</kbd>", args.content)))
///     }
/// }
///
/// let registry = DirectiveRegistry::new().with_leaf(Kbd);
/// let processor = DirectiveProcessor::new(&registry);
///
/// let output = processor.process("Press ::kbd[Ctrl+C] to copy.");
/// assert_eq!(output.text, "Press <kbd>Ctrl+C</kbd> to copy.");
/// ```
pub struct DirectiveProcessor<'r> {
    registry: &'r DirectiveRegistry,
    config: DirectiveProcessorConfig,
}

impl<'r> DirectiveProcessor<'r> {
    /// Create a processor with default configuration.
    #[must_use]
    pub fn new(registry: &'r DirectiveRegistry) -> Self {
        Self::with_config(registry, DirectiveProcessorConfig::default())
    }

    #[must_use]
    pub fn with_config(registry: &'r DirectiveRegistry, config: DirectiveProcessorConfig) -> Self {
        Self { registry, config }
    }

    /// Expand every directive in `input`.
    #[must_use]
    pub fn process(&self, input: &str) -> ProcessedDocument {
        let mut expansion = Expansion {
            processor: self,
            diagnostics: Vec::new(),
        };
        let mut text = String::with_capacity(input.len());
        expansion.expand(input, &self.config.base_dir, 0, &mut text);

        ProcessedDocument {
            text,
            diagnostics: expansion.diagnostics,
        }
    }
}

/// State of a single [`DirectiveProcessor::process`] call.
struct Expansion<'p, 'r> {
    processor: &'p DirectiveProcessor<'r>,
    diagnostics: Vec<Diagnostic>,
}

impl Expansion<'_, '_> {
    fn source_path(&self) -> Option<&Path> {
        self.processor.config.source_path.as_deref()
    }

    fn expand(&mut self, input: &str, base_dir: &Path, depth: usize, out: &mut String) {
        let document = parser::parse(input);

        for warning in document.warnings {
            self.diagnostics.push(Diagnostic {
                level: Level::Warning,
                directive: warning.name,
                message: warning.message,
                path: self.source_path().map(Path::to_path_buf),
                line: warning.line,
            });
        }

        self.render(&document.nodes, base_dir, depth, out);
    }

    fn render(&mut self, nodes: &[Node<'_>], base_dir: &Path, depth: usize, out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Directive(directive) => {
                    self.render_directive(directive, base_dir, depth, out);
                }
            }
        }
    }

    fn render_directive(
        &mut self,
        node: &DirectiveNode<'_>,
        base_dir: &Path,
        depth: usize,
        out: &mut String,
    ) {
        let processor = self.processor;
        let config = &processor.config;

        let body = node.is_container().then(|| {
            let mut body = String::new();
            self.render(&node.children, base_dir, depth, &mut body);
            body
        });

        let kind = if node.is_container() {
            DirectiveKind::Container
        } else {
            DirectiveKind::Leaf
        };

        let Some(handler) = processor.registry.lookup(kind, &node.name) else {
            self.check_unpaired(node, kind);
            keep(node, body.as_deref(), out);
            return;
        };

        let mut ctx = DirectiveContext::new(&node.name, base_dir, config.read_fn())
            .with_line(node.line);
        if let Some(source_path) = config.source_path.as_deref() {
            ctx = ctx.with_source_path(source_path);
        }

        let result = match handler {
            Handler::Leaf(h) => h.process(&node.args, &ctx),
            Handler::Container(h) => h.process(&node.args, body.as_deref().unwrap_or_default(), &ctx),
        };

        let mut nested = None;
        let failure = match result {
            Ok(DirectiveOutput::Text(text)) => {
                out.push_str(&text);
                None
            }
            Ok(DirectiveOutput::Markdown(_) | DirectiveOutput::Included { .. })
                if depth >= config.max_include_depth =>
            {
                Some(format!(
                    "Maximum include depth ({}) exceeded",
                    config.max_include_depth
                ))
            }
            Ok(DirectiveOutput::Markdown(markdown)) => {
                nested = Some((markdown, base_dir.to_path_buf()));
                None
            }
            // Paths inside an included file are relative to that file.
            Ok(DirectiveOutput::Included { path, markdown }) => {
                let dir = path.parent().unwrap_or(base_dir).to_path_buf();
                nested = Some((markdown, dir));
                None
            }
            Err(err) => {
                tracing::debug!(directive = %node.name, line = node.line, "directive failed: {err}");
                Some(err.to_string())
            }
        };

        let error = failure.map(|message| ctx.diagnostic(Level::Error, message));
        self.diagnostics.extend(ctx.into_diagnostics());
        self.diagnostics.extend(error);

        if let Some((markdown, dir)) = nested {
            self.expand(&markdown, &dir, depth + 1, out);
        }
    }

    /// Warn about `{% name %}` left open when only a container `name` exists.
    fn check_unpaired(&mut self, node: &DirectiveNode<'_>, kind: DirectiveKind) {
        if kind == DirectiveKind::Leaf
            && node.syntax == Syntax::Hexo
            && self
                .processor
                .registry
                .lookup(DirectiveKind::Container, &node.name)
                .is_some()
        {
            self.diagnostics.push(Diagnostic {
                level: Level::Warning,
                directive: node.name.clone(),
                message: format!("{} has no matching {{% end{} %}}", node.open, node.name),
                path: self.source_path().map(Path::to_path_buf),
                line: node.line,
            });
        }
    }
}

/// Emit a directive exactly as written, with its expanded body.
fn keep(node: &DirectiveNode<'_>, body: Option<&str>, out: &mut String) {
    out.push_str(node.open);
    if let Some(body) = body {
        out.push_str(body);
    }
    if let Some(close) = node.close {
        out.push_str(close);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ContainerDirective, DirectiveArgs, DirectiveError, LeafDirective};

    struct Badge;

    impl LeafDirective for Badge {
        fn name(&self) -> &str {
            "badge"
        }

        fn process(
            &self,
            args: &DirectiveArgs,
            _ctx: &DirectiveContext,
        ) -> Result<DirectiveOutput, DirectiveError> {
            let kind = args.arg(0).ok_or(DirectiveError::MissingArgument("type"))?;
            let content = args.rest(1).unwrap_or_default();
            Ok(DirectiveOutput::text(format!("<Badge type=\"{kind}\">{content}</Badge>")))
        }
    }

    struct Wrap;

    impl ContainerDirective for Wrap {
        fn name(&self) -> &str {
            "wrap"
        }

        fn process(
            &self,
            _args: &DirectiveArgs,
            body: &str,
            ctx: &DirectiveContext,
        ) -> Result<DirectiveOutput, DirectiveError> {
            if body.trim().is_empty() {
                ctx.warn("empty body");
            }
            Ok(DirectiveOutput::text(format!("<div>{}</div>", body.trim())))
        }
    }

    struct Include;

    impl LeafDirective for Include {
        fn name(&self) -> &str {
            "include"
        }

        fn process(
            &self,
            args: &DirectiveArgs,
            ctx: &DirectiveContext,
        ) -> Result<DirectiveOutput, DirectiveError> {
            let file = args.get("file").ok_or(DirectiveError::MissingAttribute("file"))?;
            let path = ctx.resolve_path(file);
            ctx.read(&path)
                .map(|markdown| DirectiveOutput::included(&path, markdown))
                .map_err(|source| DirectiveError::ReadFile {
                    path: file.to_owned(),
                    source,
                })
        }
    }

    fn registry() -> DirectiveRegistry {
        DirectiveRegistry::new()
            .with_leaf(Badge)
            .with_leaf(Include)
            .with_container(Wrap)
    }

    fn files(path: &Path) -> io::Result<String> {
        match path.to_str() {
            Some("./a.md") => Ok("A {% badge info nested %}".to_owned()),
            Some("./self.md") => Ok("::include{file=self.md}".to_owned()),
            Some("./guides/setup.md") => Ok("Setup: ::include{file=steps/install.md}".to_owned()),
            Some("./guides/steps/install.md") => Ok("{% badge info npm %}".to_owned()),
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "No such file")),
        }
    }

    fn process(input: &str) -> ProcessedDocument {
        let registry = registry();
        let config = DirectiveProcessorConfig::new()
            .with_source_path("docs/page.md")
            .with_read_file(files);
        DirectiveProcessor::with_config(&registry, config).process(input)
    }

    #[test]
    fn test_leaf_replaced_in_place() {
        let output = process("Status: {% badge danger removed %}!");
        assert_eq!(output.text, "Status: <Badge type=\"danger\">removed</Badge>!");
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_container_body_expanded_first() {
        let output = process("{% wrap %}\n{% badge info a %}\n{% endwrap %}");
        assert_eq!(output.text, "<div><Badge type=\"info\">a</Badge></div>");
    }

    #[test]
    fn test_remark_container() {
        let output = process(":::wrap\nhello\n:::\nafter\n");
        assert_eq!(output.text, "<div>hello</div>\nafter\n");
    }

    #[test]
    fn test_unknown_directive_kept_with_body_expanded() {
        let output = process("{% tip %}\n{% badge info a %}\n{% endtip %} ::video[x]{id=1}");
        assert_eq!(
            output.text,
            "{% tip %}\n<Badge type=\"info\">a</Badge>\n{% endtip %} ::video[x]{id=1}"
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_error_removes_directive() {
        let output = process("before {% badge %} after");
        assert_eq!(output.text, "before  after");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics[0].to_string(),
            "[badge] missing type argument (docs/page.md:1)"
        );
        assert!(output.has_errors());
    }

    #[test]
    fn test_markdown_output_is_expanded() {
        let output = process("::include{file=a.md}");
        assert_eq!(output.text, "A <Badge type=\"info\">nested</Badge>");
    }

    #[test]
    fn test_missing_include_keeps_document() {
        let output = process("# Title\n\n::include{file=missing}\n\nEnd\n");
        assert_eq!(output.text, "# Title\n\n\n\nEnd\n");
        assert!(output.diagnostics[0]
            .message
            .contains("Failed to read file: missing"));
    }

    #[test]
    fn test_include_depth_limit() {
        let registry = registry();
        let config = DirectiveProcessorConfig::new()
            .with_read_file(files)
            .with_max_include_depth(3);
        let output = DirectiveProcessor::with_config(&registry, config).process("::include{file=self.md}");

        assert_eq!(output.text, "");
        assert_eq!(output.diagnostics.len(), 1);
        assert!(output.diagnostics[0]
            .message
            .contains("Maximum include depth (3) exceeded"));
    }

    #[test]
    fn test_handler_warning_is_reported() {
        let output = process("{% wrap %}{% endwrap %}");
        assert_eq!(output.text, "<div></div>");
        assert_eq!(output.diagnostics[0].level, Level::Warning);
        assert_eq!(output.diagnostics[0].directive, "wrap");
    }

    #[test]
    fn test_unpaired_container_open_warns() {
        let output = process("{% wrap %} no end");
        assert_eq!(output.text, "{% wrap %} no end");
        assert!(output.diagnostics[0]
            .message
            .contains("has no matching {% endwrap %}"));
    }

    #[test]
    fn test_nested_include_relative_to_included_file() {
        let output = process("::include{file=guides/setup.md}");
        assert_eq!(output.text, "Setup: <Badge type=\"info\">npm</Badge>");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    }

    #[test]
    fn test_output_is_not_rescanned() {
        struct Emit(Arc<AtomicUsize>);

        impl LeafDirective for Emit {
            fn name(&self) -> &str {
                "emit"
            }

            fn process(
                &self,
                _args: &DirectiveArgs,
                _ctx: &DirectiveContext,
            ) -> Result<DirectiveOutput, DirectiveError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(DirectiveOutput::text("{% badge info raw %} {% emit %}"))
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let registry = DirectiveRegistry::new()
            .with_leaf(Badge)
            .with_leaf(Emit(Arc::clone(&calls)));
        let output = DirectiveProcessor::new(&registry).process("{% emit %}");

        assert_eq!(output.text, "{% badge info raw %} {% emit %}");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_plain_document_is_byte_identical() {
        let input = "# Guide\r\n\r\nSome `code` and std::fs, 50% off {not a tag}.\n\n```\n{% badge x y %}\n```\n";
        let output = process(input);
        assert_eq!(output.text, input);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_second_pass_is_noop() {
        let first = process("Use {% badge info new %} and ::include{file=a.md}\n");
        let second = process(&first.text);
        assert_eq!(second.text, first.text);
        assert!(second.diagnostics.is_empty());
    }
}
