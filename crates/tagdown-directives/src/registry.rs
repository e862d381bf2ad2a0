//! Directive registry.

use std::collections::HashMap;
use std::fmt;

use crate::{ContainerDirective, LeafDirective};

/// Whether a directive has a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Self-contained, e.g. `{% badge danger removed %}`.
    Leaf,
    /// Wraps a body, e.g. `{% note info %}...{% endnote %}`.
    Container,
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Leaf => "leaf",
            Self::Container => "container",
        })
    }
}

/// A registered handler borrowed from the registry.
#[derive(Clone, Copy)]
pub enum Handler<'r> {
    Leaf(&'r dyn LeafDirective),
    Container(&'r dyn ContainerDirective),
}

/// Immutable map from `(kind, name)` to directive handler.
///
/// Built once with [`with_leaf`](Self::with_leaf) and
/// [`with_container`](Self::with_container), then shared by reference with
/// every [`DirectiveProcessor`](crate::DirectiveProcessor). Registering the
/// same `(kind, name)` twice keeps the last handler.
///
/// # Example
///
/// ```
/// use tagdown_directives::{
///     DirectiveArgs, DirectiveContext, DirectiveError, DirectiveKind, DirectiveOutput,
///     DirectiveRegistry, LeafDirective,
/// };
///
/// struct Hr;
///
/// impl LeafDirective for Hr {
///     fn name(&self) -> &str { "hr" }
///     fn process(&self, _: &DirectiveArgs, _: &DirectiveContext)
///         -> Result<DirectiveOutput, DirectiveError> {
///         Ok(DirectiveOutput::text("<hr />"))
///     }
/// }
///
/// let registry = DirectiveRegistry::new().with_leaf(Hr);
/// assert!(registry.lookup(DirectiveKind::Leaf, "hr").is_some());
/// assert!(registry.lookup(DirectiveKind::Container, "hr").is_none());
/// ```
#[derive(Default)]
pub struct DirectiveRegistry {
    leaves: HashMap<String, Box<dyn LeafDirective>>,
    containers: HashMap<String, Box<dyn ContainerDirective>>,
}

impl DirectiveRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a leaf directive handler under its own name.
    #[must_use]
    pub fn with_leaf<D: LeafDirective + 'static>(mut self, handler: D) -> Self {
        self.register_leaf(Box::new(handler));
        self
    }

    /// Register a container directive handler under its own name.
    #[must_use]
    pub fn with_container<D: ContainerDirective + 'static>(mut self, handler: D) -> Self {
        self.register_container(Box::new(handler));
        self
    }

    /// Register a boxed leaf handler, replacing any previous one with the same name.
    pub fn register_leaf(&mut self, handler: Box<dyn LeafDirective>) {
        let name = handler.name().to_owned();
        if self.leaves.insert(name.clone(), handler).is_some() {
            tracing::debug!("replacing leaf directive handler: {name}");
        }
    }

    /// Register a boxed container handler, replacing any previous one with the same name.
    pub fn register_container(&mut self, handler: Box<dyn ContainerDirective>) {
        let name = handler.name().to_owned();
        if self.containers.insert(name.clone(), handler).is_some() {
            tracing::debug!("replacing container directive handler: {name}");
        }
    }

    /// Look up the handler for `(kind, name)`.
    #[must_use]
    pub fn lookup(&self, kind: DirectiveKind, name: &str) -> Option<Handler<'_>> {
        match kind {
            DirectiveKind::Leaf => self
                .leaves
                .get(name)
                .map(|h| Handler::Leaf(h.as_ref())),
            DirectiveKind::Container => self
                .containers
                .get(name)
                .map(|h| Handler::Container(h.as_ref())),
        }
    }

    /// Registered names of one kind, sorted.
    #[must_use]
    pub fn names(&self, kind: DirectiveKind) -> Vec<&str> {
        let mut names: Vec<&str> = match kind {
            DirectiveKind::Leaf => self.leaves.keys().map(String::as_str).collect(),
            DirectiveKind::Container => self.containers.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput};

    struct Fixed {
        name: &'static str,
        output: &'static str,
    }

    impl LeafDirective for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn process(
            &self,
            _args: &DirectiveArgs,
            _ctx: &DirectiveContext,
        ) -> Result<DirectiveOutput, DirectiveError> {
            Ok(DirectiveOutput::text(self.output))
        }
    }

    impl ContainerDirective for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn process(
            &self,
            _args: &DirectiveArgs,
            body: &str,
            _ctx: &DirectiveContext,
        ) -> Result<DirectiveOutput, DirectiveError> {
            Ok(DirectiveOutput::text(format!("{}{body}", self.output)))
        }
    }

    fn run_leaf(registry: &DirectiveRegistry, name: &str) -> Option<DirectiveOutput> {
        let read = |_: &std::path::Path| -> std::io::Result<String> { Ok(String::new()) };
        let ctx = DirectiveContext::new(name, std::path::Path::new("."), &read);
        match registry.lookup(DirectiveKind::Leaf, name)? {
            Handler::Leaf(h) => h.process(&DirectiveArgs::default(), &ctx).ok(),
            Handler::Container(_) => None,
        }
    }

    #[test]
    fn test_lookup_missing() {
        let registry = DirectiveRegistry::new();
        assert!(registry.lookup(DirectiveKind::Leaf, "badge").is_none());
        assert!(registry.lookup(DirectiveKind::Container, "badge").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = DirectiveRegistry::new()
            .with_leaf(Fixed {
                name: "badge",
                output: "first",
            })
            .with_leaf(Fixed {
                name: "badge",
                output: "second",
            });

        assert_eq!(
            run_leaf(&registry, "badge"),
            Some(DirectiveOutput::text("second"))
        );
    }

    #[test]
    fn test_kinds_are_separate() {
        let registry = DirectiveRegistry::new().with_container(Fixed {
            name: "note",
            output: "",
        });

        assert!(registry.lookup(DirectiveKind::Leaf, "note").is_none());
        assert!(matches!(
            registry.lookup(DirectiveKind::Container, "note"),
            Some(Handler::Container(_))
        ));
        assert_eq!(registry.names(DirectiveKind::Container), vec!["note"]);
    }
}
