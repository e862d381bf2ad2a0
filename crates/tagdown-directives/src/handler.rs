//! Directive handler traits.

use std::path::Path;

use crate::{BoxError, DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput};

/// Handler for leaf directives: `{% name args %}` or `::name[content]{attrs}`.
///
/// Handlers are shared by every document processed in parallel, so they
/// take `&self` and must be `Send + Sync`.
///
/// # Example
///
/// ```
/// use tagdown_directives::{
///     DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput, LeafDirective,
/// };
///
/// struct Kbd;
///
/// impl LeafDirective for Kbd {
///     fn name(&self) -> &str { "kbd" }
///
///     fn process(
///         &self,
///         args: &DirectiveArgs,
///         _ctx: &DirectiveContext,
///     ) -> Result<DirectiveOutput, DirectiveError> {
///         let key = args.arg(0).ok_or(DirectiveError::MissingArgument("key"))?;
///         Ok(DirectiveOutput::text(format!("<kbd>{key}</kbd>")))
///     }
/// }
/// ```
pub trait LeafDirective: Send + Sync {
    /// Directive name matched against the source syntax.
    fn name(&self) -> &str;

    /// Expand one occurrence of the directive.
    ///
    /// # Errors
    ///
    /// Returns an error when the arguments do not fit the directive; the
    /// directive is then removed from the output.
    fn process(
        &self,
        args: &DirectiveArgs,
        ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError>;
}

/// Handler for container directives: `{% name %}...{% endname %}` or
/// `:::name` ... `:::`.
///
/// `body` is the already-expanded content between the opening and closing
/// tags.
pub trait ContainerDirective: Send + Sync {
    /// Directive name matched against the source syntax.
    fn name(&self) -> &str;

    /// Expand one occurrence of the directive.
    ///
    /// # Errors
    ///
    /// Returns an error when the arguments or body do not fit the directive;
    /// the directive and its body are then removed from the output.
    fn process(
        &self,
        args: &DirectiveArgs,
        body: &str,
        ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError>;
}

/// Resolves link targets written in `url` directives.
///
/// Implementations turn a symbolic reference (`and`, `api.commands.and#Syntax`),
/// a site path or an external URL into the href written to the output.
pub trait LinkResolve: Send + Sync {
    /// Resolve `href` as referenced from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error when the target cannot be resolved or fails
    /// validation. The message should name the source file and the href.
    fn resolve(&self, href: &str, source: Option<&Path>) -> Result<String, BoxError>;
}
