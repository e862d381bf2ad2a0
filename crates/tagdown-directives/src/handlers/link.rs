//! `url` and `urlHash` links.

use std::sync::Arc;

use crate::{
    DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput, LeafDirective, LinkResolve,
};

/// Link to a page, sidebar keyword or external URL.
///
/// ```text
/// {% url 'Read more' and %}
/// {% url "`cy.get()`" get#Syntax %}
/// {% url https://example.cypress.io %}
/// ::url[Read more]{href=api.commands.and}
/// ```
pub struct UrlDirective {
    resolver: Arc<dyn LinkResolve>,
}

impl UrlDirective {
    #[must_use]
    pub fn new(resolver: Arc<dyn LinkResolve>) -> Self {
        Self { resolver }
    }
}

impl LeafDirective for UrlDirective {
    fn name(&self) -> &'static str {
        "url"
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let (text, target) = link_parts(args, "href")?;
        let href = self
            .resolver
            .resolve(target, ctx.source_path)
            .map_err(DirectiveError::Link)?;
        Ok(DirectiveOutput::Text(format!("[{text}]({href})")))
    }
}

/// Link to an anchor on the current page.
///
/// ```text
/// {% urlHash 'options' Arguments %}
/// ::urlHash[options]{hash=Arguments}
/// ```
pub struct UrlHashDirective;

impl LeafDirective for UrlHashDirective {
    fn name(&self) -> &'static str {
        "urlHash"
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        _ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let (text, anchor) = link_parts(args, "hash")?;
        let anchor = anchor.trim_start_matches('#');
        Ok(DirectiveOutput::Text(format!("[{text}](#{anchor})")))
    }
}

/// Link text and target from `[text]{key=target}` or `'text' target`.
///
/// A single positional argument is both the text and the target.
fn link_parts<'a>(
    args: &'a DirectiveArgs,
    key: &'static str,
) -> Result<(&'a str, &'a str), DirectiveError> {
    if let Some(target) = args.get(key) {
        let text = args.content().or_else(|| args.arg(0)).unwrap_or(target);
        return Ok((text, target));
    }
    if args.content().is_some() {
        return Err(DirectiveError::MissingAttribute(key));
    }
    match (args.arg(0), args.arg(1)) {
        (Some(text), Some(target)) => Ok((text, target)),
        (Some(target), None) => Ok((target, target)),
        _ => Err(DirectiveError::MissingArgument("link target")),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;

    use super::*;
    use crate::BoxError;

    struct Table;

    impl LinkResolve for Table {
        fn resolve(&self, href: &str, source: Option<&Path>) -> Result<String, BoxError> {
            match href {
                "and" => Ok("/api/commands/and.html".to_owned()),
                "get#Syntax" => Ok("/api/commands/get.html#Syntax".to_owned()),
                _ if href.starts_with("https://") => Ok(href.to_owned()),
                _ => Err(format!(
                    "{}: could not find '{href}' in the sidebar",
                    source.map(|p| p.display().to_string()).unwrap_or_default()
                )
                .into()),
            }
        }
    }

    fn run(directive: &dyn LeafDirective, args: &DirectiveArgs) -> Result<String, DirectiveError> {
        let read = |_: &Path| -> io::Result<String> { Ok(String::new()) };
        let ctx = DirectiveContext::new(directive.name(), Path::new("docs"), &read)
            .with_source_path(Path::new("docs/api/commands/should.md"));
        match directive.process(args, &ctx)? {
            DirectiveOutput::Text(text) => Ok(text),
            other => panic!("unexpected output {other:?}"),
        }
    }

    fn url() -> UrlDirective {
        UrlDirective::new(Arc::new(Table))
    }

    #[test]
    fn test_hexo_url() {
        let args = DirectiveArgs::parse_hexo("'.and()' and");
        assert_eq!(run(&url(), &args).unwrap(), "[.and()](/api/commands/and.html)");
    }

    #[test]
    fn test_hexo_url_backtick_text() {
        let args = DirectiveArgs::parse_hexo("\"`cy.get()`\" get#Syntax");
        assert_eq!(
            run(&url(), &args).unwrap(),
            "[`cy.get()`](/api/commands/get.html#Syntax)"
        );
    }

    #[test]
    fn test_single_argument_is_text_and_target() {
        let args = DirectiveArgs::parse_hexo("https://on.cypress.io");
        assert_eq!(
            run(&url(), &args).unwrap(),
            "[https://on.cypress.io](https://on.cypress.io)"
        );
    }

    #[test]
    fn test_remark_url() {
        let args = DirectiveArgs::parse("Read more", "href=and");
        assert_eq!(run(&url(), &args).unwrap(), "[Read more](/api/commands/and.html)");
    }

    #[test]
    fn test_remark_url_without_href() {
        let args = DirectiveArgs::parse("Read more", "");
        assert_eq!(
            run(&url(), &args).unwrap_err().to_string(),
            "missing `href` attribute"
        );
    }

    #[test]
    fn test_unresolved_names_source_and_href() {
        let args = DirectiveArgs::parse_hexo("'nope' does-not-exist");
        let message = run(&url(), &args).unwrap_err().to_string();
        assert!(message.contains("does-not-exist"));
        assert!(message.contains("docs/api/commands/should.md"));
    }

    #[test]
    fn test_url_hash() {
        let args = DirectiveArgs::parse_hexo("'options' Arguments");
        assert_eq!(run(&UrlHashDirective, &args).unwrap(), "[options](#Arguments)");

        let args = DirectiveArgs::parse("options", "hash=#Arguments");
        assert_eq!(run(&UrlHashDirective, &args).unwrap(), "[options](#Arguments)");
    }
}
