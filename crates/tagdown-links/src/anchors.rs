//! Fragment lookup in fetched HTML and local Markdown pages.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use tagdown_directives::slugify;

/// Whether `html` declares `fragment` through an `id` or `name` attribute,
/// or links to it with `href="#fragment"`.
pub(crate) fn html_has_anchor(html: &str, fragment: &str) -> bool {
    let escaped = regex::escape(fragment);
    let pattern = format!(
        r#"(?:\b(?:id|name)\s*=\s*["']?{escaped}(?:["'\s/>]|$))|(?:\bhref\s*=\s*["']#{escaped}["'])"#
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(html))
}

/// Whether a Markdown page has a heading whose slug (or explicit `{#id}`)
/// matches `fragment`, or an inline HTML anchor for it.
pub(crate) fn markdown_has_anchor(markdown: &str, fragment: &str) -> bool {
    let wanted = slugify(fragment);
    let mut heading: Option<String> = None;

    for event in Parser::new_ext(markdown, Options::ENABLE_HEADING_ATTRIBUTES) {
        match event {
            Event::Start(Tag::Heading { id, .. }) => {
                if id.is_some_and(|id| id.as_ref() == fragment) {
                    return true;
                }
                heading = Some(String::new());
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = heading.as_mut() {
                    heading.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if heading.take().is_some_and(|text| slugify(&text) == wanted) {
                    return true;
                }
            }
            _ => {}
        }
    }

    html_has_anchor(markdown, fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_id_and_name() {
        let html = r##"<h2 id="syntax">Syntax</h2><a name="usage"></a><a href="#arguments">"##;
        assert!(html_has_anchor(html, "syntax"));
        assert!(html_has_anchor(html, "usage"));
        assert!(html_has_anchor(html, "arguments"));
        assert!(!html_has_anchor(html, "synta"));
        assert!(!html_has_anchor(html, "options"));
    }

    #[test]
    fn test_html_fragment_is_literal() {
        assert!(html_has_anchor(r#"<div id="a.b"></div>"#, "a.b"));
        assert!(!html_has_anchor(r#"<div id="axb"></div>"#, "a.b"));
    }

    #[test]
    fn test_markdown_heading_slug() {
        let md = "# and\n\n## Syntax\n\n### Default `and` Assertions\n";
        assert!(markdown_has_anchor(md, "Syntax"));
        assert!(markdown_has_anchor(md, "syntax"));
        assert!(markdown_has_anchor(md, "default-and-assertions"));
        assert!(!markdown_has_anchor(md, "rules"));
    }

    #[test]
    fn test_markdown_explicit_id() {
        let md = "## Arguments {#args}\n\n<a id=\"legacy\"></a>\n";
        assert!(markdown_has_anchor(md, "args"));
        assert!(markdown_has_anchor(md, "legacy"));
    }
}
