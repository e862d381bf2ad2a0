//! Directive argument parsing.
//!
//! Two argument syntaxes reach handlers through the same [`DirectiveArgs`]:
//!
//! - remark: `::name[content]{#id .class key="value"}`
//! - Hexo: `{% name arg1 'quoted arg' "`code`" %}`

use std::collections::HashMap;

/// Parsed arguments from directive syntax.
///
/// # Example
///
/// ```
/// use tagdown_directives::DirectiveArgs;
///
/// let args = DirectiveArgs::parse("hello", r#"#my-id .foo .bar lang="en""#);
/// assert_eq!(args.content, "hello");
/// assert_eq!(args.id.as_deref(), Some("my-id"));
/// assert_eq!(args.classes, vec!["foo", "bar"]);
/// assert_eq!(args.get("lang"), Some("en"));
///
/// let args = DirectiveArgs::parse_hexo("'Read more' and#Syntax");
/// assert_eq!(args.arg(0), Some("Read more"));
/// assert_eq!(args.arg(1), Some("and#Syntax"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Positional arguments from a Hexo tag, quotes stripped.
    pub positional: Vec<String>,
    /// Content from brackets: `[content]` (empty string if not provided).
    pub content: String,
    /// ID from attributes: `{#id}`.
    pub id: Option<String>,
    /// Classes from attributes: `{.class1 .class2}`.
    pub classes: Vec<String>,
    /// Key-value attributes: `{key="value"}`.
    pub attrs: HashMap<String, String>,
}

impl DirectiveArgs {
    /// Parse remark content and attributes string into structured arguments.
    ///
    /// # Arguments
    ///
    /// * `content` - The content from brackets `[content]`
    /// * `attrs_str` - The attributes string from braces `{...}` (without braces)
    #[must_use]
    pub fn parse(content: &str, attrs_str: &str) -> Self {
        let mut args = Self {
            content: content.to_owned(),
            ..Default::default()
        };

        // Parse attributes: #id, .class, key="value", key='value', or key=value
        let mut remaining = attrs_str.trim();

        while !remaining.is_empty() {
            if let Some(rest) = remaining.strip_prefix('#') {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                    .unwrap_or(rest.len());
                args.id = Some(rest[..end].to_owned());
                remaining = &rest[end..];
            } else if let Some(rest) = remaining.strip_prefix('.') {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                    .unwrap_or(rest.len());
                args.classes.push(rest[..end].to_owned());
                remaining = &rest[end..];
            } else if let Some((key, value, rest)) = parse_key_value(remaining) {
                args.attrs.insert(key.to_owned(), value.to_owned());
                remaining = rest;
            } else {
                // Skip unrecognized character
                let skip = remaining.chars().next().map_or(1, char::len_utf8);
                remaining = &remaining[skip..];
            }
            remaining = remaining.trim_start();
        }

        args
    }

    /// Parse the argument string of a Hexo tag (everything after the name).
    ///
    /// Arguments are separated by whitespace. A quoted argument (`'..'`,
    /// `".."` or `` `..` ``) is a single token even when it contains spaces.
    /// Single and double quotes are stripped; backticks are kept so that the
    /// argument still renders as inline code.
    #[must_use]
    pub fn parse_hexo(args_str: &str) -> Self {
        Self {
            positional: split_hexo_args(args_str),
            ..Default::default()
        }
    }

    /// Positional argument at `index`.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Positional arguments from `index` on, joined with single spaces.
    ///
    /// Returns `None` when there are no arguments at or after `index`.
    #[must_use]
    pub fn rest(&self, index: usize) -> Option<String> {
        let rest = self.positional.get(index..)?;
        (!rest.is_empty()).then(|| rest.join(" "))
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Bracket content, or `None` when the directive had no `[...]`.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        (!self.content.is_empty()).then_some(self.content.as_str())
    }
}

/// Split Hexo tag arguments on whitespace, honoring quotes.
fn split_hexo_args(s: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = s.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if matches!(c, '\'' | '"' | '`') {
            chars.next();
            let inner_start = start + c.len_utf8();
            let close = s[inner_start..].find(c).map(|i| inner_start + i);
            if let Some(close) = close {
                let inner = &s[inner_start..close];
                if c == '`' {
                    args.push(format!("`{inner}`"));
                } else {
                    args.push(inner.to_owned());
                }
                while chars.peek().is_some_and(|&(i, _)| i <= close) {
                    chars.next();
                }
                continue;
            }
            // Unbalanced quote: fall through and treat it as a bare word
        }

        let end = s[start..]
            .find(char::is_whitespace)
            .map_or(s.len(), |i| start + i);
        args.push(s[start..end].to_owned());
        while chars.peek().is_some_and(|&(i, _)| i < end) {
            chars.next();
        }
    }

    args
}

/// Parse a key-value pair from the attributes string.
///
/// Supports: `key="value"`, `key='value'`, `key=value`
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let eq_pos = s.find('=')?;
    let key = s[..eq_pos].trim();

    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let after_eq = &s[eq_pos + 1..];

    for quote in ['"', '\''] {
        if let Some(stripped) = after_eq.strip_prefix(quote) {
            let end_quote = stripped.find(quote)?;
            return Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]));
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    Some((key, &after_eq[..end], &after_eq[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_args() {
        let args = DirectiveArgs::parse("", "");
        assert_eq!(args, DirectiveArgs::default());
        assert_eq!(args.content(), None);
    }

    #[test]
    fn test_id_and_classes() {
        let args = DirectiveArgs::parse("", "#my-id .foo .bar");
        assert_eq!(args.id, Some("my-id".to_owned()));
        assert_eq!(args.classes, vec!["foo", "bar"]);
    }

    #[test]
    fn test_compact_classes() {
        let args = DirectiveArgs::parse("", "#id.foo.bar");
        assert_eq!(args.id, Some("id".to_owned()));
        assert_eq!(args.classes, vec!["foo", "bar"]);
    }

    #[test]
    fn test_quoted_and_unquoted_values() {
        let args = DirectiveArgs::parse("", r#"type=warning title="Read this" alt='x y' limit=5"#);
        assert_eq!(args.get("type"), Some("warning"));
        assert_eq!(args.get("title"), Some("Read this"));
        assert_eq!(args.get("alt"), Some("x y"));
        assert_eq!(args.get("limit"), Some("5"));
    }

    #[test]
    fn test_href_value_with_fragment() {
        let args = DirectiveArgs::parse("and", "href=and#Syntax");
        assert_eq!(args.content(), Some("and"));
        assert_eq!(args.get("href"), Some("and#Syntax"));
    }

    #[test]
    fn test_empty_quoted_value() {
        let args = DirectiveArgs::parse("", r#"alt="""#);
        assert_eq!(args.get("alt"), Some(""));
    }

    #[test]
    fn test_hexo_bare_words() {
        let args = DirectiveArgs::parse_hexo("danger removed");
        assert_eq!(args.positional, vec!["danger", "removed"]);
    }

    #[test]
    fn test_hexo_quoted_words() {
        let args = DirectiveArgs::parse_hexo(r#"'Read the guide' "/guides/overview" plain"#);
        assert_eq!(args.positional, vec!["Read the guide", "/guides/overview", "plain"]);
    }

    #[test]
    fn test_hexo_backticks_are_kept() {
        let args = DirectiveArgs::parse_hexo("`cy.get()` get");
        assert_eq!(args.positional, vec!["`cy.get()`", "get"]);
    }

    #[test]
    fn test_hexo_backticks_inside_double_quotes() {
        let args = DirectiveArgs::parse_hexo(r#""`.should()`" should"#);
        assert_eq!(args.arg(0), Some("`.should()`"));
        assert_eq!(args.arg(1), Some("should"));
    }

    #[test]
    fn test_hexo_unbalanced_quote_is_a_word() {
        let args = DirectiveArgs::parse_hexo("don't stop");
        assert_eq!(args.positional, vec!["don't", "stop"]);

        let args = DirectiveArgs::parse_hexo("'open ended");
        assert_eq!(args.positional, vec!["'open", "ended"]);
    }

    #[test]
    fn test_hexo_rest() {
        let args = DirectiveArgs::parse_hexo("warning Before you start");
        assert_eq!(args.rest(1).as_deref(), Some("Before you start"));
        assert_eq!(args.rest(4), None);
        assert_eq!(args.rest(9), None);
    }
}
