//! Directive tokenizer.
//!
//! The whole document is lexed into a directive tree before any handler runs.
//! Precedence is expressed as grammar rules, applied in this order:
//!
//! 1. Fenced code blocks (```` ``` ```` / `~~~`) are opaque.
//! 2. Inline code spans are opaque; a tag starting inside backticks is text.
//! 3. Inside a Hexo tag, quoted arguments are single tokens (see
//!    [`DirectiveArgs::parse_hexo`]).
//! 4. `{% endX %}` pairs with the nearest open `{% X %}`. Opens left without
//!    a partner are leaves; an end tag without a partner is text.
//! 5. A `:::` line closes the nearest open remark container. Remark
//!    containers still open at the end of input are text.
//!
//! A Hexo end tag never pairs across an open remark container, and a `:::`
//! line turns any Hexo opens above the container into leaves, so the tree is
//! always properly nested.

use super::DirectiveArgs;
use crate::fence::{FenceTracker, code_span_end};

/// Which markup family a directive was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Syntax {
    /// `{% name args %}` / `{% endname %}`
    Hexo,
    /// `::name[..]{..}` / `:::name[..]{..}` ... `:::`
    Remark,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Node<'a> {
    Text(&'a str),
    Directive(DirectiveNode<'a>),
}

/// A directive occurrence with its raw source text.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct DirectiveNode<'a> {
    pub(crate) name: String,
    pub(crate) syntax: Syntax,
    pub(crate) args: DirectiveArgs,
    /// Opening tag exactly as written. For remark containers this includes
    /// the trailing newline of the opening line.
    pub(crate) open: &'a str,
    /// Closing tag exactly as written; `None` for leaves.
    pub(crate) close: Option<&'a str>,
    pub(crate) children: Vec<Node<'a>>,
    /// 1-indexed line of the opening tag.
    pub(crate) line: usize,
}

impl DirectiveNode<'_> {
    pub(crate) fn is_container(&self) -> bool {
        self.close.is_some()
    }
}

/// Structural problem found while building the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseWarning {
    pub(crate) name: String,
    pub(crate) line: usize,
    pub(crate) message: String,
}

#[derive(Debug, Default)]
pub(crate) struct ParsedDocument<'a> {
    pub(crate) nodes: Vec<Node<'a>>,
    pub(crate) warnings: Vec<ParseWarning>,
}

/// Parse a document into a directive tree.
pub(crate) fn parse(input: &str) -> ParsedDocument<'_> {
    build_tree(lex(input))
}

#[derive(Debug)]
enum TokenKind {
    Text,
    HexoOpen { name: String, args: DirectiveArgs },
    HexoEnd { name: String },
    RemarkLeaf { name: String, args: DirectiveArgs },
    RemarkOpen { name: String, args: DirectiveArgs },
    RemarkClose,
}

#[derive(Debug)]
struct Token<'a> {
    kind: TokenKind,
    raw: &'a str,
    line: usize,
}

fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut fence = FenceTracker::new();

    for (idx, line) in input.split_inclusive('\n').enumerate() {
        let line_num = idx + 1;
        let was_in_fence = fence.in_fence();
        if fence.update(line) || was_in_fence {
            tokens.push(Token {
                kind: TokenKind::Text,
                raw: line,
                line: line_num,
            });
            continue;
        }

        let content = line.trim_end_matches(['\n', '\r']);
        match parse_container_line(content) {
            Some(ContainerLine::Start { name, args }) => tokens.push(Token {
                kind: TokenKind::RemarkOpen { name, args },
                raw: line,
                line: line_num,
            }),
            Some(ContainerLine::End) => {
                tokens.push(Token {
                    kind: TokenKind::RemarkClose,
                    raw: content,
                    line: line_num,
                });
                let newline = &line[content.len()..];
                if !newline.is_empty() {
                    tokens.push(Token {
                        kind: TokenKind::Text,
                        raw: newline,
                        line: line_num,
                    });
                }
            }
            None => lex_inline(line, line_num, &mut tokens),
        }
    }

    tokens
}

/// Lex Hexo tags and remark leaf directives within a single line.
fn lex_inline<'a>(line: &'a str, line_num: usize, tokens: &mut Vec<Token<'a>>) {
    let bytes = line.as_bytes();
    let mut pos = 0;
    let mut text_start = 0;

    let flush = |tokens: &mut Vec<Token<'a>>, from: usize, to: usize| {
        if from < to {
            tokens.push(Token {
                kind: TokenKind::Text,
                raw: &line[from..to],
                line: line_num,
            });
        }
    };

    while pos < bytes.len() {
        match bytes[pos] {
            b'`' => {
                let run = bytes[pos..].iter().take_while(|&&b| b == b'`').count();
                pos = code_span_end(line, pos).unwrap_or(pos + run);
            }
            b'{' if bytes.get(pos + 1) == Some(&b'%') => {
                if let Some((kind, end)) = lex_hexo_tag(line, pos) {
                    flush(tokens, text_start, pos);
                    tokens.push(Token {
                        kind,
                        raw: &line[pos..end],
                        line: line_num,
                    });
                    pos = end;
                    text_start = end;
                } else {
                    pos += 2;
                }
            }
            b':' if starts_leaf_directive(bytes, pos) => {
                if let Some((name, args, end)) = lex_remark_leaf(line, pos + 2) {
                    flush(tokens, text_start, pos);
                    tokens.push(Token {
                        kind: TokenKind::RemarkLeaf { name, args },
                        raw: &line[pos..end],
                        line: line_num,
                    });
                    pos = end;
                    text_start = end;
                } else {
                    pos += 2;
                }
            }
            _ => pos += 1,
        }
    }

    flush(tokens, text_start, bytes.len());
}

/// `::` followed by a letter, not part of a longer colon run or a path like `std::fs`.
fn starts_leaf_directive(bytes: &[u8], pos: usize) -> bool {
    bytes.get(pos + 1) == Some(&b':')
        && bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic)
        && (pos == 0 || !(bytes[pos - 1] == b':' || bytes[pos - 1].is_ascii_alphanumeric()))
}

/// Lex a `{% ... %}` tag starting at `start`. Returns the token kind and the
/// byte offset just past `%}`.
fn lex_hexo_tag(line: &str, start: usize) -> Option<(TokenKind, usize)> {
    let inner = &line[start + 2..];
    let name_start = inner.len() - inner.trim_start().len();
    let name_len = inner[name_start..]
        .find(|c: char| !is_name_char(c))
        .unwrap_or(inner.len() - name_start);
    if name_len == 0 {
        return None;
    }
    let name = &inner[name_start..name_start + name_len];
    let after_name = name_start + name_len;

    let rest = &inner[after_name..];
    if !(rest.starts_with(char::is_whitespace) || rest.starts_with("%}")) {
        return None;
    }

    let close = find_tag_close(rest)?;
    let args_str = rest[..close].trim();
    let end = start + 2 + after_name + close + 2;

    let kind = match name.strip_prefix("end") {
        Some(target) if !target.is_empty() && args_str.is_empty() => TokenKind::HexoEnd {
            name: target.to_owned(),
        },
        _ => TokenKind::HexoOpen {
            name: name.to_owned(),
            args: DirectiveArgs::parse_hexo(args_str),
        },
    };
    Some((kind, end))
}

/// Offset of the `%}` that ends a tag, skipping over quoted arguments.
fn find_tag_close(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut pos = 0;
    let mut at_token_start = true;

    while pos < bytes.len() {
        let b = bytes[pos];
        if b == b'%' && bytes.get(pos + 1) == Some(&b'}') {
            return Some(pos);
        }
        if at_token_start
            && matches!(b, b'\'' | b'"' | b'`')
            && let Some(len) = s[pos + 1..].find(char::from(b))
        {
            pos += len + 2;
            at_token_start = false;
            continue;
        }
        at_token_start = b.is_ascii_whitespace();
        pos += 1;
    }
    None
}

fn lex_remark_leaf(line: &str, name_start: usize) -> Option<(String, DirectiveArgs, usize)> {
    let after_colons = &line[name_start..];
    let name_len = after_colons
        .find(|c: char| !is_name_char(c))
        .unwrap_or(after_colons.len());
    let name = &after_colons[..name_len];
    if name.is_empty() {
        return None;
    }

    let mut pos = name_start + name_len;
    let (content, consumed) = parse_brackets(&line[pos..]);
    pos += consumed;
    let (attrs, consumed) = parse_braces(&line[pos..]);
    pos += consumed;

    Some((name.to_owned(), DirectiveArgs::parse(&content, &attrs), pos))
}

enum ContainerLine {
    Start { name: String, args: DirectiveArgs },
    End,
}

/// Parse a whole line as a remark container opening or closing fence.
fn parse_container_line(line: &str) -> Option<ContainerLine> {
    let trimmed = line.trim();
    if !trimmed.starts_with(":::") {
        return None;
    }

    let colon_count = trimmed.chars().take_while(|&c| c == ':').count();
    let after_colons = trimmed[colon_count..].trim_start();

    if after_colons.is_empty() {
        return Some(ContainerLine::End);
    }

    let name_end = after_colons
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(after_colons.len());
    let name = &after_colons[..name_end];
    if !is_valid_directive_name(name) {
        return None;
    }

    let after_name = after_colons[name_end..].trim_start();
    let (content, consumed) = parse_brackets(after_name);
    let (attrs, _) = parse_braces(&after_name[consumed..]);

    Some(ContainerLine::Start {
        name: name.to_owned(),
        args: DirectiveArgs::parse(&content, &attrs),
    })
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Valid names start with a letter and contain only ASCII letters, digits,
/// hyphens and underscores.
fn is_valid_directive_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) && name.chars().all(is_name_char)
}

/// Parse content from brackets: `[content]`, handling nesting.
///
/// Returns (content, `bytes_consumed`).
fn parse_brackets(s: &str) -> (String, usize) {
    parse_delimited(s, '[', ']')
}

/// Parse attributes from braces: `{#id .class key="value"}`.
///
/// Returns (`attrs_str` without braces, `bytes_consumed`).
fn parse_braces(s: &str) -> (String, usize) {
    parse_delimited(s, '{', '}')
}

fn parse_delimited(s: &str, open: char, close: char) -> (String, usize) {
    if !s.starts_with(open) {
        return (String::new(), 0);
    }

    let mut depth = 0;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return (s[1..i].to_owned(), i + 1);
            }
        }
    }
    (String::new(), 0)
}

fn build_tree(tokens: Vec<Token<'_>>) -> ParsedDocument<'_> {
    let mut tree = TreeBuilder::default();

    for Token { kind, raw, line } in tokens {
        match kind {
            TokenKind::Text => tree.push(Node::Text(raw)),
            TokenKind::RemarkLeaf { name, args } => tree.push(Node::Directive(DirectiveNode {
                name,
                syntax: Syntax::Remark,
                args,
                open: raw,
                close: None,
                children: Vec::new(),
                line,
            })),
            TokenKind::HexoOpen { name, args } => tree.open(name, Syntax::Hexo, args, raw, line),
            TokenKind::RemarkOpen { name, args } => tree.open(name, Syntax::Remark, args, raw, line),
            TokenKind::HexoEnd { name } => {
                let partner = tree
                    .stack
                    .iter()
                    .rposition(|f| f.syntax == Syntax::Remark || f.name == name)
                    .filter(|&i| tree.stack[i].syntax == Syntax::Hexo);
                match partner {
                    Some(i) => tree.close(i, raw),
                    None => {
                        tree.warnings.push(ParseWarning {
                            line,
                            message: format!("unpaired {raw} has no opening tag"),
                            name,
                        });
                        tree.push(Node::Text(raw));
                    }
                }
            }
            TokenKind::RemarkClose => {
                match tree.stack.iter().rposition(|f| f.syntax == Syntax::Remark) {
                    Some(i) => tree.close(i, raw),
                    None => {
                        tree.warnings.push(ParseWarning {
                            name: String::new(),
                            line,
                            message: "stray ::: with no opening directive".to_owned(),
                        });
                        tree.push(Node::Text(raw));
                    }
                }
            }
        }
    }

    tree.finish()
}

#[derive(Default)]
struct TreeBuilder<'a> {
    root: Vec<Node<'a>>,
    stack: Vec<DirectiveNode<'a>>,
    warnings: Vec<ParseWarning>,
}

impl<'a> TreeBuilder<'a> {
    fn push(&mut self, node: Node<'a>) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.root.push(node),
        }
    }

    fn open(&mut self, name: String, syntax: Syntax, args: DirectiveArgs, raw: &'a str, line: usize) {
        self.stack.push(DirectiveNode {
            name,
            syntax,
            args,
            open: raw,
            close: None,
            children: Vec::new(),
            line,
        });
    }

    /// Close the frame at `index`; frames above it become leaves.
    fn close(&mut self, index: usize, raw: &'a str) {
        while self.stack.len() > index + 1 {
            self.demote_top();
        }
        if let Some(mut frame) = self.stack.pop() {
            frame.close = Some(raw);
            self.push(Node::Directive(frame));
        }
    }

    /// Turn the innermost open frame into a leaf followed by its content.
    fn demote_top(&mut self) {
        let Some(mut frame) = self.stack.pop() else {
            return;
        };
        let children = std::mem::take(&mut frame.children);

        if frame.syntax == Syntax::Remark {
            self.warnings.push(ParseWarning {
                name: frame.name.clone(),
                line: frame.line,
                message: format!(
                    "unclosed container directive :::{} (missing closing :::)",
                    frame.name
                ),
            });
            self.push(Node::Text(frame.open));
        } else {
            self.push(Node::Directive(frame));
        }

        for child in children {
            self.push(child);
        }
    }

    fn finish(mut self) -> ParsedDocument<'a> {
        while !self.stack.is_empty() {
            self.demote_top();
        }
        ParsedDocument {
            nodes: self.root,
            warnings: self.warnings,
        }
    }
}
