//! Restricted JavaScript object-literal reader.
//!
//! Reads the data subset of JS used in configuration samples and converts it
//! to JSON. Nothing is executed: functions, identifiers and any other
//! expressions are rejected.
//!
//! Accepted: objects (identifier, quoted and numeric keys), arrays, single,
//! double and template strings without `${}`, numbers (hex, exponent, `_`
//! separators), `true`, `false`, `null`, `undefined`, `//` and `/* */`
//! comments, trailing commas. `undefined` properties are omitted; `undefined`
//! array items become `null`.

use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("function values cannot be converted to JSON (offset {0})")]
    Function(usize),
    #[error("unsupported expression `{0}`")]
    Expression(String),
    #[error("template interpolation is not supported (offset {0})")]
    Interpolation(usize),
    #[error("invalid number `{0}`")]
    Number(String),
    #[error("invalid escape sequence at offset {0}")]
    Escape(usize),
    #[error("nesting deeper than 128 levels at offset {0}")]
    TooDeep(usize),
}

/// Maximum nesting of objects and arrays.
const MAX_DEPTH: usize = 128;

/// Parse a single literal value and convert it to JSON.
///
/// A trailing `;` is allowed.
///
/// # Errors
///
/// Returns an error for anything outside the accepted subset.
pub fn parse_literal(src: &str) -> Result<Value, LiteralError> {
    let mut reader = Reader {
        src,
        pos: 0,
        depth: 0,
    };
    let value = reader.value()?.unwrap_or(Value::Null);
    reader.skip_trivia()?;
    if reader.peek() == Some(';') {
        reader.bump();
        reader.skip_trivia()?;
    }
    match reader.peek() {
        None => Ok(value),
        Some(found) => Err(LiteralError::Unexpected {
            found,
            offset: reader.pos,
        }),
    }
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    /// Open objects and arrays.
    depth: usize,
}

impl Reader<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(found) => LiteralError::Unexpected {
                found,
                offset: self.pos,
            },
            None => LiteralError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, c: char) -> Result<(), LiteralError> {
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            let whitespace = self.rest().len() - self.rest().trim_start().len();
            self.pos += whitespace;

            let rest = self.rest();
            let skip = if rest.starts_with("//") {
                rest.find('\n').unwrap_or(rest.len())
            } else if let Some(comment) = rest.strip_prefix("/*") {
                comment.find("*/").ok_or(LiteralError::UnexpectedEnd)? + 4
            } else {
                return Ok(());
            };
            self.pos += skip;
        }
    }

    /// Read one value; `None` stands for `undefined`.
    fn value(&mut self) -> Result<Option<Value>, LiteralError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.nested(Self::object).map(Some),
            Some('[') => self.nested(Self::array).map(Some),
            Some(quote @ ('\'' | '"')) => self.string(quote).map(|s| Some(Value::String(s))),
            Some('`') => self.template().map(|s| Some(Value::String(s))),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                self.number().map(Some)
            }
            Some('(') => Err(self.parenthesized()),
            Some(c) if is_ident_start(c) => self.keyword(),
            _ => Err(self.unexpected()),
        }
    }

    fn nested(
        &mut self,
        read: fn(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth == MAX_DEPTH {
            return Err(LiteralError::TooDeep(self.pos));
        }
        self.depth += 1;
        let value = read(self);
        self.depth -= 1;
        value
    }

    fn keyword(&mut self) -> Result<Option<Value>, LiteralError> {
        let start = self.pos;
        let word = self.identifier();
        match word {
            "true" => return Ok(Some(Value::Bool(true))),
            "false" => return Ok(Some(Value::Bool(false))),
            "null" => return Ok(Some(Value::Null)),
            "undefined" => return Ok(None),
            "function" | "async" => return Err(LiteralError::Function(start)),
            _ => {}
        }
        let word = word.to_owned();
        self.skip_trivia()?;
        if self.rest().starts_with("=>") {
            return Err(LiteralError::Function(start));
        }
        Err(LiteralError::Expression(word))
    }

    /// `(` starts either an arrow function or a grouped expression.
    fn parenthesized(&mut self) -> LiteralError {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        if self.skip_trivia().is_ok() && self.rest().starts_with("=>") {
            return LiteralError::Function(start);
        }
        LiteralError::Expression(self.src[start..self.pos].trim().to_owned())
    }

    fn identifier(&mut self) -> &str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn object(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();

        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }

            let key_start = self.pos;
            let key = self.key()?;
            self.skip_trivia()?;

            match self.peek() {
                Some(':') => {
                    self.bump();
                }
                // `name() {}` and `get name() {}`
                Some('(') => return Err(LiteralError::Function(key_start)),
                Some(c) if is_ident_start(c) && matches!(key.as_str(), "get" | "set" | "async") => {
                    return Err(LiteralError::Function(key_start));
                }
                // `{ name }` shorthand refers to a variable
                Some(',' | '}') => return Err(LiteralError::Expression(key)),
                _ => return Err(self.unexpected()),
            }

            if let Some(value) = self.value()? {
                map.insert(key, value);
            }

            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => self.string(quote),
            Some(c) if is_ident_start(c) => Ok(self.identifier().to_owned()),
            Some(c) if c.is_ascii_digit() => match self.number()? {
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(self.unexpected()),
            },
            _ => Err(self.unexpected()),
        }
    }

    fn array(&mut self) -> Result<Value, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();

        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }

            items.push(self.value()?.unwrap_or(Value::Null));

            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(LiteralError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn template(&mut self) -> Result<String, LiteralError> {
        self.expect('`')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(LiteralError::UnexpectedEnd),
                Some('`') => return Ok(out),
                Some('$') if self.peek() == Some('{') => {
                    return Err(LiteralError::Interpolation(self.pos - 1));
                }
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    /// Decode the escape sequence after a backslash.
    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let start = self.pos - 1;
        let c = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // line continuation
            '\n' => {}
            'x' => {
                let code = self.hex_digits(2).ok_or(LiteralError::Escape(start))?;
                out.push(char::from_u32(code).ok_or(LiteralError::Escape(start))?);
            }
            'u' => {
                let code = if self.peek() == Some('{') {
                    self.bump();
                    let end = self.rest().find('}').ok_or(LiteralError::Escape(start))?;
                    let code = u32::from_str_radix(&self.rest()[..end], 16)
                        .map_err(|_| LiteralError::Escape(start))?;
                    self.pos += end + 1;
                    code
                } else {
                    self.hex_digits(4).ok_or(LiteralError::Escape(start))?
                };
                out.push(char::from_u32(code).ok_or(LiteralError::Escape(start))?);
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn hex_digits(&mut self, count: usize) -> Option<u32> {
        let digits = self.rest().get(..count)?;
        let code = u32::from_str_radix(digits, 16).ok()?;
        self.pos += count;
        Some(code)
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };

        let (radix, digits_start) = match (self.peek(), self.peek_second()) {
            (Some('0'), Some('x' | 'X')) => (16, self.pos + 2),
            (Some('0'), Some('o' | 'O')) => (8, self.pos + 2),
            (Some('0'), Some('b' | 'B')) => (2, self.pos + 2),
            _ => (10, self.pos),
        };
        self.pos = digits_start;

        while let Some(c) = self.peek() {
            let accepted = if radix == 10 {
                c.is_ascii_digit()
                    || c == '.'
                    || c == '_'
                    || matches!(c, 'e' | 'E')
                    || (matches!(c, '+' | '-')
                        && matches!(self.src[..self.pos].chars().last(), Some('e' | 'E')))
            } else {
                c.is_ascii_hexdigit() || c == '_'
            };
            if !accepted {
                break;
            }
            self.bump();
        }

        let literal = &self.src[start..self.pos];
        let digits: String = self.src[digits_start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let invalid = || LiteralError::Number(literal.to_owned());

        if digits.is_empty() {
            return Err(invalid());
        }

        if radix != 10 {
            let value = i64::from_str_radix(&digits, radix).map_err(|_| invalid())?;
            return Ok(Value::Number(Number::from(if negative { -value } else { value })));
        }

        let is_integer = !digits.contains(['.', 'e', 'E']);
        if is_integer && let Ok(value) = digits.parse::<i64>() {
            return Ok(Value::Number(Number::from(if negative { -value } else { value })));
        }

        let value: f64 = digits.parse().map_err(|_| invalid())?;
        Number::from_f64(if negative { -value } else { value })
            .map(Value::Number)
            .ok_or_else(invalid)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_config_object() {
        let src = r"{
  // Global settings
  defaultCommandTimeout: 10000,
  'retries': { runMode: 2, openMode: 0, },
  e2e: {
    baseUrl: 'http://localhost:1234',
    specPattern: [`cypress/e2e/**/*.cy.js`, 'src/**/*.cy.js'],
  },
  /* multi
     line */
  video: false,
  blockHosts: null,
}";
        assert_eq!(
            parse_literal(src).unwrap(),
            json!({
                "defaultCommandTimeout": 10000,
                "retries": { "runMode": 2, "openMode": 0 },
                "e2e": {
                    "baseUrl": "http://localhost:1234",
                    "specPattern": ["cypress/e2e/**/*.cy.js", "src/**/*.cy.js"]
                },
                "video": false,
                "blockHosts": null
            })
        );
    }

    #[test]
    fn test_key_order_preserved() {
        let value = parse_literal("{ zeta: 1, alpha: 2 }").unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn test_undefined() {
        assert_eq!(
            parse_literal("{ a: undefined, b: [undefined, 1] }").unwrap(),
            json!({ "b": [null, 1] })
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            parse_literal("[0xFF, 1_000, -2.5, 1e3, +7, .5]").unwrap(),
            json!([255, 1000, -2.5, 1000.0, 7, 0.5])
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            parse_literal(r#"["it\'s", "tab\there", 'A\x42\u{43}']"#).unwrap(),
            json!(["it's", "tab\there", "ABC"])
        );
    }

    #[test]
    fn test_rejects_functions() {
        for src in [
            "{ setupNodeEvents(on, config) {} }",
            "{ setupNodeEvents: function (on) {} }",
            "{ handler: (on, config) => {} }",
            "{ handler: on => on }",
            "{ async load() {} }",
            "{ get value() { return 1 } }",
        ] {
            assert!(
                matches!(parse_literal(src), Err(LiteralError::Function(_))),
                "accepted {src}"
            );
        }
    }

    #[test]
    fn test_rejects_expressions() {
        assert_eq!(
            parse_literal("{ baseUrl: process }"),
            Err(LiteralError::Expression("process".to_owned()))
        );
        assert_eq!(
            parse_literal("{ env }"),
            Err(LiteralError::Expression("env".to_owned()))
        );
        assert!(matches!(
            parse_literal("{ url: `${host}/api` }"),
            Err(LiteralError::Interpolation(_))
        ));
        assert!(matches!(
            parse_literal("{ a: 1 } + 2"),
            Err(LiteralError::Unexpected { found: '+', .. })
        ));
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(parse_literal("{ a: 'b"), Err(LiteralError::UnexpectedEnd));
        assert_eq!(parse_literal("{ a: 1"), Err(LiteralError::UnexpectedEnd));
        assert_eq!(parse_literal("{ /* open"), Err(LiteralError::UnexpectedEnd));
    }

    #[test]
    fn test_comments_between_tokens() {
        assert_eq!(
            parse_literal("// lead\n{ /* a */ a: /**/ 1, // tail\n } /* end */;").unwrap(),
            json!({"a": 1})
        );
    }

    #[test]
    fn test_nesting_limit() {
        let fits = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&fits).is_ok());

        let deep = "[".repeat(10_000);
        assert_eq!(
            parse_literal(&deep),
            Err(LiteralError::TooDeep(MAX_DEPTH))
        );

        let mixed = "{a:[".repeat(MAX_DEPTH);
        assert!(matches!(
            parse_literal(&mixed),
            Err(LiteralError::TooDeep(_))
        ));
    }
}
