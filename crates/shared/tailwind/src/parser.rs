//! Reader for the JavaScript module subset Tailwind configuration files are written in.
//!
//! Supported: `module.exports = {..}` or `export default {..}` with comments, string
//! literals (no template interpolation), numbers, booleans, `null`, arrays, objects with
//! identifier/quoted/numeric keys, trailing commas and `require("..")` calls optionally
//! applied to one object argument. A `require` call becomes `{"require": "..", "options": ..}`.

use crate::document::{OPTIONS_KEY, REQUIRE_KEY, TailwindConfig};
use crate::error::{TailwindError, TailwindErrorExt};
use serde_json::{Map, Number, Value};
use std::borrow::Cow;

impl TailwindConfig {
    /// Parses a `tailwind.config.js` module.
    ///
    /// # Errors
    /// [`TailwindError::Parse`] with the line and column of the offending token.
    pub fn from_js(source: &str) -> Result<Self, TailwindError> {
        let (exported, at) = Parser::new(source).module()?;
        serde_json::from_value(exported).map_err(|e| TailwindError::Parse {
            message: e.to_string().into(),
            line: at.line,
            column: at.column,
            context: Some("exported configuration".into()),
        })
    }

    /// Parses the JSON form of a document.
    ///
    /// # Errors
    /// [`TailwindError::Json`] for malformed JSON or a schema mismatch.
    pub fn from_json(source: &str) -> Result<Self, TailwindError> {
        serde_json::from_str(source).context("Parsing JSON configuration")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) line: usize,
    pub(crate) column: usize,
}

/// Deepest array/object/options nesting accepted before parsing gives up.
pub(crate) const MAX_DEPTH: usize = 128;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    depth: usize,
}

type ParseResult<T> = Result<T, TailwindError>;

impl Parser {
    fn new(source: &str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self { chars: source.chars().collect(), pos: 0, line: 1, column: 1, depth: 0 }
    }

    const fn position(&self) -> Position {
        Position { line: self.line, column: self.column }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error<T>(&self, message: impl Into<Cow<'static, str>>) -> ParseResult<T> {
        self.error_at(self.position(), message)
    }

    #[allow(clippy::unused_self)]
    fn error_at<T>(&self, at: Position, message: impl Into<Cow<'static, str>>) -> ParseResult<T> {
        Err(TailwindError::Parse {
            message: message.into(),
            line: at.line,
            column: at.column,
            context: None,
        })
    }

    fn unexpected<T>(&self, expected: &str) -> ParseResult<T> {
        match self.peek() {
            Some(found) => self.error(format!("expected {expected}, found {found:?}")),
            None => self.error(format!("expected {expected}, found end of input")),
        }
    }

    fn expect(&mut self, wanted: char) -> ParseResult<()> {
        if self.peek() == Some(wanted) {
            self.bump();
            Ok(())
        } else {
            self.unexpected(&format!("`{wanted}`"))
        }
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> ParseResult<()> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                },
                (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                },
                (Some('/'), Some('*')) => {
                    let start = self.position();
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            },
                            (Some(_), _) => {
                                self.bump();
                            },
                            (None, _) => return self.error_at(start, "unterminated block comment"),
                        }
                    }
                },
                _ => return Ok(()),
            }
        }
    }

    fn identifier(&mut self) -> Option<String> {
        if !self.peek().is_some_and(is_ident_start) {
            return None;
        }
        let mut ident = String::new();
        while let Some(c) = self.peek().filter(|&c| is_ident_part(c)) {
            ident.push(c);
            self.bump();
        }
        Some(ident)
    }

    fn at_word(&self, word: &str) -> bool {
        let len = word.chars().count();
        word.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
            && !self.peek_at(len).is_some_and(is_ident_part)
    }

    fn expect_word(&mut self, word: &str) -> ParseResult<()> {
        self.skip_trivia()?;
        if self.at_word(word) {
            for _ in word.chars() {
                self.bump();
            }
            Ok(())
        } else {
            self.unexpected(&format!("`{word}`"))
        }
    }

    /// `module.exports = <object>` or `export default <object>`, optional `;`, end of input.
    fn module(&mut self) -> ParseResult<(Value, Position)> {
        self.skip_trivia()?;
        self.skip_directive()?;

        if self.at_word("module") {
            self.expect_word("module")?;
            self.skip_trivia()?;
            self.expect('.')?;
            self.expect_word("exports")?;
            self.skip_trivia()?;
            self.expect('=')?;
        } else if self.at_word("export") {
            self.expect_word("export")?;
            self.expect_word("default")?;
        } else {
            return self.unexpected("`module.exports =` or `export default`");
        }

        self.skip_trivia()?;
        let at = self.position();
        let exported = self.value()?;
        if !exported.is_object() {
            return self.error_at(at, "the exported configuration must be an object literal");
        }

        self.skip_trivia()?;
        if self.peek() == Some(';') {
            self.bump();
        }
        self.skip_trivia()?;
        if self.peek().is_some() {
            return self.error("unexpected input after the exported configuration");
        }
        Ok((exported, at))
    }

    /// Skips a leading `"use strict";`.
    fn skip_directive(&mut self) -> ParseResult<()> {
        let rest: String = self.chars[self.pos..].iter().take(12).collect();
        if rest == "\"use strict\"" || rest == "'use strict'" {
            for _ in 0..12 {
                self.bump();
            }
            self.skip_trivia()?;
            if self.peek() == Some(';') {
                self.bump();
            }
            self.skip_trivia()?;
        }
        Ok(())
    }

    fn value(&mut self) -> ParseResult<Value> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.nested(Self::object),
            Some('[') => self.nested(Self::array),
            Some(quote @ ('"' | '\'' | '`')) => self.string(quote).map(Value::String),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if is_ident_start(c) => {
                let at = self.position();
                let Some(ident) = self.identifier() else {
                    return self.unexpected("a value");
                };
                match ident.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    "require" => self.require(),
                    other => self.error_at(
                        at,
                        format!("unsupported expression `{other}`; only literals and require() are allowed"),
                    ),
                }
            },
            _ => self.unexpected("a value"),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> ParseResult<Value>) -> ParseResult<Value> {
        if self.depth >= MAX_DEPTH {
            return self.error(format!("nesting deeper than {MAX_DEPTH} levels"));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn object(&mut self) -> ParseResult<Value> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }

            let key = self.property_key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);

            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                },
                Some('}') => {},
                _ => return self.unexpected("`,` or `}`"),
            }
        }
    }

    fn property_key(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.string(quote),
            Some(c) if c.is_ascii_digit() => match self.number()? {
                Value::Number(n) => Ok(n.to_string()),
                _ => self.unexpected("a property name"),
            },
            _ => match self.identifier() {
                Some(ident) => Ok(ident),
                None => self.unexpected("a property name"),
            },
        }
    }

    fn array(&mut self) -> ParseResult<Value> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }

            items.push(self.value()?);

            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                },
                Some(']') => {},
                _ => return self.unexpected("`,` or `]`"),
            }
        }
    }

    /// `require("<specifier>")` with an optional `({ .. })` options call.
    fn require(&mut self) -> ParseResult<Value> {
        self.skip_trivia()?;
        self.expect('(')?;
        self.skip_trivia()?;
        let specifier = match self.peek() {
            Some(quote @ ('"' | '\'' | '`')) => self.string(quote)?,
            _ => return self.unexpected("a module specifier string"),
        };
        self.skip_trivia()?;
        if self.peek() == Some(',') {
            self.bump();
            self.skip_trivia()?;
        }
        self.expect(')')?;

        let mut call = Map::new();
        call.insert(REQUIRE_KEY.to_owned(), Value::String(specifier));

        self.skip_trivia()?;
        if self.peek() == Some('(') {
            self.bump();
            self.skip_trivia()?;
            let options = if self.peek() == Some(')') {
                Value::Object(Map::new())
            } else {
                let at = self.position();
                let options = self.value()?;
                if !options.is_object() {
                    return self.error_at(at, "plugin options must be an object literal");
                }
                self.skip_trivia()?;
                if self.peek() == Some(',') {
                    self.bump();
                    self.skip_trivia()?;
                }
                options
            };
            self.expect(')')?;
            call.insert(OPTIONS_KEY.to_owned(), options);
        }

        Ok(Value::Object(call))
    }

    fn string(&mut self, quote: char) -> ParseResult<String> {
        let start = self.position();
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return self.error_at(start, "unterminated string literal");
            };
            match c {
                _ if c == quote => return Ok(out),
                '\\' => self.escape(&mut out)?,
                '\n' | '\r' if quote != '`' => {
                    return self.error_at(start, "unterminated string literal");
                },
                '$' if quote == '`' && self.peek() == Some('{') => {
                    return self.error("template literal interpolation is not supported");
                },
                _ => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> ParseResult<()> {
        let at = self.position();
        let Some(c) = self.bump() else {
            return self.error_at(at, "unterminated escape sequence");
        };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.hex_digits(2)?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            },
            'u' => {
                let ch = self.unicode_escape(at)?;
                out.push(ch);
            },
            // Line continuation.
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
            },
            '\n' | '\u{2028}' | '\u{2029}' => {},
            c if c.is_ascii_digit() => {
                return self.error_at(at, "octal escape sequences are not supported");
            },
            other => out.push(other),
        }
        Ok(())
    }

    /// After `\u`: `XXXX`, `{X..}`, or a surrogate pair `XXXX\uXXXX`.
    fn unicode_escape(&mut self, at: Position) -> ParseResult<char> {
        let code = if self.peek() == Some('{') {
            self.bump();
            let mut code = 0u32;
            let mut digits = 0;
            while let Some(d) = self.peek().and_then(|c| c.to_digit(16)) {
                self.bump();
                code = code.saturating_mul(16).saturating_add(d);
                digits += 1;
            }
            if digits == 0 {
                return self.unexpected("hex digits");
            }
            self.expect('}')?;
            code
        } else {
            self.hex_digits(4)?
        };

        if (0xD800..0xDC00).contains(&code) {
            if self.peek() == Some('\\') && self.peek_at(1) == Some('u') {
                self.bump();
                self.bump();
                let low = self.hex_digits(4)?;
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(ch) = char::from_u32(combined) {
                        return Ok(ch);
                    }
                }
            }
            return self.error_at(at, "unpaired surrogate in unicode escape");
        }

        match char::from_u32(code) {
            Some(ch) => Ok(ch),
            None => self.error_at(at, format!("invalid code point {code:#x}")),
        }
    }

    fn hex_digits(&mut self, count: usize) -> ParseResult<u32> {
        let mut code = 0;
        for _ in 0..count {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    self.bump();
                    code = code * 16 + d;
                },
                None => return self.unexpected("a hex digit"),
            }
        }
        Ok(code)
    }

    fn number(&mut self) -> ParseResult<Value> {
        let start = self.position();
        let mut negative = false;
        while let Some(sign @ ('-' | '+')) = self.peek() {
            self.bump();
            negative ^= sign == '-';
            self.skip_trivia()?;
        }

        let mut raw = String::new();
        while let Some(c) =
            self.peek().filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_'))
        {
            raw.push(c);
            self.bump();
            // Exponent sign.
            if matches!(c, 'e' | 'E')
                && !raw.starts_with("0x")
                && !raw.starts_with("0X")
                && let Some(sign @ ('-' | '+')) = self.peek()
            {
                raw.push(sign);
                self.bump();
            }
        }
        let raw = raw.replace('_', "");

        let radix = match raw.get(..2) {
            Some("0x" | "0X") => Some(16),
            Some("0o" | "0O") => Some(8),
            Some("0b" | "0B") => Some(2),
            _ => None,
        };

        let signed = if negative { format!("-{raw}") } else { raw.clone() };
        let number = if let Some(radix) = radix {
            i64::from_str_radix(&raw[2..], radix)
                .ok()
                .map(|n| Number::from(if negative { -n } else { n }))
        } else if let Ok(n) = signed.parse::<i64>() {
            Some(Number::from(n))
        } else if let (false, Ok(n)) = (negative, raw.parse::<u64>()) {
            Some(Number::from(n))
        } else {
            raw.parse::<f64>().ok().and_then(|n| Number::from_f64(if negative { -n } else { n }))
        };

        match number {
            Some(number) => Ok(Value::Number(number)),
            None => self.error_at(start, format!("invalid number literal `{raw}`")),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
