//! Strict decoder for serialized literal fields.
//!
//! Trial data is exported as nested list/map literals, for example:
//!
//! ```text
//! [{'both': [3], 'robot1_back': [7], 'robot2_back': [1]}, ...]
//! [[1, 0, [7, 3, 1]], [2, 1, [1, 3, 7]], ...]
//! ```
//!
//! The grammar accepted here:
//!
//! ```text
//! value  := list | map | number | string | null
//! list   := '[' ( value ( ',' value )* ','? )? ']'   ( '(' ... ')' is read as a list )
//! map    := '{' ( string ':' value ( ',' string ':' value )* ','? )? '}'
//! number := '-'? digits ( '.' digits )? ( [eE] [+-]? digits )?
//! string := '\'' chars '\'' | '"' chars '"'
//! null   := 'null' | 'None'
//! ```
//!
//! Whitespace is allowed between tokens. Anything after the top-level value is
//! an error, and so is nesting deeper than [`MAX_DEPTH`]. Every error reports
//! the byte offset at which decoding stopped.

use std::{collections::BTreeMap, fmt};

/// Deepest nesting of lists and maps accepted by [`decode`].
pub const MAX_DEPTH: usize = 64;

/// A decoded literal value.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Str(String),
    Null,
    List(Vec<Literal>),
    Map(BTreeMap<String, Literal>),
}

impl Literal {
    /// Short name of the value's kind, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Str(_) => "string",
            Literal::Null => "null",
            Literal::List(_) => "list",
            Literal::Map(_) => "map",
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Literal>> {
        match self {
            Literal::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Literal::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::Float(value) => write!(f, "{value:?}"),
            Literal::Str(value) => write!(f, "{value:?}"),
            Literal::Null => write!(f, "null"),
            Literal::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Literal::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{kind} at byte {offset}")]
pub struct DecodeError {
    pub offset: usize,
    pub kind: DecodeErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum DecodeErrorKind {
    #[display("unexpected end of input")]
    UnexpectedEnd,
    #[display("unexpected character {_0:?}")]
    UnexpectedChar(char),
    #[display("invalid number {_0:?}")]
    InvalidNumber(String),
    #[display("invalid escape sequence \\{_0}")]
    InvalidEscape(char),
    #[display("unterminated string")]
    UnterminatedString,
    #[display("map keys must be strings")]
    NonStringKey,
    #[display("trailing input after value")]
    TrailingInput,
    #[display("nesting deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Decodes a complete literal from `input`.
///
/// # Examples
///
/// ```
/// use choicerank_analysis::literal::{Literal, decode};
///
/// let value = decode("[1, [2, 3], {'a': None}]").unwrap();
/// let items = value.as_list().unwrap();
/// assert_eq!(items[0], Literal::Integer(1));
/// assert!(items[2].as_map().unwrap()["a"].is_null());
///
/// let err = decode("[1, 2").unwrap_err();
/// assert_eq!(err.offset, 5);
/// ```
pub fn decode(input: &str) -> Result<Literal, DecodeError> {
    let mut decoder = Decoder {
        input,
        pos: 0,
        depth: 0,
    };
    let value = decoder.value()?;
    decoder.skip_whitespace();
    if decoder.pos < input.len() {
        return Err(decoder.error(DecodeErrorKind::TrailingInput));
    }
    Ok(value)
}

struct Decoder<'a> {
    input: &'a str,
    pos: usize,
    /// Lists and maps currently open.
    depth: usize,
}

impl Decoder<'_> {
    fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError {
            offset: self.pos,
            kind,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect_char(&mut self) -> Result<char, DecodeError> {
        self.skip_whitespace();
        self.peek()
            .ok_or_else(|| self.error(DecodeErrorKind::UnexpectedEnd))
    }

    fn value(&mut self) -> Result<Literal, DecodeError> {
        match self.expect_char()? {
            open @ ('[' | '(' | '{') => {
                if self.depth >= MAX_DEPTH {
                    return Err(self.error(DecodeErrorKind::TooDeep { limit: MAX_DEPTH }));
                }
                self.depth += 1;
                let value = match open {
                    '[' => self.list(']'),
                    '(' => self.list(')'),
                    _ => self.map(),
                };
                self.depth -= 1;
                value
            }
            '\'' | '"' => self.string().map(Literal::Str),
            '-' | '0'..='9' => self.number(),
            ch if ch.is_ascii_alphabetic() => self.keyword(),
            ch => Err(self.error(DecodeErrorKind::UnexpectedChar(ch))),
        }
    }

    fn list(&mut self, close: char) -> Result<Literal, DecodeError> {
        self.bump();
        let mut items = vec![];
        loop {
            if self.expect_char()? == close {
                self.bump();
                return Ok(Literal::List(items));
            }
            items.push(self.value()?);
            match self.expect_char()? {
                ',' => {
                    self.bump();
                }
                ch if ch == close => {}
                ch => return Err(self.error(DecodeErrorKind::UnexpectedChar(ch))),
            }
        }
    }

    fn map(&mut self) -> Result<Literal, DecodeError> {
        self.bump();
        let mut map = BTreeMap::new();
        loop {
            let ch = self.expect_char()?;
            if ch == '}' {
                self.bump();
                return Ok(Literal::Map(map));
            }
            if ch != '\'' && ch != '"' {
                return Err(self.error(DecodeErrorKind::NonStringKey));
            }
            let key = self.string()?;
            match self.expect_char()? {
                ':' => {
                    self.bump();
                }
                ch => return Err(self.error(DecodeErrorKind::UnexpectedChar(ch))),
            }
            let value = self.value()?;
            map.insert(key, value);
            match self.expect_char()? {
                ',' => {
                    self.bump();
                }
                '}' => {}
                ch => return Err(self.error(DecodeErrorKind::UnexpectedChar(ch))),
            }
        }
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(self.error(DecodeErrorKind::UnexpectedEnd));
        };
        let mut out = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(DecodeError {
                    offset: start,
                    kind: DecodeErrorKind::UnterminatedString,
                });
            };
            match ch {
                '\\' => {
                    let escaped = match self.bump() {
                        Some('\\') => '\\',
                        Some('\'') => '\'',
                        Some('"') => '"',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some(other) => {
                            self.pos -= other.len_utf8();
                            return Err(self.error(DecodeErrorKind::InvalidEscape(other)));
                        }
                        None => {
                            return Err(DecodeError {
                                offset: start,
                                kind: DecodeErrorKind::UnterminatedString,
                            });
                        }
                    };
                    out.push(escaped);
                }
                ch if ch == quote => return Ok(out),
                ch => out.push(ch),
            }
        }
    }

    fn number(&mut self) -> Result<Literal, DecodeError> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let mut end = start;
        let digits = |from: usize| {
            let mut i = from;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            i
        };

        if bytes.get(end) == Some(&b'-') {
            end += 1;
        }
        let int_end = digits(end);
        let mut valid = int_end > end;
        let mut is_float = false;
        end = int_end;
        if valid && bytes.get(end) == Some(&b'.') {
            is_float = true;
            let frac_end = digits(end + 1);
            valid = frac_end > end + 1;
            end = frac_end;
        }
        if valid && matches!(bytes.get(end), Some(b'e' | b'E')) {
            is_float = true;
            let mut exp_start = end + 1;
            if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
                exp_start += 1;
            }
            let exp_end = digits(exp_start);
            valid = exp_end > exp_start;
            end = exp_end;
        }

        let text = &self.input[start..end];
        if !valid {
            return Err(self.error(DecodeErrorKind::InvalidNumber(text.to_owned())));
        }
        let literal = if is_float {
            text.parse().map(Literal::Float).ok()
        } else {
            text.parse().map(Literal::Integer).ok()
        };
        let literal =
            literal.ok_or_else(|| self.error(DecodeErrorKind::InvalidNumber(text.to_owned())))?;
        self.pos = end;
        Ok(literal)
    }

    fn keyword(&mut self) -> Result<Literal, DecodeError> {
        let rest = &self.input[self.pos..];
        let len = rest
            .find(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
            .unwrap_or(rest.len());
        match &rest[..len] {
            "null" | "None" => {
                self.pos += len;
                Ok(Literal::Null)
            }
            _ => Err(self.error(DecodeErrorKind::UnexpectedChar(
                rest.chars().next().unwrap_or_default(),
            ))),
        }
    }
}
