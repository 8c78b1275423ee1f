//! Decoder for per-member annotation strings.
//!
//! An annotation is a comma-separated list of items. The leading item may be
//! a call that names the field and declares its arguments; every other item
//! is a flag, either boolean (`inline`) or valued (`alias=total`):
//!
//! ```text
//! orders(first: 10, after: $:String, status: $status:Status! = OPEN),alias=recent
//! ```
//!
//! Argument values starting with `$` are variable placeholders (optionally
//! named, typed and defaulted); anything else is a literal, optionally
//! followed by `:Type`.

use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;

/// A decoded annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    /// Name given by a leading call item (`name(...)`).
    pub name: Option<String>,
    pub flags: Vec<Flag>,
    pub arguments: IndexMap<String, ArgSpec>,
}

impl Annotation {
    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flag(name).is_some()
    }
}

/// A flag item: `inline` (boolean) or `alias=total` (valued).
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    pub name: String,
    pub value: Option<String>,
}

impl Flag {
    pub fn is_boolean(&self) -> bool {
        self.value.is_none()
    }
}

/// One argument as written in the annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgSpec {
    Literal {
        value: Value,
        declared_type: Option<String>,
    },
    Variable {
        name: Option<String>,
        declared_type: Option<String>,
        default: Option<Value>,
    },
}

/// Malformed annotation syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub message: String,
    /// Byte offset into the annotation where decoding stopped.
    pub offset: usize,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for DecodeError {}

/// Decode an annotation string. An empty string decodes to an empty annotation.
pub fn decode(tag: &str) -> Result<Annotation, DecodeError> {
    let mut cur = Cursor { src: tag, pos: 0 };
    let mut annotation = Annotation::default();

    cur.skip_ws();
    if cur.peek().is_none() {
        return Ok(annotation);
    }

    let mut leading = true;
    loop {
        cur.skip_ws();
        let start = cur.pos;
        let name = cur.ident()?;
        if cur.eat('(') {
            if !leading {
                return Err(DecodeError {
                    message: format!("arguments on `{}` must come first", name),
                    offset: start,
                });
            }
            annotation.name = Some(name);
            annotation.arguments = parse_arguments(&mut cur)?;
        } else if cur.eat('=') {
            let value = cur.ident()?;
            annotation.flags.push(Flag {
                name,
                value: Some(value),
            });
        } else {
            annotation.flags.push(Flag { name, value: None });
        }
        leading = false;

        cur.skip_ws();
        match cur.bump() {
            None => break,
            Some(',') => continue,
            Some(c) => return Err(cur.error_before(c, "expected `,`")),
        }
    }

    Ok(annotation)
}

fn parse_arguments(cur: &mut Cursor<'_>) -> Result<IndexMap<String, ArgSpec>, DecodeError> {
    let mut arguments = IndexMap::new();
    if cur.eat(')') {
        return Ok(arguments);
    }
    loop {
        cur.skip_ws();
        let start = cur.pos;
        let key = cur.ident()?;
        cur.expect(':')?;
        let spec = if cur.eat('$') {
            parse_variable(cur)?
        } else {
            let value = parse_value(cur)?;
            let declared_type = if cur.eat(':') {
                Some(parse_type(cur)?)
            } else {
                None
            };
            ArgSpec::Literal {
                value,
                declared_type,
            }
        };
        if arguments.contains_key(&key) {
            return Err(DecodeError {
                message: format!("duplicate argument `{}`", key),
                offset: start,
            });
        }
        arguments.insert(key, spec);

        if cur.eat(',') {
            continue;
        }
        cur.expect(')')?;
        return Ok(arguments);
    }
}

fn parse_variable(cur: &mut Cursor<'_>) -> Result<ArgSpec, DecodeError> {
    // The name must follow `$` directly; `$ :T` is an anonymous placeholder.
    let name = match cur.peek() {
        Some(c) if is_ident_start(c) => Some(cur.ident()?),
        _ => None,
    };
    let declared_type = if cur.eat(':') {
        Some(parse_type(cur)?)
    } else {
        None
    };
    let default = if cur.eat('=') {
        Some(parse_value(cur)?)
    } else {
        None
    };
    Ok(ArgSpec::Variable {
        name,
        declared_type,
        default,
    })
}

fn parse_type(cur: &mut Cursor<'_>) -> Result<String, DecodeError> {
    let mut ty = if cur.eat('[') {
        let inner = parse_type(cur)?;
        cur.expect(']')?;
        format!("[{}]", inner)
    } else {
        cur.ident()?
    };
    if cur.eat('!') {
        ty.push('!');
    }
    Ok(ty)
}

fn parse_value(cur: &mut Cursor<'_>) -> Result<Value, DecodeError> {
    cur.skip_ws();
    match cur.peek() {
        Some('"') => parse_string(cur).map(Value::String),
        Some('[') => {
            cur.bump();
            let mut items = Vec::new();
            if cur.eat(']') {
                return Ok(Value::List(items));
            }
            loop {
                items.push(parse_value(cur)?);
                if cur.eat(',') {
                    continue;
                }
                cur.expect(']')?;
                return Ok(Value::List(items));
            }
        }
        Some('{') => {
            cur.bump();
            let mut fields = IndexMap::new();
            if cur.eat('}') {
                return Ok(Value::Object(fields));
            }
            loop {
                let key = cur.ident()?;
                cur.expect(':')?;
                fields.insert(key, parse_value(cur)?);
                if cur.eat(',') {
                    continue;
                }
                cur.expect('}')?;
                return Ok(Value::Object(fields));
            }
        }
        Some(c) if c == '-' || c.is_ascii_digit() => parse_number(cur),
        Some(c) if is_ident_start(c) => {
            let word = cur.ident()?;
            Ok(match word.as_str() {
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                "null" => Value::Null,
                _ => Value::Enum(word),
            })
        }
        Some(c) => Err(cur.error_at_current(c, "expected a value")),
        None => Err(cur.error_end("expected a value")),
    }
}

fn parse_string(cur: &mut Cursor<'_>) -> Result<String, DecodeError> {
    let start = cur.pos;
    cur.bump();
    let mut out = String::new();
    loop {
        match cur.bump() {
            Some('"') => return Ok(out),
            Some('\\') => match cur.bump() {
                Some('n') => out.push('\n'),
                Some(c) => out.push(c),
                None => break,
            },
            Some(c) => out.push(c),
            None => break,
        }
    }
    Err(DecodeError {
        message: "unterminated string".to_string(),
        offset: start,
    })
}

fn parse_number(cur: &mut Cursor<'_>) -> Result<Value, DecodeError> {
    let start = cur.pos;
    let mut is_float = false;
    if cur.peek() == Some('-') {
        cur.bump();
    }
    while let Some(c) = cur.peek() {
        match c {
            '0'..='9' => {}
            '.' | 'e' | 'E' => is_float = true,
            '+' | '-' if is_float => {}
            _ => break,
        }
        cur.bump();
    }
    let text = &cur.src[start..cur.pos];
    let parsed = if is_float {
        text.parse::<f64>().ok().map(Value::Float)
    } else {
        text.parse::<i64>().ok().map(Value::Int)
    };
    parsed.ok_or_else(|| DecodeError {
        message: format!("invalid number `{}`", text),
        offset: start,
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Skip whitespace, then consume `c` if it is next.
    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), DecodeError> {
        if self.eat(c) {
            return Ok(());
        }
        let message = format!("expected `{}`", c);
        match self.peek() {
            Some(found) => Err(self.error_at_current(found, &message)),
            None => Err(self.error_end(&message)),
        }
    }

    fn ident(&mut self) -> Result<String, DecodeError> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => {}
            Some(c) => return Err(self.error_at_current(c, "expected an identifier")),
            None => return Err(self.error_end("expected an identifier")),
        }
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn error_at_current(&self, found: char, message: &str) -> DecodeError {
        DecodeError {
            message: format!("{}, found `{}`", message, found),
            offset: self.pos,
        }
    }

    /// Error for a character that was already consumed.
    fn error_before(&self, found: char, message: &str) -> DecodeError {
        DecodeError {
            message: format!("{}, found `{}`", message, found),
            offset: self.pos - found.len_utf8(),
        }
    }

    fn error_end(&self, message: &str) -> DecodeError {
        DecodeError {
            message: format!("{}, found end of annotation", message),
            offset: self.pos,
        }
    }
}
