//! Streaming JSON tokenizer.
//!
//! [`JsonReader`] turns a byte stream into a flat sequence of [`Token`]s,
//! one per call, holding only a stack of open containers. Scalar text is
//! validated and unescaped with `serde_json`.

use std::borrow::Cow;
use std::io::{self, BufRead, BufReader, Read};

use crate::error::DecodeError;
use crate::limits::{MAX_NESTING_DEPTH, MAX_STRING_LEN};

/// One tokenizer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    FieldName(String),
    Scalar(Scalar),
}

/// A scalar JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    String(String),
    /// Number in its original JSON text.
    Number(String),
    Bool(bool),
    Null,
}

impl Scalar {
    /// Returns the value as text, or `None` for `null`.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Scalar::String(s) | Scalar::Number(s) => Some(Cow::Borrowed(s)),
            Scalar::Bool(true) => Some(Cow::Borrowed("true")),
            Scalar::Bool(false) => Some(Cow::Borrowed("false")),
            Scalar::Null => None,
        }
    }
}

/// Source of tokens consumed by the decoder.
pub trait TokenSource {
    /// Reads the next token, or `None` once the stream is exhausted.
    fn next_token(&mut self) -> Result<Option<Token>, DecodeError>;

    /// Name of the field the most recent token belongs to.
    ///
    /// For a field name this is the name itself; for a value it is the name
    /// of the field holding it; for a container start or end it is the
    /// field holding the container.
    fn current_name(&self) -> Option<&str>;

    /// If the most recent token opened a container, consumes everything up
    /// to and including the matching close. Otherwise does nothing.
    fn skip_children(&mut self) -> Result<(), DecodeError>;
}

/// What the tokenizer expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Any value (document root, after a colon, after a comma in an array).
    Value,
    /// First key of an object, or `}`.
    FirstKey,
    /// A key after a comma.
    Key,
    /// The colon after a key.
    Colon,
    /// `,` or `}` after an object member.
    ObjectNext,
    /// First value of an array, or `]`.
    FirstElement,
    /// `,` or `]` after an array element.
    ArrayNext,
    /// The root value is complete.
    Done,
}

#[derive(Debug, Clone)]
enum Frame {
    Object { name: Option<String> },
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    None,
    Open,
    Close,
    Other,
}

/// Pull tokenizer over any buffered byte source.
#[derive(Debug)]
pub struct JsonReader<R> {
    inner: R,
    pos: u64,
    expect: Expect,
    stack: Vec<Frame>,
    last: Last,
}

impl<R: Read> JsonReader<BufReader<R>> {
    /// Wraps an unbuffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self::new(BufReader::new(reader))
    }
}

impl<'a> JsonReader<&'a [u8]> {
    /// Reads from an in-memory document.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl<R: BufRead> JsonReader<R> {
    /// Creates a tokenizer over a buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pos: 0,
            expect: Expect::Value,
            stack: Vec::new(),
            last: Last::None,
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Returns the underlying reader. Unconsumed bytes stay in it.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn peek(&mut self) -> Result<Option<u8>, DecodeError> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    #[inline]
    fn bump(&mut self) {
        self.inner.consume(1);
        self.pos += 1;
    }

    fn next_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let byte = self.peek()?.ok_or(DecodeError::UnexpectedEof { context })?;
        self.bump();
        Ok(byte)
    }

    fn skip_whitespace(&mut self) -> Result<Option<u8>, DecodeError> {
        while let Some(byte) = self.peek()? {
            if !matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
                return Ok(Some(byte));
            }
            self.bump();
        }
        Ok(None)
    }

    fn unexpected(&self, found: u8, context: &'static str) -> DecodeError {
        DecodeError::UnexpectedByte {
            found,
            position: self.pos,
            context,
        }
    }

    /// Moves the parent container past the value that just completed.
    fn value_done(&mut self) {
        self.expect = match self.stack.last() {
            Some(Frame::Object { .. }) => Expect::ObjectNext,
            Some(Frame::Array) => Expect::ArrayNext,
            None => Expect::Done,
        };
    }

    fn open(&mut self, frame: Frame) -> Result<(), DecodeError> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }
        self.bump();
        self.expect = match frame {
            Frame::Object { .. } => Expect::FirstKey,
            Frame::Array => Expect::FirstElement,
        };
        self.stack.push(frame);
        Ok(())
    }

    fn close(&mut self) {
        self.bump();
        self.stack.pop();
        self.value_done();
    }

    fn read_value(&mut self, first: u8) -> Result<Token, DecodeError> {
        let token = match first {
            b'{' => {
                self.open(Frame::Object { name: None })?;
                return Ok(Token::StartObject);
            }
            b'[' => {
                self.open(Frame::Array)?;
                return Ok(Token::StartArray);
            }
            b'"' => Scalar::String(self.read_string("string value")?),
            b'-' | b'0'..=b'9' => Scalar::Number(self.read_number()?),
            b't' => {
                self.read_literal(b"true")?;
                Scalar::Bool(true)
            }
            b'f' => {
                self.read_literal(b"false")?;
                Scalar::Bool(false)
            }
            b'n' => {
                self.read_literal(b"null")?;
                Scalar::Null
            }
            other => return Err(self.unexpected(other, "value")),
        };
        self.value_done();
        Ok(Token::Scalar(token))
    }

    fn read_string(&mut self, context: &'static str) -> Result<String, DecodeError> {
        let start = self.pos;
        // Raw bytes including both quotes; serde_json handles escapes and UTF-8.
        let mut raw = Vec::with_capacity(32);
        raw.push(self.next_byte(context)?);
        loop {
            let byte = self.next_byte(context)?;
            raw.push(byte);
            match byte {
                b'"' => break,
                b'\\' => raw.push(self.next_byte(context)?),
                _ => {}
            }
            if raw.len() > MAX_STRING_LEN {
                return Err(DecodeError::LengthExceedsLimit {
                    field: context,
                    len: raw.len(),
                    max: MAX_STRING_LEN,
                });
            }
        }
        serde_json::from_slice::<String>(&raw).map_err(|e| DecodeError::InvalidString {
            position: start,
            reason: e.to_string(),
        })
    }

    fn read_number(&mut self) -> Result<String, DecodeError> {
        let start = self.pos;
        let mut raw = Vec::with_capacity(16);
        while let Some(byte) = self.peek()? {
            if !matches!(byte, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                break;
            }
            if raw.len() >= MAX_STRING_LEN {
                return Err(DecodeError::LengthExceedsLimit {
                    field: "number",
                    len: raw.len() + 1,
                    max: MAX_STRING_LEN,
                });
            }
            raw.push(byte);
            self.bump();
        }
        let text = String::from_utf8_lossy(&raw).into_owned();
        match serde_json::from_slice::<serde_json::Number>(&raw) {
            Ok(_) => Ok(text),
            Err(_) => Err(DecodeError::InvalidNumber {
                text,
                position: start,
            }),
        }
    }

    fn read_literal(&mut self, literal: &'static [u8]) -> Result<(), DecodeError> {
        for &expected in literal {
            let byte = self.next_byte("literal")?;
            if byte != expected {
                return Err(DecodeError::UnexpectedByte {
                    found: byte,
                    position: self.pos - 1,
                    context: "literal",
                });
            }
        }
        Ok(())
    }

    fn read_key(&mut self) -> Result<Token, DecodeError> {
        let key = self.read_string("field name")?;
        if let Some(Frame::Object { name }) = self.stack.last_mut() {
            *name = Some(key.clone());
        }
        self.expect = Expect::Colon;
        Ok(Token::FieldName(key))
    }

    fn advance(&mut self) -> Result<Option<Token>, DecodeError> {
        loop {
            if self.expect == Expect::Done {
                return Ok(None);
            }
            let Some(byte) = self.skip_whitespace()? else {
                // A blank document is an empty stream, not an error.
                if self.expect == Expect::Value && self.stack.is_empty() {
                    return Ok(None);
                }
                return Err(DecodeError::UnexpectedEof {
                    context: "document",
                });
            };
            match (self.expect, byte) {
                (Expect::Value, _) => return self.read_value(byte).map(Some),
                (Expect::FirstKey, b'}') | (Expect::ObjectNext, b'}') => {
                    self.close();
                    return Ok(Some(Token::EndObject));
                }
                (Expect::FirstKey, b'"') | (Expect::Key, b'"') => return self.read_key().map(Some),
                (Expect::Colon, b':') => {
                    self.bump();
                    self.expect = Expect::Value;
                }
                (Expect::ObjectNext, b',') => {
                    self.bump();
                    self.expect = Expect::Key;
                }
                (Expect::FirstElement, b']') | (Expect::ArrayNext, b']') => {
                    self.close();
                    return Ok(Some(Token::EndArray));
                }
                (Expect::FirstElement, _) => return self.read_value(byte).map(Some),
                (Expect::ArrayNext, b',') => {
                    self.bump();
                    self.expect = Expect::Value;
                }
                (Expect::FirstKey | Expect::Key, other) => {
                    return Err(self.unexpected(other, "field name"));
                }
                (Expect::Colon, other) => return Err(self.unexpected(other, "colon")),
                (Expect::ObjectNext, other) => return Err(self.unexpected(other, "object")),
                (Expect::ArrayNext, other) => return Err(self.unexpected(other, "array")),
                (Expect::Done, _) => return Ok(None),
            }
        }
    }
}

impl<R: BufRead> TokenSource for JsonReader<R> {
    fn next_token(&mut self) -> Result<Option<Token>, DecodeError> {
        let token = self.advance()?;
        self.last = match token {
            Some(Token::StartObject | Token::StartArray) => Last::Open,
            Some(Token::EndObject | Token::EndArray) => Last::Close,
            Some(_) => Last::Other,
            None => Last::None,
        };
        Ok(token)
    }

    fn current_name(&self) -> Option<&str> {
        // A freshly opened container is already on the stack; its name lives
        // one frame down.
        let frame = match self.last {
            Last::Open => self.stack.len().checked_sub(2).and_then(|i| self.stack.get(i)),
            _ => self.stack.last(),
        };
        match frame {
            Some(Frame::Object { name }) => name.as_deref(),
            _ => None,
        }
    }

    fn skip_children(&mut self) -> Result<(), DecodeError> {
        if self.last != Last::Open {
            return Ok(());
        }
        let mut open = 1usize;
        while open > 0 {
            match self.next_token()? {
                Some(Token::StartObject | Token::StartArray) => open += 1,
                Some(Token::EndObject | Token::EndArray) => open -= 1,
                Some(_) => {}
                None => {
                    return Err(DecodeError::UnexpectedEof {
                        context: "skipped value",
                    });
                }
            }
        }
        Ok(())
    }
}
