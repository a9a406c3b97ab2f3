//! RESP wire codec.
//!
//! Decodes a byte buffer into a recursive [`RespValue`] and encodes values back into bytes.
//! Decoding is incremental: when the buffer does not yet hold a complete frame the decoder
//! reports `Ok(None)` and the caller is expected to read more bytes and try again.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

/// Largest bulk payload accepted by the decoder (512 MiB).
pub const MAX_BULK_LENGTH: i64 = 512 * 1024 * 1024;

/// Deepest array nesting accepted by the decoder.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Most elements accepted in one aggregate. Maps and attributes count pairs.
pub const MAX_ARRAY_LENGTH: usize = 1024 * 1024;

/// Longest simple line (strings, errors, integers and length headers) accepted (64 KiB).
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Type tag byte that opens every RESP frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    SimpleString,
    SimpleError,
    Integer,
    Null,
    Boolean,
    Double,
    BigNumber,
    BulkString,
    BulkError,
    Array,
    VerbatimString,
    Map,
    Attribute,
    Set,
    Push,
}

impl Tag {
    pub fn from_byte(byte: u8) -> Option<Self> {
        let tag = match byte {
            b'+' => Tag::SimpleString,
            b'-' => Tag::SimpleError,
            b':' => Tag::Integer,
            b'_' => Tag::Null,
            b'#' => Tag::Boolean,
            b',' => Tag::Double,
            b'(' => Tag::BigNumber,
            b'$' => Tag::BulkString,
            b'!' => Tag::BulkError,
            b'*' => Tag::Array,
            b'=' => Tag::VerbatimString,
            b'%' => Tag::Map,
            b'|' => Tag::Attribute,
            b'~' => Tag::Set,
            b'>' => Tag::Push,
            _ => return None,
        };

        Some(tag)
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Tag::SimpleString => b'+',
            Tag::SimpleError => b'-',
            Tag::Integer => b':',
            Tag::Null => b'_',
            Tag::Boolean => b'#',
            Tag::Double => b',',
            Tag::BigNumber => b'(',
            Tag::BulkString => b'$',
            Tag::BulkError => b'!',
            Tag::Array => b'*',
            Tag::VerbatimString => b'=',
            Tag::Map => b'%',
            Tag::Attribute => b'|',
            Tag::Set => b'~',
            Tag::Push => b'>',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::SimpleString => "simple string",
            Tag::SimpleError => "simple error",
            Tag::Integer => "integer",
            Tag::Null => "null",
            Tag::Boolean => "boolean",
            Tag::Double => "double",
            Tag::BigNumber => "big number",
            Tag::BulkString => "bulk string",
            Tag::BulkError => "bulk error",
            Tag::Array => "array",
            Tag::VerbatimString => "verbatim string",
            Tag::Map => "map",
            Tag::Attribute => "attribute",
            Tag::Set => "set",
            Tag::Push => "push",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Framing errors produced while decoding a RESP frame.
///
/// Every variant names the tag being decoded so a diagnostic can point at the failing step.
/// Array element failures are wrapped in [`RespError::ArrayElement`], one level per nesting depth.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RespError {
    #[error("unknown type tag `{}`", char::from(*.0).escape_default())]
    UnknownTag(u8),
    #[error("invalid {tag} length `{raw}`")]
    InvalidLength { tag: Tag, raw: String },
    #[error("invalid integer `{0}`")]
    InvalidInteger(String),
    #[error("{tag} line contains a carriage return not followed by a line feed")]
    MissingLineFeed { tag: Tag },
    #[error("{tag} payload is not followed by CRLF")]
    MissingTrailer { tag: Tag },
    #[error("null frame carries a payload")]
    NullWithPayload,
    #[error("array nesting is too deep")]
    NestingTooDeep,
    #[error("{tag} has {count} elements, more than {}", MAX_ARRAY_LENGTH)]
    TooManyElements { tag: Tag, count: usize },
    #[error("{tag} line is longer than {} bytes", MAX_LINE_LENGTH)]
    LineTooLong { tag: Tag },
    #[error("array element {index}: {source}")]
    ArrayElement {
        index: usize,
        #[source]
        source: Box<RespError>,
    },
    #[error("stream ended in the middle of a frame")]
    UnexpectedEof,
}

impl RespError {
    /// Index path of the array element that failed, outermost first.
    pub fn element_path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = self;

        while let RespError::ArrayElement { index, source } = current {
            path.push(*index);
            current = source;
        }

        path
    }

    pub fn as_resp(&self) -> RespValue {
        RespValue::SimpleError(format!("ERR protocol error: {}", self))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    Null,
    SimpleString(String),
    SimpleError(String),
    Integer(i64),
    BulkString(Bytes),
    BulkError(Bytes),
    Array(Vec<RespValue>),
}

impl RespValue {
    pub fn bulk_string(value: impl Into<String>) -> Self {
        RespValue::BulkString(Bytes::from(value.into()))
    }

    pub fn simple_string(value: impl Into<String>) -> Self {
        RespValue::SimpleString(value.into())
    }

    pub fn array_of_bulk_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RespValue::Array(values.into_iter().map(RespValue::bulk_string).collect())
    }

    /// Attempts to decode one complete frame from the front of `input`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some((value, consumed)))` - A complete frame occupying the first `consumed` bytes
    /// * `Ok(None)` - The buffer holds only a prefix of a frame
    /// * `Err(RespError)` - The bytes can never form a valid frame
    ///
    /// Reserved RESP3 types are framed but not modelled: booleans, doubles and big numbers
    /// decode to their raw payload as a simple string, verbatim strings to a bulk string, and
    /// maps, attributes, sets and pushes to a flat array of their elements.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let (value, consumed) = RespValue::decode(b"*1\r\n$4\r\nPING\r\n")?.unwrap();
    /// assert_eq!(value, RespValue::Array(vec![RespValue::bulk_string("PING")]));
    /// assert_eq!(consumed, 14);
    /// ```
    pub fn decode(input: &[u8]) -> Result<Option<(RespValue, usize)>, RespError> {
        let mut cursor = Cursor { input, position: 0 };

        match cursor.decode_value(0)? {
            Some(value) => Ok(Some((value, cursor.position))),
            None => Ok(None),
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        self.encode_to(&mut buffer);
        buffer.freeze()
    }

    /// Null is always written in its RESP2 form, `$-1\r\n`.
    pub fn encode_to(&self, buffer: &mut BytesMut) {
        match self {
            RespValue::Null => buffer.put_slice(b"$-1\r\n"),
            RespValue::SimpleString(value) => encode_line(buffer, Tag::SimpleString, value),
            RespValue::SimpleError(value) => encode_line(buffer, Tag::SimpleError, value),
            RespValue::Integer(value) => {
                buffer.put_u8(Tag::Integer.as_byte());
                buffer.put_slice(value.to_string().as_bytes());
                buffer.put_slice(CRLF);
            }
            RespValue::BulkString(payload) => encode_bulk(buffer, Tag::BulkString, payload),
            RespValue::BulkError(payload) => encode_bulk(buffer, Tag::BulkError, payload),
            RespValue::Array(elements) => {
                buffer.put_u8(Tag::Array.as_byte());
                buffer.put_slice(elements.len().to_string().as_bytes());
                buffer.put_slice(CRLF);

                for element in elements {
                    element.encode_to(buffer);
                }
            }
        }
    }
}

// CR and LF would terminate the line early.
fn encode_line(buffer: &mut BytesMut, tag: Tag, value: &str) {
    buffer.put_u8(tag.as_byte());
    buffer.extend(value.bytes().map(|byte| match byte {
        b'\r' | b'\n' => b' ',
        other => other,
    }));
    buffer.put_slice(CRLF);
}

fn encode_bulk(buffer: &mut BytesMut, tag: Tag, payload: &[u8]) {
    buffer.put_u8(tag.as_byte());
    buffer.put_slice(payload.len().to_string().as_bytes());
    buffer.put_slice(CRLF);
    buffer.put_slice(payload);
    buffer.put_slice(CRLF);
}

struct Cursor<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn read_tag(&mut self) -> Result<Option<Tag>, RespError> {
        let Some(&byte) = self.input.get(self.position) else {
            return Ok(None);
        };
        let tag = Tag::from_byte(byte).ok_or(RespError::UnknownTag(byte))?;
        self.position += 1;

        Ok(Some(tag))
    }

    fn decode_value(&mut self, depth: usize) -> Result<Option<RespValue>, RespError> {
        let Some(tag) = self.read_tag()? else {
            return Ok(None);
        };

        match tag {
            Tag::SimpleString | Tag::Boolean | Tag::Double | Tag::BigNumber => {
                let Some(line) = self.read_line(tag)? else {
                    return Ok(None);
                };
                Ok(Some(RespValue::SimpleString(
                    String::from_utf8_lossy(line).into_owned(),
                )))
            }
            Tag::SimpleError => {
                let Some(line) = self.read_line(tag)? else {
                    return Ok(None);
                };
                Ok(Some(RespValue::SimpleError(
                    String::from_utf8_lossy(line).into_owned(),
                )))
            }
            Tag::Integer => Ok(self.read_integer()?.map(RespValue::Integer)),
            Tag::Null => Ok(self.read_null()?.map(|_| RespValue::Null)),
            Tag::BulkString | Tag::BulkError | Tag::VerbatimString => {
                let Some(payload) = self.read_bulk(tag)? else {
                    return Ok(None);
                };
                let Some(payload) = payload else {
                    return Ok(Some(RespValue::Null));
                };
                let payload = Bytes::copy_from_slice(payload);

                Ok(Some(match tag {
                    Tag::BulkError => RespValue::BulkError(payload),
                    _ => RespValue::BulkString(payload),
                }))
            }
            Tag::Array | Tag::Map | Tag::Attribute | Tag::Set | Tag::Push => {
                let Some(count) = self.read_aggregate_header(tag, depth)? else {
                    return Ok(None);
                };
                let Some(count) = count else {
                    return Ok(Some(RespValue::Null));
                };

                let mut elements = Vec::with_capacity(count.min(1024));

                for index in 0..count {
                    let element = self.decode_value(depth + 1).map_err(|source| {
                        RespError::ArrayElement {
                            index,
                            source: Box::new(source),
                        }
                    })?;
                    let Some(element) = element else {
                        return Ok(None);
                    };
                    elements.push(element);
                }

                Ok(Some(RespValue::Array(elements)))
            }
        }
    }

    /// Steps over one value without building it. Scalars are consumed whole; for an
    /// aggregate only the header is consumed and the number of elements it opens is
    /// returned.
    fn skip_value(&mut self, depth: usize) -> Result<Option<usize>, RespError> {
        let Some(tag) = self.read_tag()? else {
            return Ok(None);
        };

        match tag {
            Tag::SimpleString
            | Tag::SimpleError
            | Tag::Boolean
            | Tag::Double
            | Tag::BigNumber => Ok(self.read_line(tag)?.map(|_| 0)),
            Tag::Integer => Ok(self.read_integer()?.map(|_| 0)),
            Tag::Null => Ok(self.read_null()?.map(|_| 0)),
            Tag::BulkString | Tag::BulkError | Tag::VerbatimString => {
                Ok(self.read_bulk(tag)?.map(|_| 0))
            }
            Tag::Array | Tag::Map | Tag::Attribute | Tag::Set | Tag::Push => Ok(self
                .read_aggregate_header(tag, depth)?
                .map(|count| count.unwrap_or(0))),
        }
    }

    /// Reads a CRLF terminated line, returning its payload without the terminator.
    fn read_line(&mut self, tag: Tag) -> Result<Option<&'a [u8]>, RespError> {
        let rest = &self.input[self.position..];
        let window = &rest[..rest.len().min(MAX_LINE_LENGTH + 1)];
        let Some(carriage_return) = window.iter().position(|byte| *byte == b'\r') else {
            if rest.len() > MAX_LINE_LENGTH {
                return Err(RespError::LineTooLong { tag });
            }
            return Ok(None);
        };

        match rest.get(carriage_return + 1) {
            None => Ok(None),
            Some(b'\n') => {
                self.position += carriage_return + 2;
                Ok(Some(&rest[..carriage_return]))
            }
            Some(_) => Err(RespError::MissingLineFeed { tag }),
        }
    }

    fn read_integer(&mut self) -> Result<Option<i64>, RespError> {
        let Some(line) = self.read_line(Tag::Integer)? else {
            return Ok(None);
        };
        let raw = String::from_utf8_lossy(line);
        let value = raw
            .parse::<i64>()
            .map_err(|_| RespError::InvalidInteger(raw.to_string()))?;

        Ok(Some(value))
    }

    fn read_null(&mut self) -> Result<Option<()>, RespError> {
        let Some(line) = self.read_line(Tag::Null)? else {
            return Ok(None);
        };
        if !line.is_empty() {
            return Err(RespError::NullWithPayload);
        }

        Ok(Some(()))
    }

    /// Reads a length header. `Some(None)` is the `-1` null marker.
    fn read_length(&mut self, tag: Tag) -> Result<Option<Option<usize>>, RespError> {
        let Some(line) = self.read_line(tag)? else {
            return Ok(None);
        };
        let raw = String::from_utf8_lossy(line);
        let invalid = || RespError::InvalidLength {
            tag,
            raw: raw.to_string(),
        };
        let length = raw.parse::<i64>().map_err(|_| invalid())?;

        match length {
            -1 => Ok(Some(None)),
            length if length < 0 => Err(invalid()),
            length => usize::try_from(length)
                .map(|length| Some(Some(length)))
                .map_err(|_| invalid()),
        }
    }

    /// Reads a length-prefixed payload. `Some(None)` is a null bulk string.
    fn read_bulk(&mut self, tag: Tag) -> Result<Option<Option<&'a [u8]>>, RespError> {
        let Some(length) = self.read_length(tag)? else {
            return Ok(None);
        };
        let Some(length) = length else {
            return Ok(Some(None));
        };
        if length as i64 > MAX_BULK_LENGTH {
            return Err(RespError::InvalidLength {
                tag,
                raw: length.to_string(),
            });
        }

        Ok(self.read_payload(tag, length)?.map(Some))
    }

    /// Reads an aggregate header and returns how many values follow it. Maps and
    /// attributes are flattened, so their pair count is doubled.
    fn read_aggregate_header(
        &mut self,
        tag: Tag,
        depth: usize,
    ) -> Result<Option<Option<usize>>, RespError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(RespError::NestingTooDeep);
        }
        let Some(count) = self.read_length(tag)? else {
            return Ok(None);
        };
        let Some(count) = count else {
            return Ok(Some(None));
        };
        if count > MAX_ARRAY_LENGTH {
            return Err(RespError::TooManyElements { tag, count });
        }

        Ok(Some(Some(match tag {
            Tag::Map | Tag::Attribute => count * 2,
            _ => count,
        })))
    }

    fn read_payload(&mut self, tag: Tag, length: usize) -> Result<Option<&'a [u8]>, RespError> {
        let start = self.position;
        let end = start + length;

        if self.input.len() < end + CRLF.len() {
            return Ok(None);
        }
        if &self.input[end..end + CRLF.len()] != CRLF {
            return Err(RespError::MissingTrailer { tag });
        }

        self.position = end + CRLF.len();
        Ok(Some(&self.input[start..end]))
    }
}

/// Resumable completeness check for the first frame of a growing buffer.
///
/// The scanner walks headers and skips payloads without allocating. It remembers the last
/// complete value it reached, so each call only looks at bytes past that point, and the
/// value itself is decoded once the whole frame is there.
///
/// The buffer passed to successive calls must keep its front unchanged until a frame is
/// returned.
#[derive(Debug, Default)]
pub struct FrameScanner {
    position: usize,
    // Elements still expected by every open aggregate, outermost first.
    remaining: Vec<usize>,
}

impl FrameScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the length of the first frame in `input` once all of it has arrived.
    pub fn scan(&mut self, input: &[u8]) -> Result<Option<usize>, RespError> {
        loop {
            let mut cursor = Cursor {
                input,
                position: self.position,
            };
            let Some(opened) = cursor.skip_value(self.remaining.len())? else {
                return Ok(None);
            };
            self.position = cursor.position;

            if opened > 0 {
                self.remaining.push(opened);
                continue;
            }

            while let Some(remaining) = self.remaining.last_mut() {
                *remaining -= 1;
                if *remaining > 0 {
                    break;
                }
                self.remaining.pop();
            }

            if self.remaining.is_empty() {
                return Ok(Some(self.position));
            }
        }
    }

    /// Decodes the first frame of `input` as soon as it is complete, then resets so the
    /// scanner can be reused for the following frame.
    ///
    /// Errors carry the same detail as [`RespValue::decode`], element path included.
    pub fn decode(&mut self, input: &[u8]) -> Result<Option<(RespValue, usize)>, RespError> {
        let length = match self.scan(input) {
            Ok(Some(length)) => length,
            Ok(None) => return Ok(None),
            // Only a full decode knows which element failed.
            Err(e) => return Err(RespValue::decode(input).err().unwrap_or(e)),
        };

        *self = Self::default();
        RespValue::decode(&input[..length])
    }
}
