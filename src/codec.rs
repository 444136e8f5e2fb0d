//! Binary value codec
//!
//! Every value is written as a little-endian `i32` kind tag followed by its
//! payload. Lists carry a `u32` element count and recurse; strings carry a
//! `u32` byte length and UTF-8 bytes. Error and Return values are not
//! representable, and neither are non-finite floats. Lists nest at most
//! [`MAX_DEPTH`] levels deep.

use thiserror::Error;

use crate::value::{ObjectId, Value, ValueKind};

/// Deepest list nesting accepted by [`encode`] and [`decode`]
pub const MAX_DEPTH: usize = 512;

/// Codec failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("cannot encode a value of kind {0:?}")]
    Unsupported(ValueKind),

    #[error("unknown kind tag {0}")]
    UnknownTag(i32),

    #[error("input ended after {offset} bytes, {needed} more needed")]
    Truncated { offset: usize, needed: usize },

    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,

    #[error("invalid character code {0:#x}")]
    InvalidChar(u32),

    #[error("{0} elements do not fit a length prefix")]
    TooLong(usize),

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("lists nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,

    #[error("float {0} is not finite")]
    NonFinite(f64),
}

/// Serialize one value
pub fn encode(value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    write_value(&mut out, value, 0)?;
    Ok(out)
}

/// Deserialize exactly one value from `bytes`
pub fn decode(bytes: &[u8]) -> Result<Value, CodecError> {
    let mut reader = Reader {
        bytes,
        offset: 0,
        depth: 0,
    };
    let value = reader.read_value()?;
    let rest = bytes.len() - reader.offset;
    if rest > 0 {
        return Err(CodecError::TrailingBytes(rest));
    }
    Ok(value)
}

fn write_len(out: &mut Vec<u8>, len: usize) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| CodecError::TooLong(len))?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn write_value(out: &mut Vec<u8>, value: &Value, depth: usize) -> Result<(), CodecError> {
    // A failed encode discards `out`, so the tag may be written first.
    out.extend_from_slice(&value.kind().tag().to_le_bytes());

    match value {
        Value::Boolean(b) => out.push(u8::from(*b)),
        Value::Integer(n) => out.extend_from_slice(&n.to_le_bytes()),
        Value::Float(x) if !x.is_finite() => return Err(CodecError::NonFinite(*x)),
        Value::Float(x) => out.extend_from_slice(&x.to_le_bytes()),
        Value::Character(c) => out.extend_from_slice(&u32::from(*c).to_le_bytes()),
        Value::Object(id) => out.extend_from_slice(&id.to_le_bytes()),
        Value::String(s) => {
            write_len(out, s.len())?;
            out.extend_from_slice(s.as_bytes());
        }
        Value::List(_) if depth >= MAX_DEPTH => return Err(CodecError::TooDeep),
        Value::List(xs) => {
            write_len(out, xs.len())?;
            for x in xs {
                write_value(out, x, depth + 1)?;
            }
        }
        Value::Error(_) | Value::Return(_) => return Err(CodecError::Unsupported(value.kind())),
    }
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let slice = self.take_slice(N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(slice);
        Ok(buf)
    }

    fn take_slice(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let available = self.bytes.len() - self.offset;
        if available < len {
            return Err(CodecError::Truncated {
                offset: self.offset,
                needed: len - available,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_len(&mut self) -> Result<usize, CodecError> {
        Ok(u32::from_le_bytes(self.take()?) as usize)
    }

    fn read_value(&mut self) -> Result<Value, CodecError> {
        let tag = i32::from_le_bytes(self.take()?);
        let kind = ValueKind::from_tag(tag).ok_or(CodecError::UnknownTag(tag))?;

        let value = match kind {
            ValueKind::Boolean => Value::Boolean(self.take::<1>()?[0] != 0),
            ValueKind::Integer => Value::Integer(i64::from_le_bytes(self.take()?)),
            ValueKind::Float => {
                let x = f64::from_le_bytes(self.take()?);
                if !x.is_finite() {
                    return Err(CodecError::NonFinite(x));
                }
                Value::Float(x)
            }
            ValueKind::Character => {
                let code = u32::from_le_bytes(self.take()?);
                Value::Character(char::from_u32(code).ok_or(CodecError::InvalidChar(code))?)
            }
            ValueKind::Object => Value::Object(ObjectId::from_le_bytes(self.take()?)),
            ValueKind::String => {
                let len = self.read_len()?;
                let bytes = self.take_slice(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
                Value::String(s.to_string())
            }
            ValueKind::List => {
                if self.depth >= MAX_DEPTH {
                    return Err(CodecError::TooDeep);
                }
                let count = self.read_len()?;
                // Each element needs at least a tag; don't trust the count for allocation.
                let mut xs = Vec::with_capacity(count.min(self.bytes.len() / 4));
                self.depth += 1;
                for _ in 0..count {
                    xs.push(self.read_value()?);
                }
                self.depth -= 1;
                Value::List(xs)
            }
            ValueKind::None | ValueKind::Return | ValueKind::Error => {
                return Err(CodecError::Unsupported(kind));
            }
        };
        Ok(value)
    }
}
