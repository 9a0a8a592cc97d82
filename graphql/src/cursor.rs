use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bytes::{Buf, BufMut};
use std::collections::HashSet;

use graph::prelude::chrono::DateTime;
use graph::prelude::num_bigint::BigInt;
use graph::prelude::*;

/// The version written as the first byte of every cursor. Cursors with a
/// different version are rejected.
const CURSOR_VERSION: u8 = 1;

/// The most key values a cursor may carry.
pub const MAX_KEY_VALUES: usize = 64;

const TAG_NULL: u8 = 0;
const TAG_BOOLEAN: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_INT8: u8 = 3;
const TAG_BIG_INT: u8 = 4;
const TAG_STRING: u8 = 5;
const TAG_BYTES: u8 = 6;
const TAG_TIMESTAMP: u8 = 7;

fn tag(value: &Value) -> u8 {
    match value {
        Value::Null => TAG_NULL,
        Value::Bool(_) => TAG_BOOLEAN,
        Value::Int(_) => TAG_INT,
        Value::Int8(_) => TAG_INT8,
        Value::BigInt(_) => TAG_BIG_INT,
        Value::String(_) => TAG_STRING,
        Value::Bytes(_) => TAG_BYTES,
        Value::Timestamp(_) => TAG_TIMESTAMP,
    }
}

/// The type a tag stands for; `Ok(None)` for `Null`.
fn tag_type(tag: u8) -> Result<Option<ValueType>, CursorError> {
    let value_type = match tag {
        TAG_NULL => return Ok(None),
        TAG_BOOLEAN => ValueType::Boolean,
        TAG_INT => ValueType::Int,
        TAG_INT8 => ValueType::Int8,
        TAG_BIG_INT => ValueType::BigInt,
        TAG_STRING => ValueType::String,
        TAG_BYTES => ValueType::Bytes,
        TAG_TIMESTAMP => ValueType::Timestamp,
        tag => {
            return Err(CursorError::DisallowedType(format!(
                "unknown type tag {}",
                tag
            )))
        }
    };
    Ok(Some(value_type))
}

fn malformed(reason: &str) -> CursorError {
    CursorError::MalformedCursor(reason.to_string())
}

/// Make sure `buf` has at least `n` more bytes; the `get_*` methods of
/// `Buf` panic otherwise.
fn ensure(buf: &[u8], n: usize) -> Result<(), CursorError> {
    if buf.remaining() < n {
        Err(malformed("unexpected end of cursor"))
    } else {
        Ok(())
    }
}

fn read_len_prefixed<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], CursorError> {
    ensure(buf, 4)?;
    let len = buf.get_u32() as usize;
    if len > buf.remaining() {
        return Err(malformed("length prefix exceeds the cursor"));
    }
    let slice: &'a [u8] = *buf;
    let (bytes, rest) = slice.split_at(len);
    *buf = rest;
    Ok(bytes)
}

fn put_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.put_u32(bytes.len() as u32);
    out.put_slice(bytes);
}

/// Turns cursors into opaque, URL-safe tokens and back.
///
/// Decoding only accepts key values whose type is in the allow-list the
/// codec was built with; the type is checked before the value itself is
/// read. `Null` is always allowed.
#[derive(Clone, Debug)]
pub struct CursorCodec {
    logger: Logger,
    allowed: HashSet<ValueType>,
    max_length: usize,
}

impl CursorCodec {
    pub fn new(logger: &Logger, allowed: HashSet<ValueType>, max_length: usize) -> Self {
        CursorCodec {
            logger: logger.new(o!("component" => "CursorCodec")),
            allowed,
            max_length,
        }
    }

    /// A codec that allows the cursor value types of `schema` and the token
    /// length configured with `VIEWGRAPH_CURSOR_MAX_LENGTH`.
    pub fn for_schema(logger: &Logger, schema: &SchemaDescriptor) -> Self {
        Self::new(
            logger,
            schema.cursor_value_types().clone(),
            ENV_VARS.cursor_max_length(),
        )
    }

    pub fn allows(&self, value_type: ValueType) -> bool {
        self.allowed.contains(&value_type)
    }

    /// Serialize `cursor`. The result is deterministic and always decodes to
    /// an equal cursor as long as the key values are allowed. Keysets with
    /// more than `MAX_KEY_VALUES` values are refused.
    pub fn encode(&self, cursor: &Cursor) -> Result<String, CursorError> {
        if cursor.keyset.len() > MAX_KEY_VALUES {
            return Err(CursorError::TooManyValues(
                cursor.keyset.len(),
                MAX_KEY_VALUES,
            ));
        }

        let mut out = Vec::with_capacity(11 + cursor.keyset.len() * 9);
        out.put_u8(CURSOR_VERSION);
        out.put_u32(cursor.offset);
        out.put_u32(cursor.page_size);
        out.put_u16(cursor.keyset.len() as u16);
        for value in cursor.keyset.iter() {
            out.put_u8(tag(value));
            match value {
                Value::Null => {}
                Value::Bool(b) => out.put_u8(*b as u8),
                Value::Int(i) => out.put_i32(*i),
                Value::Int8(i) => out.put_i64(*i),
                Value::BigInt(n) => put_len_prefixed(&mut out, &n.to_signed_bytes_be()),
                Value::String(s) => put_len_prefixed(&mut out, s.as_bytes()),
                Value::Bytes(bytes) => put_len_prefixed(&mut out, bytes),
                Value::Timestamp(ts) => out.put_i64(ts.timestamp_micros()),
            }
        }
        Ok(URL_SAFE_NO_PAD.encode(out))
    }

    /// Parse a token produced by `encode`. Rejections are logged without the
    /// token itself.
    pub fn decode(&self, token: &str) -> Result<Cursor, CursorError> {
        self.decode_inner(token).map_err(|e| {
            debug!(
                self.logger,
                "Rejected cursor";
                "code" => LogCode::InvalidCursor,
                "length" => token.len(),
                "error" => %e
            );
            e
        })
    }

    fn decode_inner(&self, token: &str) -> Result<Cursor, CursorError> {
        if token.len() > self.max_length {
            return Err(malformed("cursor is too long"));
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| malformed("cursor is not valid base64"))?;
        let mut buf = bytes.as_slice();

        ensure(buf, 11)?;
        let version = buf.get_u8();
        if version != CURSOR_VERSION {
            return Err(CursorError::MalformedCursor(format!(
                "unsupported cursor version {}",
                version
            )));
        }
        let offset = buf.get_u32();
        let page_size = buf.get_u32();
        let count = buf.get_u16() as usize;
        if count > MAX_KEY_VALUES {
            return Err(malformed("cursor has too many key values"));
        }

        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            ensure(buf, 1)?;
            let value_type = match tag_type(buf.get_u8())? {
                None => {
                    values.push(Value::Null);
                    continue;
                }
                Some(value_type) => value_type,
            };
            if !self.allows(value_type) {
                return Err(CursorError::DisallowedType(value_type.to_string()));
            }
            values.push(self.read_value(value_type, &mut buf)?);
        }
        if buf.has_remaining() {
            return Err(malformed("trailing bytes after the key values"));
        }

        Ok(Cursor::new(offset, page_size, Keyset::new(values)))
    }

    fn read_value(&self, value_type: ValueType, buf: &mut &[u8]) -> Result<Value, CursorError> {
        let value = match value_type {
            ValueType::Boolean => {
                ensure(buf, 1)?;
                match buf.get_u8() {
                    0 => Value::Bool(false),
                    1 => Value::Bool(true),
                    _ => return Err(malformed("invalid boolean")),
                }
            }
            ValueType::Int => {
                ensure(buf, 4)?;
                Value::Int(buf.get_i32())
            }
            ValueType::Int8 => {
                ensure(buf, 8)?;
                Value::Int8(buf.get_i64())
            }
            ValueType::BigInt => Value::BigInt(BigInt::from_signed_bytes_be(read_len_prefixed(
                buf,
            )?)),
            ValueType::String => {
                let bytes = read_len_prefixed(buf)?;
                let s = std::str::from_utf8(bytes).map_err(|_| malformed("invalid UTF-8"))?;
                Value::String(s.to_string())
            }
            ValueType::Bytes => Value::Bytes(read_len_prefixed(buf)?.into()),
            ValueType::Timestamp => {
                ensure(buf, 8)?;
                let micros = buf.get_i64();
                let ts = DateTime::from_timestamp_micros(micros)
                    .ok_or_else(|| malformed("timestamp out of range"))?;
                Value::Timestamp(ts)
            }
        };
        Ok(value)
    }
}
