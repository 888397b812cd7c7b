//! LEB128 length-framed lists and maps
//!
//! Layout:
//! - list: `len(item) item` repeated, then a single `0x00`
//! - map: `len(key) key len(value) value` repeated, then a single `0x00`
//!
//! Readers stop once fewer than 2 bytes remain, so the terminator and a
//! trailing zero-length item never collide.

use crate::error::CodecError;

use super::leb128;

fn write_framed(out: &mut Vec<u8>, bytes: &[u8]) {
    leb128::write_unsigned(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn read_framed(bytes: &[u8], pos: &mut usize) -> Result<Vec<u8>, CodecError> {
    let len = leb128::read_length(bytes, pos)?;
    let remaining = bytes.len() - *pos;
    if len > remaining {
        return Err(CodecError::TruncatedStream {
            needed: len,
            remaining,
        });
    }
    let item = bytes[*pos..*pos + len].to_vec();
    *pos += len;
    Ok(item)
}

/// Serialize a list of byte strings
pub fn serialize_list<T: AsRef<[u8]>>(items: &[T]) -> Vec<u8> {
    let capacity = items.iter().map(|i| i.as_ref().len() + 2).sum::<usize>() + 1;
    let mut out = Vec::with_capacity(capacity);
    for item in items {
        write_framed(&mut out, item.as_ref());
    }
    out.push(0x00);
    out
}

/// Deserialize a list produced by [`serialize_list`]
///
/// # Errors
///
/// `TruncatedStream` if a declared length exceeds the remaining bytes.
pub fn deserialize_list(bytes: &[u8]) -> Result<Vec<Vec<u8>>, CodecError> {
    let mut items = Vec::new();
    let mut pos = 0;
    while bytes.len() - pos >= 2 {
        items.push(read_framed(bytes, &mut pos)?);
    }
    Ok(items)
}

/// Serialize `(key, value)` pairs, preserving order and empty values
pub fn serialize_map<K: AsRef<[u8]>, V: AsRef<[u8]>>(pairs: &[(K, V)]) -> Vec<u8> {
    let capacity = pairs
        .iter()
        .map(|(k, v)| k.as_ref().len() + v.as_ref().len() + 4)
        .sum::<usize>()
        + 1;
    let mut out = Vec::with_capacity(capacity);
    for (key, value) in pairs {
        write_framed(&mut out, key.as_ref());
        write_framed(&mut out, value.as_ref());
    }
    out.push(0x00);
    out
}

/// Deserialize pairs produced by [`serialize_map`]
///
/// A present key with an empty value is kept: it is the "not found" marker
/// some backends return.
///
/// # Errors
///
/// `TruncatedStream` if a key has no value or a length runs past the end.
pub fn deserialize_map(bytes: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, CodecError> {
    let mut pairs = Vec::new();
    let mut pos = 0;
    while bytes.len() - pos >= 2 {
        let key = read_framed(bytes, &mut pos)?;
        let value = read_framed(bytes, &mut pos)?;
        pairs.push((key, value));
    }
    Ok(pairs)
}
