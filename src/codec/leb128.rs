//! Unsigned LEB128 varints

use crate::error::CodecError;

/// Append `value` as unsigned LEB128
pub fn write_unsigned(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Read an unsigned LEB128 value starting at `*pos`, advancing `*pos`
///
/// # Errors
///
/// `TruncatedStream` if the varint runs off the end of `bytes`,
/// `LengthOverflow` if it does not fit in 64 bits.
pub fn read_unsigned(bytes: &[u8], pos: &mut usize) -> Result<u64, CodecError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(CodecError::TruncatedStream {
                needed: 1,
                remaining: 0,
            });
        };
        *pos += 1;

        let low = u64::from(byte & 0x7f);
        if shift >= 64 || (shift == 63 && low > 1) {
            return Err(CodecError::LengthOverflow);
        }
        result |= low << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

/// Read a LEB128 length and convert it to `usize`
pub fn read_length(bytes: &[u8], pos: &mut usize) -> Result<usize, CodecError> {
    let value = read_unsigned(bytes, pos)?;
    usize::try_from(value).map_err(|_| CodecError::LengthOverflow)
}
