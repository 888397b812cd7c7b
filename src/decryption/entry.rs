//! Encrypted entry layout
//!
//! `header length (u32 BE) | asymmetric header | symmetric block`

use std::fmt;

use super::error::DecryptionError;

/// Size of the big-endian header length prefix
pub const HEADER_LEN_PREFIX: usize = 4;

/// One ciphertext to decrypt, with the UID of the resource it protects
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedEntry {
    pub uid: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl EncryptedEntry {
    pub fn new(uid: impl Into<Vec<u8>>, ciphertext: impl Into<Vec<u8>>) -> Self {
        Self {
            uid: uid.into(),
            ciphertext: ciphertext.into(),
        }
    }

    /// Build from hex strings, as transports carry them
    pub fn from_hex(uid_hex: &str, ciphertext_hex: &str) -> Result<Self, DecryptionError> {
        Ok(Self {
            uid: hex::decode(uid_hex)?,
            ciphertext: hex::decode(ciphertext_hex)?,
        })
    }

    /// Split into `(header, block)`
    pub fn split(&self) -> Result<(&[u8], &[u8]), DecryptionError> {
        split_ciphertext(&self.ciphertext)
    }
}

impl fmt::Debug for EncryptedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedEntry")
            .field("uid", &hex::encode(&self.uid))
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

/// Split a hybrid ciphertext into `(header, block)`
pub fn split_ciphertext(ciphertext: &[u8]) -> Result<(&[u8], &[u8]), DecryptionError> {
    if ciphertext.len() < HEADER_LEN_PREFIX {
        return Err(DecryptionError::Malformed(format!(
            "{} bytes, shorter than the header length prefix",
            ciphertext.len()
        )));
    }
    let (prefix, rest) = ciphertext.split_at(HEADER_LEN_PREFIX);
    let mut len_bytes = [0u8; HEADER_LEN_PREFIX];
    len_bytes.copy_from_slice(prefix);
    let header_len = u32::from_be_bytes(len_bytes) as usize;

    if header_len > rest.len() {
        return Err(DecryptionError::Malformed(format!(
            "header length {} exceeds remaining {} bytes",
            header_len,
            rest.len()
        )));
    }
    Ok(rest.split_at(header_len))
}

/// Assemble a hybrid ciphertext from its parts
pub fn join_ciphertext(header: &[u8], block: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN_PREFIX + header.len() + block.len());
    out.extend_from_slice(&(header.len() as u32).to_be_bytes());
    out.extend_from_slice(header);
    out.extend_from_slice(block);
    out
}
