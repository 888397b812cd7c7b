//! Decryption-specific error types

use thiserror::Error;

/// Pool-level failure, fatal to the enclosing `decrypt` call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("worker error: {0}")]
pub struct WorkerError(pub String);

impl WorkerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Failure to decrypt a single entry
///
/// Never escapes a DECRYPT batch: the entry is skipped instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptionError {
    /// Ciphertext does not follow the `len | header | block` layout
    #[error("malformed ciphertext: {0}")]
    Malformed(String),

    /// Asymmetric header decryption failed (wrong key, access denied)
    #[error("header decryption failed: {0}")]
    Header(String),

    /// Symmetric block decryption failed
    #[error("block decryption failed: {0}")]
    Block(String),

    /// User decryption key rejected at INIT
    #[error("invalid user key: {0}")]
    InvalidKey(String),

    #[error("invalid hex: {0}")]
    Hex(String),
}

impl From<hex::FromHexError> for DecryptionError {
    fn from(e: hex::FromHexError) -> Self {
        DecryptionError::Hex(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_error_display() {
        let err = WorkerError::new("pool terminated");
        assert_eq!(err.to_string(), "worker error: pool terminated");
        assert_eq!(err.message(), "pool terminated");
    }

    #[test]
    fn test_hex_error_conversion() {
        let err: DecryptionError = hex::decode("zz").unwrap_err().into();
        assert!(matches!(err, DecryptionError::Hex(_)));
    }
}
