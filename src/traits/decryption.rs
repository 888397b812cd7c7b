//! Decryption engine traits
//!
//! One capability interface, implemented by interchangeable variant structs
//! picked at INIT time through [`EngineVariant`].

use std::fmt;

use crate::decryption::DecryptionError;

/// Hybrid scheme variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineVariant {
    /// Default attribute-based scheme
    #[default]
    CoverCrypt,
    /// Alternative scheme
    Gpsw,
}

impl EngineVariant {
    /// Variant selected by the pool's `is_alt_engine` flag
    pub fn from_alt_flag(is_alt_engine: bool) -> Self {
        if is_alt_engine {
            EngineVariant::Gpsw
        } else {
            EngineVariant::CoverCrypt
        }
    }
}

impl fmt::Display for EngineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineVariant::CoverCrypt => write!(f, "covercrypt"),
            EngineVariant::Gpsw => write!(f, "gpsw"),
        }
    }
}

/// Decrypted header of a hybrid ciphertext
#[derive(Clone, PartialEq, Eq)]
pub struct ClearTextHeader {
    /// Symmetric key protecting the block
    pub symmetric_key: Vec<u8>,
    /// Resource UID bound into the block encryption
    pub uid: Vec<u8>,
}

impl fmt::Debug for ClearTextHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClearTextHeader")
            .field("symmetric_key", &"[REDACTED]")
            .field("uid", &hex::encode(&self.uid))
            .finish()
    }
}

/// Per-worker decryption state derived from a user decryption key
///
/// Owned by exactly one worker between INIT and DESTROY.
pub trait HybridDecryption: Send {
    /// Asymmetric header decryption
    fn decrypt_header(&mut self, header: &[u8]) -> Result<ClearTextHeader, DecryptionError>;

    /// Symmetric block decryption
    fn decrypt_block(
        &mut self,
        symmetric_key: &[u8],
        block: &[u8],
        uid: &[u8],
        block_number: u64,
    ) -> Result<Vec<u8>, DecryptionError>;

    /// Release engine-side state (caches, key schedules)
    fn destroy(&mut self) {}
}

/// Builds per-worker decryption state
pub trait DecryptionEngine: Send + Sync + 'static {
    /// Load or derive decryption state from `user_key` for `variant`
    fn init(
        &self,
        user_key: &[u8],
        variant: EngineVariant,
    ) -> Result<Box<dyn HybridDecryption>, DecryptionError>;
}
