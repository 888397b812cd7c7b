//! Mock decryption engine for testing
//!
//! A toy hybrid scheme with configurable failures. It offers no security:
//! the header carries the symmetric key in clear next to a fingerprint of
//! the user key it was sealed for.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::entry::{join_ciphertext, EncryptedEntry};
use super::error::DecryptionError;
use crate::traits::{ClearTextHeader, DecryptionEngine, EngineVariant, HybridDecryption};

const FINGERPRINT_LEN: usize = 8;
const SYMMETRIC_KEY_LEN: usize = 16;
const TAG_LEN: usize = 4;

fn digest(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u32).to_be_bytes());
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

fn key_fingerprint(user_key: &[u8], variant: EngineVariant) -> Vec<u8> {
    let variant = variant.to_string();
    digest(&[b"mock.key", variant.as_bytes(), user_key])[..FINGERPRINT_LEN].to_vec()
}

fn block_tag(symmetric_key: &[u8], uid: &[u8], plaintext: &[u8]) -> Vec<u8> {
    digest(&[b"mock.tag", symmetric_key, uid, plaintext])[..TAG_LEN].to_vec()
}

fn xor_with(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(d, k)| d ^ k)
        .collect()
}

/// Mock engine
///
/// Configurable failure modes for pool and worker tests.
#[derive(Default)]
pub struct MockDecryptionEngine {
    /// Whether INIT should fail
    pub fail_init: AtomicBool,

    /// Whether workers initialized from now on panic while decrypting
    pub panic_on_decrypt: AtomicBool,

    /// Count of successful INITs
    pub init_count: AtomicUsize,

    /// Count of destroyed worker states
    pub destroy_count: Arc<AtomicUsize>,
}

impl MockDecryptionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encrypt `plaintext` for holders of `user_key`
    pub fn seal(
        &self,
        user_key: &[u8],
        variant: EngineVariant,
        uid: &[u8],
        plaintext: &[u8],
    ) -> EncryptedEntry {
        let symmetric_key = digest(&[b"mock.sym", uid, plaintext])[..SYMMETRIC_KEY_LEN].to_vec();

        let mut header = key_fingerprint(user_key, variant);
        header.extend_from_slice(&symmetric_key);
        header.extend_from_slice(uid);

        let mut block = xor_with(plaintext, &symmetric_key);
        block.extend_from_slice(&block_tag(&symmetric_key, uid, plaintext));

        EncryptedEntry::new(uid, join_ciphertext(&header, &block))
    }
}

impl DecryptionEngine for MockDecryptionEngine {
    fn init(
        &self,
        user_key: &[u8],
        variant: EngineVariant,
    ) -> Result<Box<dyn HybridDecryption>, DecryptionError> {
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(DecryptionError::InvalidKey("mock init failure".into()));
        }
        if user_key.is_empty() {
            return Err(DecryptionError::InvalidKey("empty user key".into()));
        }
        self.init_count.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockHybridDecryption {
            fingerprint: key_fingerprint(user_key, variant),
            panic_on_decrypt: self.panic_on_decrypt.load(Ordering::SeqCst),
            destroy_count: Arc::clone(&self.destroy_count),
        }))
    }
}

struct MockHybridDecryption {
    fingerprint: Vec<u8>,
    panic_on_decrypt: bool,
    destroy_count: Arc<AtomicUsize>,
}

impl HybridDecryption for MockHybridDecryption {
    fn decrypt_header(&mut self, header: &[u8]) -> Result<ClearTextHeader, DecryptionError> {
        if self.panic_on_decrypt {
            panic!("mock decryption panic");
        }
        if header.len() < FINGERPRINT_LEN + SYMMETRIC_KEY_LEN {
            return Err(DecryptionError::Header("header too short".into()));
        }
        let (fingerprint, rest) = header.split_at(FINGERPRINT_LEN);
        if fingerprint != self.fingerprint.as_slice() {
            return Err(DecryptionError::Header("access denied".into()));
        }
        let (symmetric_key, uid) = rest.split_at(SYMMETRIC_KEY_LEN);
        Ok(ClearTextHeader {
            symmetric_key: symmetric_key.to_vec(),
            uid: uid.to_vec(),
        })
    }

    fn decrypt_block(
        &mut self,
        symmetric_key: &[u8],
        block: &[u8],
        uid: &[u8],
        _block_number: u64,
    ) -> Result<Vec<u8>, DecryptionError> {
        if block.len() < TAG_LEN {
            return Err(DecryptionError::Block("block too short".into()));
        }
        let (body, tag) = block.split_at(block.len() - TAG_LEN);
        let plaintext = xor_with(body, symmetric_key);
        if block_tag(symmetric_key, uid, &plaintext) != tag {
            return Err(DecryptionError::Block("authentication failed".into()));
        }
        Ok(plaintext)
    }

    fn destroy(&mut self) {
        self.destroy_count.fetch_add(1, Ordering::SeqCst);
    }
}
