//! At-rest encryption for stored credential values.
//!
//! XChaCha20-Poly1305 under a server-held master key. Every call draws a
//! fresh 24-byte nonce, so encrypting the same plaintext twice yields
//! different ciphertexts. The packed output is `base64(nonce || ciphertext
//! || tag)`, making decryption self-contained given only the packed string
//! and the static key.

use crate::error::{CryptoError, CryptoResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

/// XChaCha20 nonce length in bytes.
pub const NONCE_SIZE: usize = 24;
/// Poly1305 tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Server-held symmetric master key. Zeroized on drop.
#[derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop)]
pub struct MasterKey(Zeroizing<[u8; 32]>);

impl MasterKey {
    /// Generates a fresh random key.
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(key.as_mut());
        Self(key)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Loads the key from its base64 storage form (e.g. an environment
    /// variable). Length is validated here, at the boundary.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let raw = BASE64.decode(encoded)?;
        let bytes: [u8; 32] = raw.try_into().map_err(|v: Vec<u8>| {
            CryptoError::InvalidKeyLength {
                expected: 32,
                actual: v.len(),
            }
        })?;
        Ok(Self(Zeroizing::new(bytes)))
    }

    fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Encrypts a credential value for storage. Randomized: two calls on the
/// same plaintext produce different packed strings.
pub fn encrypt(key: &MasterKey, plaintext: &str) -> CryptoResult<String> {
    let cipher_key = chacha20poly1305::Key::from(*key.as_bytes());
    let cipher = XChaCha20Poly1305::new(&cipher_key);

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from(nonce_bytes);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::Encryption("AEAD encryption failed".to_string()))?;

    let mut packed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    packed.extend_from_slice(&nonce_bytes);
    packed.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(packed))
}

/// Decrypts a packed credential value.
///
/// Any malformation (bad base64, truncation, flipped bytes, wrong key)
/// fails with [`CryptoError::InvalidCiphertext`]; wrong plaintext is never
/// returned.
pub fn decrypt(key: &MasterKey, packed: &str) -> CryptoResult<Zeroizing<String>> {
    let raw = BASE64
        .decode(packed)
        .map_err(|_| CryptoError::InvalidCiphertext)?;
    if raw.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidCiphertext);
    }
    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);

    let cipher_key = chacha20poly1305::Key::from(*key.as_bytes());
    let cipher = XChaCha20Poly1305::new(&cipher_key);

    let plaintext = cipher
        .decrypt(XNonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CryptoError::InvalidCiphertext)?;

    match String::from_utf8(plaintext) {
        Ok(s) => Ok(Zeroizing::new(s)),
        Err(e) => {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            Err(CryptoError::InvalidCiphertext)
        }
    }
}
