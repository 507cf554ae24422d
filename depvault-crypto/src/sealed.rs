//! Sealed-box encryption for pushing secrets to a repository secret store.
//!
//! Implements the libsodium `crypto_box_seal` construction over X25519 +
//! XSalsa20-Poly1305:
//!
//! 1. a fresh ephemeral keypair is generated per call;
//! 2. the nonce is derived as `BLAKE2b-24(ephemeral_pk || recipient_pk)`;
//!    no random nonce is needed because the ephemeral key is used exactly
//!    once;
//! 3. the box ciphertext is produced under (ephemeral secret, recipient
//!    public, derived nonce);
//! 4. the output is `ephemeral_pk || ciphertext`.
//!
//! The remote store holds only its private key and re-derives the same nonce,
//! so any deviation in the derivation or concatenation order breaks
//! decryption silently on its side. Push-only: there is no decrypt path here.

use crate::error::{CryptoError, CryptoResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use rand::rngs::OsRng;

/// Curve25519 public key length in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// XSalsa20 nonce length in bytes.
const SEAL_NONCE_SIZE: usize = 24;

/// Derives the sealed-box nonce from the two public keys.
fn seal_nonce(
    ephemeral_pk: &PublicKey,
    recipient_pk: &PublicKey,
) -> CryptoResult<[u8; SEAL_NONCE_SIZE]> {
    let mut hasher = Blake2bVar::new(SEAL_NONCE_SIZE)
        .map_err(|e| CryptoError::Encryption(format!("nonce derivation failed: {e}")))?;
    hasher.update(ephemeral_pk.as_bytes());
    hasher.update(recipient_pk.as_bytes());

    let mut nonce = [0u8; SEAL_NONCE_SIZE];
    hasher
        .finalize_variable(&mut nonce)
        .map_err(|e| CryptoError::Encryption(format!("nonce derivation failed: {e}")))?;
    Ok(nonce)
}

/// Seals `plaintext` for the recipient's public key.
///
/// Non-deterministic: each call uses a single-use ephemeral keypair, so
/// sealing the same plaintext twice yields different outputs.
pub fn seal(plaintext: &[u8], recipient_pk: &[u8; PUBLIC_KEY_SIZE]) -> CryptoResult<Vec<u8>> {
    let recipient = PublicKey::from(*recipient_pk);
    let ephemeral = SecretKey::generate(&mut OsRng);
    let ephemeral_pk = ephemeral.public_key();

    let nonce = seal_nonce(&ephemeral_pk, &recipient)?;
    let ciphertext = SalsaBox::new(&recipient, &ephemeral)
        .encrypt(crypto_box::Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::Encryption("sealed-box encryption failed".to_string()))?;

    let mut out = Vec::with_capacity(PUBLIC_KEY_SIZE + ciphertext.len());
    out.extend_from_slice(ephemeral_pk.as_bytes());
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Seals a secret for a base64-encoded recipient key, returning base64:
/// the shapes the remote secrets API speaks.
pub fn seal_base64(plaintext: &str, recipient_pk_b64: &str) -> CryptoResult<String> {
    let raw = BASE64.decode(recipient_pk_b64)?;
    let key: [u8; PUBLIC_KEY_SIZE] =
        raw.try_into().map_err(|v: Vec<u8>| CryptoError::InvalidKeyLength {
            expected: PUBLIC_KEY_SIZE,
            actual: v.len(),
        })?;
    Ok(BASE64.encode(seal(plaintext.as_bytes(), &key)?))
}
