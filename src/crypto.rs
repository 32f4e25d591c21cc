//! The cryptographic primitives both handler variants are built on. Nothing here is home-grown: the AEAD
//! is XChaCha20-Poly1305 and the public-key scheme is an X25519 sealed box (ephemeral Diffie-Hellman, then
//! HKDF-SHA256 to derive a one-time AEAD key).
//!
//! Wire layouts:
//!
//! - shared key: `nonce (24 bytes) || ciphertext || tag (16 bytes)`
//! - sealed box: `ephemeral public key (32 bytes) || nonce (24 bytes) || ciphertext || tag (16 bytes)`

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use hkdf::Hkdf;
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::EncryptionError;
use crate::keys::{DecryptionKey, EncryptionKey, KeyKind, KeyPair};

/// SHARED_KEY_LENGTH is 32 bytes
pub const SHARED_KEY_LENGTH: usize = 32;
/// PUBLIC_KEY_LENGTH is 32 bytes (an X25519 point)
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// PRIVATE_KEY_LENGTH is 32 bytes (an X25519 scalar)
pub const PRIVATE_KEY_LENGTH: usize = 32;
/// NONCE_LENGTH is 24 bytes (XChaCha20 extended nonce), random per message
pub const NONCE_LENGTH: usize = 24;
/// TAG_LENGTH is 16 bytes (Poly1305)
pub const TAG_LENGTH: usize = 16;
/// SEALED_BOX_INFO is the HKDF context that separates sealed-box keys from any other use of the DH output
const SEALED_BOX_INFO: &[u8] = b"keyswap sealed box";

/// generate_shared_key draws a fresh 256-bit secret from the OS RNG.
pub fn generate_shared_key() -> EncryptionKey {
    let mut bytes = Zeroizing::new([0u8; SHARED_KEY_LENGTH]);
    OsRng.fill_bytes(bytes.as_mut_slice());
    EncryptionKey::new(KeyKind::Shared, bytes.to_vec())
}

/// generate_key_pair draws a fresh X25519 secret and derives its public half from it.
pub fn generate_key_pair() -> KeyPair {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    let secret_bytes = Zeroizing::new(secret.to_bytes());
    KeyPair::new(
        EncryptionKey::new(KeyKind::Public, public.as_bytes().to_vec()),
        DecryptionKey::new(EncryptionKey::new(KeyKind::Private, secret_bytes.to_vec())),
    )
}

/// seal_shared encrypts under a shared key with a random nonce.
pub fn seal_shared(key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let key_bytes = key_array(key, KeyKind::Shared, SHARED_KEY_LENGTH)?;
    aead_seal(&key_bytes, plaintext)
}

/// open_shared decrypts a [`seal_shared`] ciphertext.
pub fn open_shared(key: &EncryptionKey, data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let key_bytes = key_array(key, KeyKind::Shared, SHARED_KEY_LENGTH)?;
    aead_open(&key_bytes, data)
}

/// seal_to_public encrypts toward the holder of the private half of `recipient`.
pub fn seal_to_public(recipient: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let recipient_public = PublicKey::from(*key_array(recipient, KeyKind::Public, PUBLIC_KEY_LENGTH)?);
    let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral_secret);
    let shared = ephemeral_secret.diffie_hellman(&recipient_public);
    // A low-order recipient point gives an all-zero shared secret
    if !shared.was_contributory() {
        return Err(EncryptionError::InvalidKeyMaterial(
            "public key is a low-order point".to_string(),
        ));
    }
    let sealing_key = derive_sealing_key(shared.as_bytes(), &ephemeral_public, &recipient_public)?;
    let sealed = aead_seal(&sealing_key, plaintext)?;
    let mut output = Vec::with_capacity(PUBLIC_KEY_LENGTH + sealed.len());
    output.extend_from_slice(ephemeral_public.as_bytes());
    output.extend_from_slice(&sealed);
    Ok(output)
}

/// open_with_private decrypts a [`seal_to_public`] ciphertext with the recipient's private key.
pub fn open_with_private(private: &EncryptionKey, data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let secret = StaticSecret::from(*key_array(private, KeyKind::Private, PRIVATE_KEY_LENGTH)?);
    if data.len() < PUBLIC_KEY_LENGTH + NONCE_LENGTH + TAG_LENGTH {
        return Err(EncryptionError::DecryptionError);
    }
    let (ephemeral_bytes, sealed) = data.split_at(PUBLIC_KEY_LENGTH);
    let ephemeral_bytes: [u8; PUBLIC_KEY_LENGTH] = ephemeral_bytes
        .try_into()
        .map_err(|_| EncryptionError::DecryptionError)?;
    let ephemeral_public = PublicKey::from(ephemeral_bytes);
    let shared = secret.diffie_hellman(&ephemeral_public);
    if !shared.was_contributory() {
        return Err(EncryptionError::DecryptionError);
    }
    let recipient_public = PublicKey::from(&secret);
    let sealing_key = derive_sealing_key(shared.as_bytes(), &ephemeral_public, &recipient_public)?;
    aead_open(&sealing_key, sealed)
}

/// check_encryption_key confirms a shared or public key can actually be encrypted with: right kind, right
/// length, and for public keys a point that yields a contributory Diffie-Hellman result.
pub fn check_encryption_key(key: &EncryptionKey) -> Result<(), EncryptionError> {
    match key.kind() {
        KeyKind::Shared => key_array(key, KeyKind::Shared, SHARED_KEY_LENGTH).map(|_| ()),
        KeyKind::Public => {
            let public = PublicKey::from(*key_array(key, KeyKind::Public, PUBLIC_KEY_LENGTH)?);
            let ephemeral = EphemeralSecret::random_from_rng(OsRng);
            if !ephemeral.diffie_hellman(&public).was_contributory() {
                return Err(EncryptionError::InvalidKeyMaterial(
                    "public key is a low-order point".to_string(),
                ));
            }
            Ok(())
        }
        KeyKind::Private => Err(EncryptionError::InvalidKeyMaterial(
            "a private key never encrypts".to_string(),
        )),
    }
}

/// derive_sealing_key runs HKDF over the DH output, salted with both public keys so the AEAD key is bound
/// to this exact (sender ephemeral, recipient) pair.
fn derive_sealing_key(
    shared: &[u8; 32],
    ephemeral_public: &PublicKey,
    recipient_public: &PublicKey,
) -> Result<Zeroizing<[u8; SHARED_KEY_LENGTH]>, EncryptionError> {
    let salt = [ephemeral_public.as_bytes().as_slice(), recipient_public.as_bytes().as_slice()].concat();
    let kdf = Hkdf::<Sha256>::new(Some(salt.as_slice()), shared);
    let mut okm = Zeroizing::new([0u8; SHARED_KEY_LENGTH]);
    kdf.expand(SEALED_BOX_INFO, okm.as_mut_slice())
        .map_err(|_| EncryptionError::EncryptionFailed)?;
    Ok(okm)
}

/// key_array checks a key's kind and length and copies it out into a fixed-size buffer.
fn key_array(
    key: &EncryptionKey,
    expected: KeyKind,
    length: usize,
) -> Result<Zeroizing<[u8; 32]>, EncryptionError> {
    if key.kind() != expected {
        return Err(EncryptionError::InvalidKeyMaterial(format!(
            "expected a {} key, got a {} key",
            expected,
            key.kind()
        )));
    }
    let bytes: [u8; 32] = key.as_bytes().try_into().map_err(|_| {
        EncryptionError::InvalidKeyMaterial(format!(
            "{} key must be {} bytes, got {}",
            expected,
            length,
            key.len()
        ))
    })?;
    Ok(Zeroizing::new(bytes))
}

fn aead_seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| EncryptionError::EncryptionFailed)?;
    let mut output = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

fn aead_open(key: &[u8; 32], data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if data.len() < NONCE_LENGTH + TAG_LENGTH {
        return Err(EncryptionError::DecryptionError);
    }
    let (nonce, ciphertext) = data.split_at(NONCE_LENGTH);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| EncryptionError::DecryptionError)
}

/* ------------------------------------------------------------------------- */

// TESTS
