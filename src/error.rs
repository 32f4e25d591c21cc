//! Error types for handlers and parties.

use thiserror::Error;

use crate::party::PartyId;

/// Failures raised by the encryption handlers and the primitives underneath them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("unsupported encryption type: {0:?}")]
    UnsupportedEncryptionType(String),
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("decryption failed: data may be corrupted or encrypted under another key")]
    DecryptionError,
}

/// Failures raised by [`crate::Party`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartyError {
    #[error("no credential established with peer {peer}")]
    NoCredential { peer: PartyId },
    #[error("envelope is addressed to {recipient}")]
    Misaddressed { recipient: PartyId },
    #[error("a party cannot exchange keys with itself")]
    SelfExchange,
    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}
