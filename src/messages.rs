//! Ciphertexts and the envelope they travel in.
//!
//! Neither type knows how it gets from one party to another; any transport can carry the bytes.

use std::fmt;

use crate::error::EncryptionError;
use crate::party::PartyId;

/// Ciphertext is an opaque byte string produced by a handler's encrypt operation.
#[derive(Clone, PartialEq, Eq)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// from_hex is the inverse of [`Ciphertext::to_hex`]. A malformed string is treated like a corrupted
    /// ciphertext.
    pub fn from_hex(encoded: &str) -> Result<Self, EncryptionError> {
        hex::decode(encoded)
            .map(Self)
            .map_err(|_| EncryptionError::DecryptionError)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Ciphertext {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ciphertext({} bytes)", self.0.len())
    }
}

/// Envelope wraps up a ciphertext with the ids needed to route it.
///
/// - sender: the party whose credential entry produced the ciphertext; the recipient looks up its own
///   entry for this id to decrypt.
/// - recipient: the party the ciphertext was encrypted toward.
/// - ciphertext: the encrypted message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub sender: PartyId,
    pub recipient: PartyId,
    pub ciphertext: Ciphertext,
}

impl Envelope {
    pub fn new(sender: PartyId, recipient: PartyId, ciphertext: Ciphertext) -> Envelope {
        Envelope {
            sender,
            recipient,
            ciphertext,
        }
    }
}
