//! Key material handed around by handlers and parties.
//!
//! Keys are opaque byte strings. The [`KeyKind`] travels next to the bytes rather than inside them, so
//! whoever holds a key always knows which primitive it belongs to without parsing it.

use std::fmt;
use std::str::FromStr;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::EncryptionError;

/// EncryptionType names the two handler variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncryptionType {
    /// One shared secret both encrypts and decrypts.
    Symmetric,
    /// A public key encrypts, the linked private key decrypts.
    Asymmetric,
}

impl EncryptionType {
    /// The key kind a handler of this type accepts for encryption.
    pub fn encryption_key_kind(self) -> KeyKind {
        match self {
            EncryptionType::Symmetric => KeyKind::Shared,
            EncryptionType::Asymmetric => KeyKind::Public,
        }
    }
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionType::Symmetric => f.write_str("symmetric"),
            EncryptionType::Asymmetric => f.write_str("asymmetric"),
        }
    }
}

impl FromStr for EncryptionType {
    type Err = EncryptionError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "symmetric" => Ok(EncryptionType::Symmetric),
            "asymmetric" => Ok(EncryptionType::Asymmetric),
            _ => Err(EncryptionError::UnsupportedEncryptionType(tag.to_string())),
        }
    }
}

/// KeyKind is the tag carried alongside every key's bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Shared,
    Public,
    Private,
}

impl KeyKind {
    pub fn encryption_type(self) -> EncryptionType {
        match self {
            KeyKind::Shared => EncryptionType::Symmetric,
            KeyKind::Public | KeyKind::Private => EncryptionType::Asymmetric,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Shared => f.write_str("shared"),
            KeyKind::Public => f.write_str("public"),
            KeyKind::Private => f.write_str("private"),
        }
    }
}

/// EncryptionKey is tagged, opaque key material. The bytes are wiped when the key is dropped.
///
/// Lengths are not checked here: a key of the wrong size is only rejected by the primitive that tries to
/// use it, which reports [`EncryptionError::InvalidKeyMaterial`].
#[derive(Clone)]
pub struct EncryptionKey {
    kind: KeyKind,
    bytes: Vec<u8>,
}

impl EncryptionKey {
    pub(crate) fn new(kind: KeyKind, bytes: Vec<u8>) -> Self {
        Self { kind, bytes }
    }

    /// from_bytes wraps key bytes received from a peer. Private keys cannot enter a process this way.
    pub fn from_bytes(kind: KeyKind, bytes: &[u8]) -> Result<Self, EncryptionError> {
        if kind == KeyKind::Private {
            return Err(EncryptionError::InvalidKeyMaterial(
                "private keys cannot be imported".to_string(),
            ));
        }
        Ok(Self::new(kind, bytes.to_vec()))
    }

    /// from_hex is the inverse of [`EncryptionKey::to_hex`].
    pub fn from_hex(kind: KeyKind, encoded: &str) -> Result<Self, EncryptionError> {
        let bytes = hex::decode(encoded)
            .map_err(|e| EncryptionError::InvalidKeyMaterial(format!("bad hex encoding: {e}")))?;
        Self::from_bytes(kind, &bytes)
    }

    /// to_hex encodes the key for transport. Only shared and public keys ever reach this type in exported
    /// form; a private key lives inside a [`DecryptionKey`] and has to be exposed explicitly first.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn encryption_type(&self) -> EncryptionType {
        self.kind.encryption_type()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for EncryptionKey {
    fn eq(&self, other: &Self) -> bool {
        // Constant-time comparison
        self.kind == other.kind && bool::from(self.bytes.as_slice().ct_eq(other.bytes.as_slice()))
    }
}

impl Eq for EncryptionKey {}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("EncryptionKey");
        debug.field("kind", &self.kind);
        // Only public keys are safe to print
        match self.kind {
            KeyKind::Public => debug.field("bytes", &hex::encode(&self.bytes)),
            KeyKind::Shared | KeyKind::Private => debug.field("bytes", &"[REDACTED]"),
        };
        debug.finish()
    }
}

/// DecryptionKey is what a handler hands out when asked for the key that opens its ciphertexts.
///
/// It is deliberately awkward to leak: it cannot be cloned, prints as redacted, and the key inside is
/// only reachable through [`DecryptionKey::expose_secret`].
#[derive(PartialEq, Eq)]
pub struct DecryptionKey(EncryptionKey);

impl DecryptionKey {
    pub(crate) fn new(key: EncryptionKey) -> Self {
        Self(key)
    }

    pub fn kind(&self) -> KeyKind {
        self.0.kind
    }

    pub fn expose_secret(&self) -> &EncryptionKey {
        &self.0
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("kind", &self.0.kind)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// KeyPair holds the two halves of an asymmetric key. Both halves come out of the same generation step;
/// there is no way to assemble a pair from independently obtained keys.
#[derive(Debug)]
pub struct KeyPair {
    public: EncryptionKey,
    private: DecryptionKey,
}

impl KeyPair {
    pub(crate) fn new(public: EncryptionKey, private: DecryptionKey) -> Self {
        Self { public, private }
    }

    pub fn public(&self) -> &EncryptionKey {
        &self.public
    }

    pub fn private(&self) -> &DecryptionKey {
        &self.private
    }
}

/// KeyMaterial is the output of key generation: a shared secret or a key pair.
#[derive(Debug)]
pub enum KeyMaterial {
    Shared(EncryptionKey),
    Pair(KeyPair),
}

impl KeyMaterial {
    pub fn encryption_type(&self) -> EncryptionType {
        match self {
            KeyMaterial::Shared(_) => EncryptionType::Symmetric,
            KeyMaterial::Pair(_) => EncryptionType::Asymmetric,
        }
    }

    /// The half of the material that encrypts.
    pub fn encryption_key(&self) -> &EncryptionKey {
        match self {
            KeyMaterial::Shared(key) => key,
            KeyMaterial::Pair(pair) => pair.public(),
        }
    }
}
