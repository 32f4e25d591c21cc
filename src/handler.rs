//! Encryption handlers: one object per key context, with the same five operations whichever variant it is.
//!
//! A handler generates its key material once, at construction, and never changes it afterwards. The key it
//! hands out for encryption is the key peers should use when writing *to* this handler's owner; only the
//! owner can decrypt what comes back.

use crate::crypto;
use crate::error::EncryptionError;
use crate::keys::{DecryptionKey, EncryptionKey, EncryptionType, KeyMaterial, KeyPair};
use crate::messages::Ciphertext;

/// EncryptionHandler is the capability every variant provides.
pub trait EncryptionHandler {
    /// Which variant this handler is.
    fn encryption_type(&self) -> EncryptionType;

    /// generate_key produces fresh material of this handler's variant. The handler's own key is unaffected.
    fn generate_key(&self) -> KeyMaterial;

    /// encrypt uses `key` when given, otherwise the handler's own encryption key. Every call draws fresh
    /// randomness, so encrypting the same message twice gives two different ciphertexts.
    fn encrypt(&self, message: &str, key: Option<&EncryptionKey>) -> Result<Ciphertext, EncryptionError>;

    /// decrypt always uses the handler's own decryption key.
    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<String, EncryptionError>;

    /// encryption_key is safe to hand to peers: the shared secret or the public key.
    fn encryption_key(&self) -> EncryptionKey;

    /// decryption_key returns the shared secret or the private key.
    fn decryption_key(&self) -> DecryptionKey;
}

fn into_text(plaintext: Vec<u8>) -> Result<String, EncryptionError> {
    String::from_utf8(plaintext).map_err(|_| EncryptionError::DecryptionError)
}

/// SymmetricHandler encrypts and decrypts with a single shared secret.
#[derive(Debug)]
pub struct SymmetricHandler {
    key: EncryptionKey,
}

impl SymmetricHandler {
    pub fn new() -> Self {
        Self {
            key: crypto::generate_shared_key(),
        }
    }
}

impl Default for SymmetricHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EncryptionHandler for SymmetricHandler {
    fn encryption_type(&self) -> EncryptionType {
        EncryptionType::Symmetric
    }

    fn generate_key(&self) -> KeyMaterial {
        KeyMaterial::Shared(crypto::generate_shared_key())
    }

    fn encrypt(&self, message: &str, key: Option<&EncryptionKey>) -> Result<Ciphertext, EncryptionError> {
        let key = key.unwrap_or(&self.key);
        crypto::seal_shared(key, message.as_bytes()).map(Ciphertext::from)
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<String, EncryptionError> {
        into_text(crypto::open_shared(&self.key, ciphertext.as_bytes())?)
    }

    fn encryption_key(&self) -> EncryptionKey {
        self.key.clone()
    }

    fn decryption_key(&self) -> DecryptionKey {
        DecryptionKey::new(self.key.clone())
    }
}

/// AsymmetricHandler owns an X25519 key pair: the public half encrypts, the private half decrypts.
#[derive(Debug)]
pub struct AsymmetricHandler {
    keys: KeyPair,
}

impl AsymmetricHandler {
    pub fn new() -> Self {
        Self {
            keys: crypto::generate_key_pair(),
        }
    }
}

impl Default for AsymmetricHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EncryptionHandler for AsymmetricHandler {
    fn encryption_type(&self) -> EncryptionType {
        EncryptionType::Asymmetric
    }

    fn generate_key(&self) -> KeyMaterial {
        KeyMaterial::Pair(crypto::generate_key_pair())
    }

    fn encrypt(&self, message: &str, key: Option<&EncryptionKey>) -> Result<Ciphertext, EncryptionError> {
        let key = key.unwrap_or(self.keys.public());
        crypto::seal_to_public(key, message.as_bytes()).map(Ciphertext::from)
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<String, EncryptionError> {
        let private = self.keys.private().expose_secret();
        into_text(crypto::open_with_private(private, ciphertext.as_bytes())?)
    }

    fn encryption_key(&self) -> EncryptionKey {
        self.keys.public().clone()
    }

    fn decryption_key(&self) -> DecryptionKey {
        DecryptionKey::new(self.keys.private().expose_secret().clone())
    }
}

/// Handler dispatches to one of the two variants.
#[derive(Debug)]
pub enum Handler {
    Symmetric(SymmetricHandler),
    Asymmetric(AsymmetricHandler),
}

impl Handler {
    pub fn new(variant: EncryptionType) -> Self {
        match variant {
            EncryptionType::Symmetric => Handler::Symmetric(SymmetricHandler::new()),
            EncryptionType::Asymmetric => Handler::Asymmetric(AsymmetricHandler::new()),
        }
    }

    /// from_tag builds a handler from a textual variant name such as `"asymmetric"`.
    pub fn from_tag(tag: &str) -> Result<Self, EncryptionError> {
        Ok(Self::new(tag.parse()?))
    }

    /// check_peer_key confirms `key` is something this handler can encrypt toward: the right family, and
    /// usable by the primitive. Storing a key that fails this check would make every later send fail.
    pub fn check_peer_key(&self, key: &EncryptionKey) -> Result<(), EncryptionError> {
        let expected = self.encryption_type().encryption_key_kind();
        if key.kind() != expected {
            return Err(EncryptionError::InvalidKeyMaterial(format!(
                "{} handler cannot encrypt with a {} key",
                self.encryption_type(),
                key.kind()
            )));
        }
        crypto::check_encryption_key(key)
    }

    fn inner(&self) -> &dyn EncryptionHandler {
        match self {
            Handler::Symmetric(handler) => handler,
            Handler::Asymmetric(handler) => handler,
        }
    }
}

impl EncryptionHandler for Handler {
    fn encryption_type(&self) -> EncryptionType {
        self.inner().encryption_type()
    }

    fn generate_key(&self) -> KeyMaterial {
        self.inner().generate_key()
    }

    fn encrypt(&self, message: &str, key: Option<&EncryptionKey>) -> Result<Ciphertext, EncryptionError> {
        self.inner().encrypt(message, key)
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<String, EncryptionError> {
        self.inner().decrypt(ciphertext)
    }

    fn encryption_key(&self) -> EncryptionKey {
        self.inner().encryption_key()
    }

    fn decryption_key(&self) -> DecryptionKey {
        self.inner().decryption_key()
    }
}

/* ------------------------------------------------------------------------- */

// TESTS
