//! # Keyswap
//!
//! A small reference model of per-peer key exchange and encrypted messaging. Parties exchange keys under
//! one of two regimes (a shared secret, or an X25519 key pair) and then send each other messages that only
//! the intended recipient can open.
//!
//! ### Warnings and Disclaimers
//!
//! - DO NOT USE IN PRODUCTION: this is a teaching model, not a secure channel.
//! - There is no forward secrecy, no authentication of where a key came from, and no replay protection.
//!   Anyone who can tamper with the exchange can substitute their own key.
//! - The cryptographic primitives themselves are off-the-shelf (XChaCha20-Poly1305, X25519, HKDF-SHA256).
//!
//! ### Examples / API
//!
//! Alice and Bob each create a party. Alice starts the exchange; Bob's half runs inline.
//!
//! ```rust
//! let alice = Party::new("Alice");
//! let bob = Party::new("Bob");
//! alice.initiate_key_exchange(&bob, EncryptionType::Asymmetric)?;
//! ```
//!
//! Either side can now send. `send` encrypts with the key the peer advertised and hands the ciphertext to
//! the peer's `receive`, which decrypts with the peer's own handler.
//!
//! ```rust
//! let received = alice.send(&bob, "Hello Bob! This is a secret message.")?;
//! let reply = bob.send(&alice, "Hi Alice, how have you been?")?;
//! ```
//!
//! Sending to a party you never exchanged keys with fails with `PartyError::NoCredential` before anything is
//! encrypted.
//!
//! ### Under the Hood
//!
//! Each party keeps a credential table: for every peer, the handler it generated for that relationship and
//! the peer's encryption key. A handler's encryption key is the key peers use to write *to* its owner, so
//! under both variants a message is encrypted with the receiver's key and decrypted with the receiver's
//! handler. Repeating an exchange replaces the entry on both sides.
//!
//! To move messages over a real transport, use `Party::seal_for` and `Party::open` with `Envelope`s, and
//! `EncryptionKey::to_hex`/`from_hex` for the keys.

pub mod crypto;
mod error;
mod handler;
mod keys;
mod messages;
mod party;

pub use error::{EncryptionError, PartyError};
pub use handler::{AsymmetricHandler, EncryptionHandler, Handler, SymmetricHandler};
pub use keys::{DecryptionKey, EncryptionKey, EncryptionType, KeyKind, KeyMaterial, KeyPair};
pub use messages::{Ciphertext, Envelope};
pub use party::{CredentialEntry, Party, PartyId, PARTY_ID_LENGTH};
