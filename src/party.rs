//! A Party is a participant in a conversation. Each party keeps one credential entry per peer: its own
//! handler for that relationship plus the key the peer handed over during the exchange.
//!
//! The rule that makes both variants work the same way: a handler's encryption key is its owner's
//! *inbound* key. Senders always encrypt with the key the peer advertised; receivers always decrypt with
//! their own handler. Under the symmetric variant this means each direction of a conversation uses a
//! different shared secret, namely the receiver's.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use rand_core::{OsRng, RngCore};

use crate::error::{EncryptionError, PartyError};
use crate::handler::{EncryptionHandler, Handler};
use crate::keys::{EncryptionKey, EncryptionType};
use crate::messages::{Ciphertext, Envelope};

/// PARTY_ID_LENGTH is 16 bytes (128 bits of OS randomness, so collisions are negligible without coordination)
pub const PARTY_ID_LENGTH: usize = 16;

/// PartyId is an opaque, process-unique identifier. It prints as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartyId([u8; PARTY_ID_LENGTH]);

impl PartyId {
    /// random draws a fresh id from the OS RNG
    pub fn random() -> Self {
        let mut bytes = [0u8; PARTY_ID_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; PARTY_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PARTY_ID_LENGTH] {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartyId({})", self)
    }
}

/// CredentialEntry is everything one party needs to talk to one peer.
///
/// - own_handler: generated by this party for this relationship; decrypts what the peer sends
/// - peer_encryption_key: the peer's advertised key; everything sent to the peer is encrypted with it
///
/// Both halves always belong to the same variant; [`CredentialEntry::new`] refuses anything else.
#[derive(Debug)]
pub struct CredentialEntry {
    own_handler: Handler,
    peer_encryption_key: EncryptionKey,
}

impl CredentialEntry {
    pub fn new(own_handler: Handler, peer_encryption_key: EncryptionKey) -> Result<Self, EncryptionError> {
        own_handler.check_peer_key(&peer_encryption_key)?;
        Ok(Self {
            own_handler,
            peer_encryption_key,
        })
    }

    pub fn own_handler(&self) -> &Handler {
        &self.own_handler
    }

    pub fn peer_encryption_key(&self) -> &EncryptionKey {
        &self.peer_encryption_key
    }

    pub fn encryption_type(&self) -> EncryptionType {
        self.own_handler.encryption_type()
    }

    fn seal(&self, message: &str) -> Result<Ciphertext, EncryptionError> {
        self.own_handler.encrypt(message, Some(&self.peer_encryption_key))
    }

    fn open(&self, ciphertext: &Ciphertext) -> Result<String, EncryptionError> {
        self.own_handler.decrypt(ciphertext)
    }
}

/// Party holds an id, a display name, and the credential table.
///
/// The table sits behind a mutex so every operation works through `&self`. An exchange holds both parties'
/// tables for its whole duration, always locking the smaller [`PartyId`] first, so concurrent exchanges
/// between the same pair are serialized and the last one wins on *both* sides. Messaging locks one table at
/// a time and never holds a lock while calling into another party.
pub struct Party {
    id: PartyId,
    name: String,
    credentials: Mutex<CredentialTable>,
}

type CredentialTable = HashMap<PartyId, CredentialEntry>;

impl Party {
    /// new builds a party with a random id and an empty credential table
    pub fn new(name: &str) -> Self {
        Self {
            id: PartyId::random(),
            name: name.to_string(),
            credentials: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> PartyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn credentials(&self) -> MutexGuard<'_, CredentialTable> {
        // Entries are inserted whole, so a panic elsewhere cannot leave the map half-written
        self.credentials.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, table: &mut CredentialTable, peer: PartyId, entry: CredentialEntry) {
        if table.insert(peer, entry).is_some() {
            debug!("{} ({}) replaced its credential for {}", self.name, self.id, peer);
        }
    }

    /// initiate_key_exchange creates a fresh handler of `variant`, hands its encryption key to `peer`, and
    /// stores whatever key the peer hands back. Both sides end up with an entry for the other, or neither
    /// table changes. Repeating the exchange overwrites both entries.
    pub fn initiate_key_exchange(&self, peer: &Party, variant: EncryptionType) -> Result<(), PartyError> {
        if peer.id == self.id {
            return Err(PartyError::SelfExchange);
        }
        debug!(
            "{} ({}) initiating {} key exchange with {} ({})",
            self.name, self.id, variant, peer.name, peer.id
        );
        // Fixed lock order so two opposing exchanges cannot deadlock
        let (mut mine, mut theirs) = if self.id < peer.id {
            let mine = self.credentials();
            (mine, peer.credentials())
        } else {
            let theirs = peer.credentials();
            (self.credentials(), theirs)
        };
        let handler = Handler::new(variant);
        let my_encryption_key = handler.encryption_key();
        let (peer_entry, peer_encryption_key) = peer.prepare_accept(self, my_encryption_key, variant)?;
        let entry = CredentialEntry::new(handler, peer_encryption_key).inspect_err(|e| {
            warn!("{} ({}) rejected key from {}: {}", self.name, self.id, peer.id, e);
        })?;
        peer.store(&mut theirs, self.id, peer_entry);
        self.store(&mut mine, peer.id, entry);
        debug!(
            "{} ({}) accepted {} key exchange from {} ({})",
            peer.name, peer.id, variant, self.name, self.id
        );
        Ok(())
    }

    /// accept_key_exchange is the peer's half of [`Party::initiate_key_exchange`]: it creates its own,
    /// independent handler of the same variant, stores the initiator's key next to it, and returns its own
    /// encryption key. Nothing is stored if `initiator_key` is not a usable key for `variant`.
    pub fn accept_key_exchange(
        &self,
        initiator: &Party,
        initiator_key: EncryptionKey,
        variant: EncryptionType,
    ) -> Result<EncryptionKey, PartyError> {
        let (entry, my_encryption_key) = self.prepare_accept(initiator, initiator_key, variant)?;
        self.store(&mut self.credentials(), initiator.id, entry);
        debug!(
            "{} ({}) accepted {} key exchange from {} ({})",
            self.name, self.id, variant, initiator.name, initiator.id
        );
        Ok(my_encryption_key)
    }

    /// prepare_accept builds the acceptor's entry without touching any table.
    fn prepare_accept(
        &self,
        initiator: &Party,
        initiator_key: EncryptionKey,
        variant: EncryptionType,
    ) -> Result<(CredentialEntry, EncryptionKey), PartyError> {
        if initiator.id == self.id {
            return Err(PartyError::SelfExchange);
        }
        let handler = Handler::new(variant);
        let entry = CredentialEntry::new(handler, initiator_key).inspect_err(|e| {
            warn!(
                "{} ({}) refused {} key exchange from {}: {}",
                self.name, self.id, variant, initiator.id, e
            );
        })?;
        let my_encryption_key = entry.own_handler.encryption_key();
        Ok((entry, my_encryption_key))
    }

    /// send encrypts `message` for `peer` and delivers it straight to [`Party::receive`], returning the text
    /// the peer decrypted. Without a credential for `peer` nothing is encrypted and `NoCredential` comes back.
    pub fn send(&self, peer: &Party, message: &str) -> Result<String, PartyError> {
        let envelope = self.seal_for(peer.id, message)?;
        peer.receive(self, &envelope.ciphertext)
    }

    /// receive decrypts a ciphertext from `sender` with this party's handler for that sender.
    pub fn receive(&self, sender: &Party, ciphertext: &Ciphertext) -> Result<String, PartyError> {
        self.open_from(sender.id, ciphertext)
    }

    /// seal_for encrypts without delivering, for callers that move envelopes over their own transport.
    pub fn seal_for(&self, peer: PartyId, message: &str) -> Result<Envelope, PartyError> {
        let credentials = self.credentials();
        let entry = credentials
            .get(&peer)
            .ok_or(PartyError::NoCredential { peer })?;
        let ciphertext = entry.seal(message)?;
        debug!(
            "{} ({}) sealed {} bytes for {} ({} ciphertext bytes)",
            self.name,
            self.id,
            message.len(),
            peer,
            ciphertext.len()
        );
        Ok(Envelope::new(self.id, peer, ciphertext))
    }

    /// open decrypts an envelope that arrived over an external transport. Envelopes addressed to another
    /// party are refused before any decryption is attempted.
    pub fn open(&self, envelope: &Envelope) -> Result<String, PartyError> {
        if envelope.recipient != self.id {
            warn!(
                "{} ({}) got an envelope addressed to {}",
                self.name, self.id, envelope.recipient
            );
            return Err(PartyError::Misaddressed {
                recipient: envelope.recipient,
            });
        }
        self.open_from(envelope.sender, &envelope.ciphertext)
    }

    fn open_from(&self, sender: PartyId, ciphertext: &Ciphertext) -> Result<String, PartyError> {
        let credentials = self.credentials();
        let entry = credentials
            .get(&sender)
            .ok_or(PartyError::NoCredential { peer: sender })?;
        let plaintext = entry.open(ciphertext).inspect_err(|e| {
            warn!(
                "{} ({}) could not open {} bytes from {}: {}",
                self.name,
                self.id,
                ciphertext.len(),
                sender,
                e
            );
        })?;
        debug!("{} ({}) opened a message from {}", self.name, self.id, sender);
        Ok(plaintext)
    }

    pub fn has_credential(&self, peer: PartyId) -> bool {
        self.credentials().contains_key(&peer)
    }

    /// credential_type reports which variant was agreed with `peer`, if any
    pub fn credential_type(&self, peer: PartyId) -> Option<EncryptionType> {
        self.credentials().get(&peer).map(CredentialEntry::encryption_type)
    }

    /// peer_encryption_key returns the key this party encrypts with when writing to `peer`
    pub fn peer_encryption_key(&self, peer: PartyId) -> Option<EncryptionKey> {
        self.credentials()
            .get(&peer)
            .map(|entry| entry.peer_encryption_key.clone())
    }

    /// own_encryption_key returns the key this party advertised to `peer`
    pub fn own_encryption_key(&self, peer: PartyId) -> Option<EncryptionKey> {
        self.credentials()
            .get(&peer)
            .map(|entry| entry.own_handler.encryption_key())
    }

    /// peers lists every peer with an established credential, sorted by id
    pub fn peers(&self) -> Vec<PartyId> {
        let mut peers: Vec<PartyId> = self.credentials().keys().copied().collect();
        peers.sort();
        peers
    }

    /// forget drops the credential for `peer`; returns whether one existed
    pub fn forget(&self, peer: PartyId) -> bool {
        let removed = self.credentials().remove(&peer).is_some();
        if removed {
            debug!("{} ({}) forgot its credential for {}", self.name, self.id, peer);
        }
        removed
    }
}

impl fmt::Debug for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Party")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("peers", &self.peers())
            .finish()
    }
}

impl Drop for Party {
    fn drop(&mut self) {
        let credentials = self
            .credentials
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if !credentials.is_empty() {
            debug!(
                "{} ({}) dropping {} credential(s)",
                self.name,
                self.id,
                credentials.len()
            );
        }
        credentials.clear();
    }
}

/* ------------------------------------------------------------------------- */

// TESTS
