//! End-to-end conversations between parties through the public API.

use keyswap::{
    Ciphertext, EncryptionError, EncryptionKey, EncryptionType, Envelope, Party, PartyError,
};

const TO_BOB: &str = "Hello Bob! This is a secret message.";
const TO_ALICE: &str = "Hi Alice, how have you been?";

#[test]
fn alice_and_bob_asymmetric() {
    let alice = Party::new("Alice");
    let bob = Party::new("Bob");
    alice
        .initiate_key_exchange(&bob, EncryptionType::Asymmetric)
        .expect("exchange failed");

    assert_eq!(alice.send(&bob, TO_BOB).expect("send to bob failed"), TO_BOB);
    assert_eq!(bob.send(&alice, TO_ALICE).expect("send to alice failed"), TO_ALICE);
}

#[test]
fn alice_and_bob_symmetric() {
    let alice = Party::new("Alice");
    let bob = Party::new("Bob");
    alice
        .initiate_key_exchange(&bob, EncryptionType::Symmetric)
        .expect("exchange failed");

    assert_eq!(alice.send(&bob, TO_BOB).expect("send to bob failed"), TO_BOB);
    assert_eq!(bob.send(&alice, TO_ALICE).expect("send to alice failed"), TO_ALICE);
}

#[test]
fn send_before_exchange_is_refused() {
    let alice = Party::new("Alice");
    let bob = Party::new("Bob");
    assert_eq!(
        alice.send(&bob, TO_BOB),
        Err(PartyError::NoCredential { peer: bob.id() })
    );
    assert!(matches!(
        alice.seal_for(bob.id(), TO_BOB),
        Err(PartyError::NoCredential { .. })
    ));
}

#[test]
fn messages_survive_a_hex_transport() {
    let alice = Party::new("Alice");
    let bob = Party::new("Bob");
    alice
        .initiate_key_exchange(&bob, EncryptionType::Asymmetric)
        .expect("exchange failed");

    let envelope = alice.seal_for(bob.id(), TO_BOB).expect("seal failed");
    let wire = envelope.ciphertext.to_hex();
    let arrived = Envelope::new(
        envelope.sender,
        envelope.recipient,
        Ciphertext::from_hex(&wire).expect("bad hex"),
    );
    assert_eq!(bob.open(&arrived).expect("open failed"), TO_BOB);
}

#[test]
fn exchanged_keys_survive_a_hex_transport() {
    // Keys moved by hand rather than through initiate_key_exchange
    let alice = Party::new("Alice");
    let bob = Party::new("Bob");
    let carol = Party::new("Carol");
    alice
        .initiate_key_exchange(&bob, EncryptionType::Asymmetric)
        .expect("exchange failed");

    let bob_key = alice.peer_encryption_key(bob.id()).expect("no key for bob");
    let wire = bob_key.to_hex();
    let imported = EncryptionKey::from_hex(bob_key.kind(), &wire).expect("bad key");
    assert_eq!(imported, bob_key);

    // Carol cannot pose as Bob's peer just by knowing Bob's public key
    let carol_key = carol
        .accept_key_exchange(&bob, imported, EncryptionType::Asymmetric)
        .expect("accept failed");
    assert_eq!(carol_key.kind(), keyswap::KeyKind::Public);
    let envelope = carol.seal_for(bob.id(), "from carol").expect("seal failed");
    // Bob's entry for Carol does not exist, so the envelope is refused
    assert_eq!(
        bob.open(&envelope),
        Err(PartyError::NoCredential { peer: carol.id() })
    );
}

#[test]
fn one_party_many_peers() {
    let alice = Party::new("Alice");
    let bob = Party::new("Bob");
    let carol = Party::new("Carol");
    alice
        .initiate_key_exchange(&bob, EncryptionType::Asymmetric)
        .expect("exchange with bob failed");
    alice
        .initiate_key_exchange(&carol, EncryptionType::Symmetric)
        .expect("exchange with carol failed");

    let mut expected = vec![bob.id(), carol.id()];
    expected.sort();
    assert_eq!(alice.peers(), expected);

    // A message sealed for Bob does not open under Carol's credential
    let for_bob = alice.seal_for(bob.id(), "bob only").expect("seal failed");
    assert_eq!(
        carol.receive(&alice, &for_bob.ciphertext),
        Err(PartyError::Encryption(EncryptionError::DecryptionError))
    );
    assert_eq!(bob.receive(&alice, &for_bob.ciphertext).expect("open failed"), "bob only");
    assert_eq!(carol.send(&alice, "hi").expect("send failed"), "hi");
}

#[test]
fn dropping_a_peer_leaves_the_other_side_intact() {
    let alice = Party::new("Alice");
    let bob_id;
    {
        let bob = Party::new("Bob");
        bob_id = bob.id();
        alice
            .initiate_key_exchange(&bob, EncryptionType::Symmetric)
            .expect("exchange failed");
    }
    assert!(alice.has_credential(bob_id));
    assert!(alice.forget(bob_id));
    assert!(alice.peers().is_empty());
}
