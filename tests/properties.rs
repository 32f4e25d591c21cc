//! Property-Based Tests
//!
//! Handler properties that should hold for every plaintext, not just the ones the unit tests pick.

use proptest::prelude::*;

use keyswap::{
    AsymmetricHandler, Ciphertext, EncryptionError, EncryptionHandler, EncryptionType, Party,
    SymmetricHandler,
};

proptest! {
    // Key generation and X25519 are not free, keep the case count modest
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: a symmetric handler opens what it sealed with its own key
    #[test]
    fn prop_symmetric_round_trip(message in ".{0,200}") {
        let handler = SymmetricHandler::new();
        let ciphertext = handler.encrypt(&message, None).unwrap();
        prop_assert_eq!(handler.decrypt(&ciphertext).unwrap(), message);
    }

    /// Property: an asymmetric handler opens what was sealed to its public key
    #[test]
    fn prop_asymmetric_round_trip(message in ".{0,200}") {
        let handler = AsymmetricHandler::new();
        let public = handler.encryption_key();
        let ciphertext = handler.encrypt(&message, Some(&public)).unwrap();
        prop_assert_eq!(handler.decrypt(&ciphertext).unwrap(), message);
    }

    /// Property: another symmetric handler's ciphertext never decrypts
    #[test]
    fn prop_symmetric_foreign_key_fails(message in ".{0,200}") {
        let h1 = SymmetricHandler::new();
        let h2 = SymmetricHandler::new();
        let ciphertext = h2.encrypt(&message, None).unwrap();
        prop_assert_eq!(h1.decrypt(&ciphertext), Err(EncryptionError::DecryptionError));
    }

    /// Property: another asymmetric handler's ciphertext never decrypts
    #[test]
    fn prop_asymmetric_foreign_key_fails(message in ".{0,200}") {
        let h1 = AsymmetricHandler::new();
        let h2 = AsymmetricHandler::new();
        let ciphertext = h2.encrypt(&message, Some(&h2.encryption_key())).unwrap();
        prop_assert_eq!(h1.decrypt(&ciphertext), Err(EncryptionError::DecryptionError));
    }

    /// Property: encryption is nondeterministic
    #[test]
    fn prop_ciphertexts_never_repeat(message in ".{0,64}") {
        let symmetric = SymmetricHandler::new();
        prop_assert_ne!(
            symmetric.encrypt(&message, None).unwrap(),
            symmetric.encrypt(&message, None).unwrap()
        );
        let asymmetric = AsymmetricHandler::new();
        prop_assert_ne!(
            asymmetric.encrypt(&message, None).unwrap(),
            asymmetric.encrypt(&message, None).unwrap()
        );
    }

    /// Property: truncating a ciphertext anywhere makes it fail, never yield other text
    #[test]
    fn prop_truncation_is_detected(message in ".{1,64}", cut in 1usize..200) {
        let handler = AsymmetricHandler::new();
        let bytes = handler.encrypt(&message, None).unwrap().into_bytes();
        let keep = bytes.len().saturating_sub(cut);
        let truncated = Ciphertext::from(bytes[..keep].to_vec());
        prop_assert_eq!(handler.decrypt(&truncated), Err(EncryptionError::DecryptionError));
    }

    /// Property: after an exchange any message arrives unchanged in both directions
    #[test]
    fn prop_parties_deliver_exact_text(
        asymmetric in any::<bool>(),
        to_bob in ".{0,100}",
        to_alice in ".{0,100}",
    ) {
        let variant = if asymmetric { EncryptionType::Asymmetric } else { EncryptionType::Symmetric };
        let alice = Party::new("alice");
        let bob = Party::new("bob");
        alice.initiate_key_exchange(&bob, variant).unwrap();
        prop_assert_eq!(alice.send(&bob, &to_bob).unwrap(), to_bob);
        prop_assert_eq!(bob.send(&alice, &to_alice).unwrap(), to_alice);
    }
}
