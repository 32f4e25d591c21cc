//! Runs the Alice and Bob walkthrough: exchange keys, send one message each way, and show that a party
//! without credentials is turned away.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use keyswap::{EncryptionType, Party, PartyError};

#[derive(Parser, Debug)]
#[command(name = "keyswap-demo", about = "Key exchange and encrypted messaging between two parties")]
struct Args {
    /// Encryption variant to exchange keys with: symmetric or asymmetric
    #[arg(long, default_value = "asymmetric")]
    variant: EncryptionType,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Message Alice sends to Bob
    #[arg(long, default_value = "Hello Bob! This is a secret message.")]
    to_bob: String,

    /// Message Bob sends back to Alice
    #[arg(long, default_value = "Hi Alice, how have you been?")]
    to_alice: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level)).init();

    let alice = Party::new("Alice");
    let bob = Party::new("Bob");
    info!("Alice is {}, Bob is {}", alice.id(), bob.id());

    alice
        .initiate_key_exchange(&bob, args.variant)
        .with_context(|| format!("{} key exchange failed", args.variant))?;
    info!("exchanged {} keys", args.variant);

    let envelope = alice.seal_for(bob.id(), &args.to_bob)?;
    println!("Alice -> Bob: {} ciphertext bytes", envelope.ciphertext.len());
    println!("Bob received: {}", bob.open(&envelope)?);

    let received = bob.send(&alice, &args.to_alice)?;
    println!("Alice received: {}", received);

    let eve = Party::new("Eve");
    match eve.send(&alice, "let me in") {
        Err(PartyError::NoCredential { peer }) => {
            println!("Eve has no credential for {}, nothing was sent", peer)
        }
        other => bail!("expected Eve to be refused, got {:?}", other),
    }

    if args.variant == EncryptionType::Symmetric {
        // Each direction uses the receiver's secret
        let alice_inbound = alice.own_encryption_key(bob.id());
        let bob_inbound = bob.own_encryption_key(alice.id());
        println!("directional secrets differ: {}", alice_inbound != bob_inbound);
    }

    Ok(())
}
