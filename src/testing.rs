//! Helpers shared by the unit tests.

use crate::{
    Address, Amount, OutputIndex, Sha256, Transaction, TransactionBuilder, TransactionId,
    TransactionOutput, Utxo, UtxoPool,
};
use k256::ecdsa::SigningKey;

/// Deterministic key, so that signatures and transaction IDs are reproducible.
pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_slice(&[seed; 32]).unwrap()
}

pub fn address(seed: u8) -> Address {
    Address::from_verifying_key(signing_key(seed).verifying_key())
}

/// An output of an imaginary transaction that funded the initial pool.
pub fn genesis_utxo(index: u32) -> Utxo {
    let genesis_id = TransactionId::new(Sha256::digest(b"genesis"));
    Utxo::new(genesis_id, OutputIndex::new(index))
}

/// The initial pool with one genesis output per `(amount, owner seed)` entry.
pub fn genesis_pool(outputs: &[(Amount, u8)]) -> UtxoPool {
    let mut pool = UtxoPool::new();
    for (index, (amount, owner)) in outputs.iter().enumerate() {
        pool.add(
            genesis_utxo(index as u32),
            TransactionOutput::new(*amount, address(*owner)),
        );
    }
    pool
}

/// Builds a transaction that spends `inputs`, each signed by the key with the given seed, and
/// pays `(amount, owner seed)` for each output.
pub fn transfer(inputs: &[(Utxo, u8)], outputs: &[(Amount, u8)]) -> Transaction {
    let mut builder = TransactionBuilder::new();
    for (utxo, _) in inputs {
        builder = builder.add_input(*utxo);
    }
    for (amount, owner) in outputs {
        builder = builder.add_output(*amount, address(*owner));
    }
    for (index, (_, signer)) in inputs.iter().enumerate() {
        builder = builder.sign_input(index, &signing_key(*signer)).unwrap();
    }
    builder.build().unwrap()
}

pub fn output_of(transaction: &Transaction, index: u32) -> Utxo {
    Utxo::new(*transaction.id(), OutputIndex::new(index))
}
