use crate::{TransactionOutput, Utxo};
use std::collections::HashMap;

/// A pool of confirmed and unspent transaction outputs.
/// Cloning the pool produces an independent snapshot.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UtxoPool {
    // Unspent transaction outputs, indexed by their transaction ID and their index in the
    // transaction.
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    /// Returns the output for the given UTXO, or None if it's been spent or never existed.
    pub fn get(&self, utxo: &Utxo) -> Option<&TransactionOutput> {
        self.utxos.get(utxo)
    }

    /// Inserts the output, replacing any output previously stored under the same UTXO.
    pub fn add(&mut self, utxo: Utxo, output: TransactionOutput) {
        self.utxos.insert(utxo, output);
    }

    pub fn remove(&mut self, utxo: &Utxo) -> Option<TransactionOutput> {
        self.utxos.remove(utxo)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Returns all unspent outputs in no particular order.
    pub fn all_utxos(&self) -> Vec<Utxo> {
        self.utxos.keys().copied().collect()
    }
}
