use crate::{
    OutputIndex, Transaction, TransactionId, TransactionPool, TransactionValidator, Utxo,
    UtxoPool,
};
use tracing::{debug, info, trace};

/// Maintains the public ledger, i.e. the UTXO pool, and advances it one epoch at a time.
///
/// The handler owns its copy of the pool, so the snapshot it was created from is never modified.
/// Epochs must be handled sequentially: each call to `handle_txs` observes the outputs created
/// and spent by all previous calls.
pub struct TransactionHandler {
    utxo_pool: UtxoPool,
}

impl TransactionHandler {
    pub fn new(utxo_pool: &UtxoPool) -> Self {
        Self {
            utxo_pool: utxo_pool.clone(),
        }
    }

    /// Checks the transaction against the current state of the ledger.
    pub fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        TransactionValidator::is_valid(transaction, &self.utxo_pool)
    }

    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    pub fn into_utxo_pool(self) -> UtxoPool {
        self.utxo_pool
    }

    /// Handles an epoch: accepts a mutually consistent subset of the unordered candidate
    /// transactions, applies them to the ledger and returns them in the order they were applied.
    ///
    /// Candidates are retried in passes until a pass accepts nothing, so a transaction spending
    /// an output created by another candidate is accepted after its parent regardless of the
    /// order in which they were submitted. When candidates conflict, the first one submitted
    /// among those that are valid wins, and the rest are dropped silently.
    pub fn handle_txs(&mut self, candidates: Vec<Transaction>) -> Vec<Transaction> {
        let submitted = candidates.len();
        let mut pending = candidates.into_iter().collect::<TransactionPool>();
        let mut accepted = vec![];
        let mut passes = 0;

        while !pending.is_empty() {
            passes += 1;
            let accepted_ids = self.accept_pass(&pending);
            trace!(
                "Pass: {} accepted {} of {} pending transactions",
                passes,
                accepted_ids.len(),
                pending.len()
            );
            if accepted_ids.is_empty() {
                break;
            }
            accepted.extend(pending.remove_all(&accepted_ids));
        }

        info!(
            "Epoch handled in {} passes: submitted: {}, accepted: {}, rejected: {}",
            passes,
            submitted,
            accepted.len(),
            pending.len()
        );
        accepted
    }

    /// Validates each pending transaction against the current pool, applying valid ones
    /// immediately so that later transactions in the same pass see their effects.
    /// Returns the IDs of the applied transactions in the order they were applied.
    fn accept_pass(&mut self, pending: &TransactionPool) -> Vec<TransactionId> {
        let mut accepted_ids = vec![];
        for transaction in pending.all() {
            match TransactionValidator::validate(transaction, &self.utxo_pool) {
                Ok(fee) => {
                    debug!("Accepted transaction: {} with fee: {}", transaction.id(), fee);
                    self.apply(transaction);
                    accepted_ids.push(*transaction.id());
                }
                Err(e) => {
                    debug!("Transaction: {} is not valid yet: {}", transaction.id(), e);
                }
            }
        }
        accepted_ids
    }

    /// Spends the transaction inputs and adds its outputs to the pool.
    /// The fee is burned: it's not credited to anyone.
    fn apply(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            self.utxo_pool.remove(input.utxo());
        }
        // `Transaction::new` guarantees that every output index fits in u32.
        for (index, output) in (0..=u32::MAX).zip(transaction.outputs()) {
            let utxo = Utxo::new(*transaction.id(), OutputIndex::new(index));
            self.utxo_pool.add(utxo, output.clone());
        }
    }
}
