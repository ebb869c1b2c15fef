use crate::{Transaction, TransactionId};
use std::collections::{HashMap, HashSet};

/// The candidate transactions of an epoch that haven't been accepted yet.
/// Transactions are indexed by their ID, so a transaction submitted more than once is kept only
/// once. The order of the first submission is preserved to make the acceptance order
/// deterministic.
#[derive(Debug, Default)]
pub struct TransactionPool {
    transactions: HashMap<TransactionId, Transaction>,
    order: Vec<TransactionId>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self {
            transactions: HashMap::new(),
            order: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Ensures that the transaction exists in the pool.
    /// Returns false if it was already there.
    pub fn insert(&mut self, transaction: Transaction) -> bool {
        if self.transactions.contains_key(transaction.id()) {
            return false;
        }
        self.order.push(*transaction.id());
        self.transactions.insert(*transaction.id(), transaction);
        true
    }

    /// Returns the transactions in the order they were first inserted.
    pub fn all(&self) -> Vec<&Transaction> {
        self.order
            .iter()
            .filter_map(|id| self.transactions.get(id))
            .collect()
    }

    /// Removes the given transactions and returns them in the order of `ids`.
    pub fn remove_all(&mut self, ids: &[TransactionId]) -> Vec<Transaction> {
        let removed = ids
            .iter()
            .filter_map(|id| self.transactions.remove(id))
            .collect::<Vec<Transaction>>();
        let removed_ids = removed
            .iter()
            .map(Transaction::id)
            .collect::<HashSet<&TransactionId>>();
        self.order.retain(|id| !removed_ids.contains(id));
        removed
    }
}

impl std::iter::FromIterator<Transaction> for TransactionPool {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        let mut pool = Self::new();
        for transaction in iter {
            pool.insert(transaction);
        }
        pool
    }
}
