use crate::{Amount, Transaction, TransactionOutput, Utxo, UtxoPool};
use std::collections::HashSet;
use thiserror::Error;

/// The reason a transaction can't be applied to the UTXO pool.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ValidationError {
    #[error("Input spends an output that is not in the UTXO pool: {0}")]
    MissingInput(Utxo),

    #[error("Signature of input: {index} doesn't match the owner of the spent output")]
    InvalidSignature { index: usize },

    #[error("Output: {0} is claimed more than once")]
    DuplicateInput(Utxo),

    #[error("Output: {index} has a negative amount: {amount}")]
    NegativeOutput { index: usize, amount: Amount },

    #[error("Insufficient input value: inputs={inputs}, outputs={outputs}")]
    InsufficientInput { inputs: Amount, outputs: Amount },

    #[error("Arithmetic overflow")]
    Overflow,
}

// Responsible for checking whether a transaction may be applied to the UTXO pool.
// The pool is never modified.
pub struct TransactionValidator {}

impl TransactionValidator {
    /// Returns the fee, i.e. the amount by which the inputs exceed the outputs, if:
    ///   - every input spends an output from the pool,
    ///   - every input is signed by the owner of the output it spends,
    ///   - no output is spent more than once,
    ///   - no output has a negative amount,
    ///   - the inputs are worth at least as much as the outputs.
    pub fn validate(transaction: &Transaction, pool: &UtxoPool) -> Result<Amount, ValidationError> {
        let inputs = Self::validate_inputs(transaction, pool)?;
        let outputs = Self::validate_outputs(transaction.outputs())?;
        if outputs > inputs {
            return Err(ValidationError::InsufficientInput { inputs, outputs });
        }
        Ok(inputs - outputs)
    }

    pub fn is_valid(transaction: &Transaction, pool: &UtxoPool) -> bool {
        Self::validate(transaction, pool).is_ok()
    }

    /// Returns the total value of the spent outputs.
    fn validate_inputs(transaction: &Transaction, pool: &UtxoPool) -> Result<Amount, ValidationError> {
        let mut seen_utxos = HashSet::new();
        let mut total: Amount = 0;
        for (index, input) in transaction.inputs().iter().enumerate() {
            let spent_output = pool
                .get(input.utxo())
                .ok_or(ValidationError::MissingInput(*input.utxo()))?;
            if !seen_utxos.insert(input.utxo()) {
                return Err(ValidationError::DuplicateInput(*input.utxo()));
            }
            if !Self::is_signed_by_owner(transaction, index, spent_output) {
                return Err(ValidationError::InvalidSignature { index });
            }
            total = total
                .checked_add(spent_output.amount())
                .ok_or(ValidationError::Overflow)?;
        }
        Ok(total)
    }

    /// Returns the total value of the outputs.
    fn validate_outputs(outputs: &[TransactionOutput]) -> Result<Amount, ValidationError> {
        let mut total: Amount = 0;
        for (index, output) in outputs.iter().enumerate() {
            if output.amount() < 0 {
                return Err(ValidationError::NegativeOutput {
                    index,
                    amount: output.amount(),
                });
            }
            total = total
                .checked_add(output.amount())
                .ok_or(ValidationError::Overflow)?;
        }
        Ok(total)
    }

    fn is_signed_by_owner(
        transaction: &Transaction,
        index: usize,
        spent_output: &TransactionOutput,
    ) -> bool {
        let signature = match transaction.inputs()[index].signature() {
            Some(signature) => signature,
            None => return false,
        };
        match transaction.raw_data_to_sign(index) {
            Ok(data) => spent_output.owner().verify(&data, signature),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{address, genesis_pool, genesis_utxo, signing_key, transfer};
    use crate::{TransactionBuilder, TransactionOutput};

    #[test]
    fn valid_transaction_returns_fee() {
        let pool = genesis_pool(&[(10, 1), (5, 2)]);
        let transaction = transfer(
            &[(genesis_utxo(0), 1), (genesis_utxo(1), 2)],
            &[(6, 3), (4, 4)],
        );
        assert_eq!(TransactionValidator::validate(&transaction, &pool), Ok(5));
        assert!(TransactionValidator::is_valid(&transaction, &pool));
    }

    #[test]
    fn outputs_equal_to_inputs_are_valid() {
        let pool = genesis_pool(&[(10, 1)]);
        let transaction = transfer(&[(genesis_utxo(0), 1)], &[(6, 2), (4, 3)]);
        assert_eq!(TransactionValidator::validate(&transaction, &pool), Ok(0));
    }

    #[test]
    fn missing_input() {
        let pool = genesis_pool(&[(10, 1)]);
        let transaction = transfer(&[(genesis_utxo(1), 1)], &[(1, 2)]);
        assert_eq!(
            TransactionValidator::validate(&transaction, &pool),
            Err(ValidationError::MissingInput(genesis_utxo(1)))
        );
    }

    #[test]
    fn signature_by_someone_else() {
        let pool = genesis_pool(&[(10, 1)]);
        let transaction = transfer(&[(genesis_utxo(0), 2)], &[(1, 2)]);
        assert_eq!(
            TransactionValidator::validate(&transaction, &pool),
            Err(ValidationError::InvalidSignature { index: 0 })
        );
    }

    #[test]
    fn missing_or_malformed_signature() {
        let pool = genesis_pool(&[(10, 1)]);
        let unsigned = TransactionBuilder::new()
            .add_input(genesis_utxo(0))
            .add_output(1, address(2));
        let malformed = unsigned
            .clone()
            .add_signature(0, vec![0xde, 0xad])
            .unwrap()
            .build()
            .unwrap();
        assert!(!TransactionValidator::is_valid(&unsigned.build().unwrap(), &pool));
        assert_eq!(
            TransactionValidator::validate(&malformed, &pool),
            Err(ValidationError::InvalidSignature { index: 0 })
        );
    }

    #[test]
    fn signature_over_different_outputs() {
        let pool = genesis_pool(&[(10, 1)]);
        let signed_for_other_outputs = TransactionBuilder::new()
            .add_input(genesis_utxo(0))
            .add_output(1, address(2))
            .raw_data_to_sign(0)
            .unwrap();
        let signature: k256::ecdsa::Signature =
            k256::ecdsa::signature::Signer::sign(&signing_key(1), &signed_for_other_outputs);
        let transaction = TransactionBuilder::new()
            .add_input(genesis_utxo(0))
            .add_output(9, address(2))
            .add_signature(0, signature.to_der().as_bytes().to_vec())
            .unwrap()
            .build()
            .unwrap();
        assert!(!TransactionValidator::is_valid(&transaction, &pool));
    }

    #[test]
    fn duplicate_input() {
        let pool = genesis_pool(&[(10, 1)]);
        let transaction = transfer(&[(genesis_utxo(0), 1), (genesis_utxo(0), 1)], &[(1, 2)]);
        assert_eq!(
            TransactionValidator::validate(&transaction, &pool),
            Err(ValidationError::DuplicateInput(genesis_utxo(0)))
        );
    }

    #[test]
    fn negative_output() {
        let pool = genesis_pool(&[(10, 1)]);
        let transaction = transfer(&[(genesis_utxo(0), 1)], &[(12, 2), (-2, 3)]);
        assert_eq!(
            TransactionValidator::validate(&transaction, &pool),
            Err(ValidationError::NegativeOutput {
                index: 1,
                amount: -2
            })
        );
    }

    #[test]
    fn outputs_exceed_inputs() {
        let pool = genesis_pool(&[(10, 1)]);
        let transaction = transfer(&[(genesis_utxo(0), 1)], &[(6, 2), (5, 3)]);
        assert_eq!(
            TransactionValidator::validate(&transaction, &pool),
            Err(ValidationError::InsufficientInput {
                inputs: 10,
                outputs: 11
            })
        );
    }

    #[test]
    fn output_sum_overflow() {
        let pool = genesis_pool(&[(10, 1)]);
        let transaction = transfer(&[(genesis_utxo(0), 1)], &[(Amount::MAX, 2), (1, 3)]);
        assert_eq!(
            TransactionValidator::validate(&transaction, &pool),
            Err(ValidationError::Overflow)
        );
    }

    #[test]
    fn validation_does_not_modify_pool() {
        let pool = genesis_pool(&[(10, 1)]);
        let before = pool.clone();
        let transaction = transfer(&[(genesis_utxo(0), 1)], &[(10, 2)]);
        assert!(TransactionValidator::is_valid(&transaction, &pool));
        assert_eq!(pool, before);
        assert_eq!(
            pool.get(&genesis_utxo(0)),
            Some(&TransactionOutput::new(10, address(1)))
        );
    }

    #[test]
    fn empty_transaction_is_valid() {
        let pool = UtxoPool::new();
        let transaction = TransactionBuilder::new().build().unwrap();
        assert_eq!(TransactionValidator::validate(&transaction, &pool), Ok(0));
    }
}
