use crate::{Address, Sha256};
use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

/// The amount of coins held by a transaction output.
/// It's signed so that malformed transactions with negative outputs can be represented and
/// rejected by validation.
pub type Amount = i64;

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output, the first one is 0.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Identifies a transaction output by the transaction that created it and its position in that
/// transaction.
#[derive(Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize)]
pub struct Utxo {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

impl Utxo {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> OutputIndex {
        self.output_index
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    // A pointer to the unspent output this input consumes.
    utxo: Utxo,
    // DER-encoded ECDSA signature over `Transaction::raw_data_to_sign` for this input's index.
    signature: Option<Vec<u8>>,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utxo)
    }
}

impl TransactionInput {
    pub fn new(utxo: Utxo) -> Self {
        Self {
            utxo,
            signature: None,
        }
    }

    pub fn utxo(&self) -> &Utxo {
        &self.utxo
    }

    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Amount,
    owner: Address,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.owner)
    }
}

impl TransactionOutput {
    pub fn new(amount: Amount, owner: Address) -> Self {
        Self { amount, owner }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }
}

/// The data that the owner of the spent output signs for a single input.
/// Signatures are left out, so that no signature covers another signature.
#[derive(Serialize)]
struct SignableData<'a> {
    utxo: &'a Utxo,
    outputs: &'a [TransactionOutput],
}

fn raw_data_to_sign(
    inputs: &[TransactionInput],
    outputs: &[TransactionOutput],
    index: usize,
) -> Result<Vec<u8>, String> {
    let input = inputs.get(index).ok_or_else(|| {
        format!(
            "Input index: {} is out of range, the transaction has {} inputs.",
            index,
            inputs.len()
        )
    })?;
    bincode::serialize(&SignableData {
        utxo: input.utxo(),
        outputs,
    })
    .map_err(|e| e.to_string())
}

/// An immutable transaction.
/// Its ID covers every input (including its signature) and every output, so two transactions
/// are equal if and only if their IDs are equal.
/// The ID is not part of the serialized form; it's recomputed from the content when the
/// transaction is deserialized.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawTransaction", try_from = "RawTransaction")]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, String> {
        Self::validate_output_count(outputs.len())?;
        let id = Self::hash_transaction_data(&inputs, &outputs)?;
        Ok(Self {
            id,
            inputs,
            outputs,
        })
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    /// Returns the bytes that the input at `index` must sign: the output it spends and all of
    /// the transaction's outputs.
    pub fn raw_data_to_sign(&self, index: usize) -> Result<Vec<u8>, String> {
        raw_data_to_sign(&self.inputs, &self.outputs, index)
    }

    /// Every output must be addressable by an `OutputIndex`.
    fn validate_output_count(count: usize) -> Result<(), String> {
        if count > u32::MAX as usize {
            Err(format!(
                "Transaction has {} outputs, but at most {} are allowed.",
                count,
                u32::MAX
            ))
        } else {
            Ok(())
        }
    }

    fn hash_transaction_data(
        inputs: &Vec<TransactionInput>,
        outputs: &Vec<TransactionOutput>,
    ) -> Result<TransactionId, String> {
        let data = bincode::serialize(&(inputs, outputs)).map_err(|e| e.to_string())?;
        Ok(TransactionId(Sha256::double_digest(&data)))
    }
}

/// The serialized form of a transaction.
#[derive(Serialize, Deserialize)]
struct RawTransaction {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl From<Transaction> for RawTransaction {
    fn from(transaction: Transaction) -> Self {
        Self {
            inputs: transaction.inputs,
            outputs: transaction.outputs,
        }
    }
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = String;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        Transaction::new(raw.inputs, raw.outputs)
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] => [{}]",
            self.id,
            self.inputs
                .iter()
                .map(TransactionInput::to_string)
                .collect::<Vec<String>>()
                .join(", "),
            self.outputs
                .iter()
                .map(TransactionOutput::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

/// Assembles a transaction, collects the signatures for its inputs and freezes it.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(mut self, utxo: Utxo) -> Self {
        self.inputs.push(TransactionInput::new(utxo));
        self
    }

    pub fn add_output(mut self, amount: Amount, owner: Address) -> Self {
        self.outputs.push(TransactionOutput::new(amount, owner));
        self
    }

    pub fn raw_data_to_sign(&self, index: usize) -> Result<Vec<u8>, String> {
        raw_data_to_sign(&self.inputs, &self.outputs, index)
    }

    /// Attaches an externally produced signature to the input at `index`.
    pub fn add_signature(mut self, index: usize, signature: Vec<u8>) -> Result<Self, String> {
        let input_count = self.inputs.len();
        let input = self.inputs.get_mut(index).ok_or_else(|| {
            format!(
                "Input index: {} is out of range, the transaction has {} inputs.",
                index, input_count
            )
        })?;
        input.signature = Some(signature);
        Ok(self)
    }

    /// Signs the input at `index` with the given key.
    /// Outputs must be added before signing, since they are covered by the signature.
    pub fn sign_input(self, index: usize, key: &SigningKey) -> Result<Self, String> {
        let data = self.raw_data_to_sign(index)?;
        let signature: Signature = key.sign(&data);
        self.add_signature(index, signature.to_der().as_bytes().to_vec())
    }

    pub fn build(self) -> Result<Transaction, String> {
        Transaction::new(self.inputs, self.outputs)
    }
}
