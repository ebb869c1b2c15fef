use k256::ecdsa::signature::Verifier;
use k256::ecdsa::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The identity that owns a transaction output.
/// It holds the SEC1-encoded (compressed) secp256k1 public key of the owner.
#[derive(Debug, Clone, Hash, Serialize, Deserialize, Eq, PartialEq)]
pub struct Address(Vec<u8>);

impl Address {
    pub fn new(sec1_bytes: Vec<u8>) -> Self {
        Self(sec1_bytes)
    }

    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_encoded_point(true).as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Checks that `signature` is a DER-encoded ECDSA signature of `message` made by the owner
    /// of this address.
    /// Undecodable keys and signatures are reported as a failed verification.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let key = match VerifyingKey::from_sec1_bytes(&self.0) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let signature = match Signature::from_der(signature) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        key.verify(message, &signature).is_ok()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}
