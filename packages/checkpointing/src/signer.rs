use std::fmt;

use crate::bls::{self, BlsPublicKey, BlsSecretKey, BlsSignature};
use crate::error::CheckpointingError;

/// BlsSigner holds a validator's BLS key and signs checkpoints on its behalf
pub trait BlsSigner {
    /// address is the validator address the signatures are attributed to
    fn address(&self) -> &str;

    fn bls_pub_key(&self) -> BlsPublicKey;

    fn sign_msg_with_bls(&self, msg: &[u8]) -> Result<BlsSignature, CheckpointingError>;
}

/// LocalBlsSigner keeps the secret key in memory
#[derive(Clone)]
pub struct LocalBlsSigner {
    address: String,
    sk: BlsSecretKey,
}

impl LocalBlsSigner {
    pub fn new(address: impl Into<String>, sk: BlsSecretKey) -> Self {
        LocalBlsSigner {
            address: address.into(),
            sk,
        }
    }

    /// from_seed derives the key from at least 32 bytes of key material
    pub fn from_seed(address: impl Into<String>, ikm: &[u8]) -> Result<Self, CheckpointingError> {
        Ok(Self::new(address, bls::gen_secret_key(ikm)?))
    }

    pub fn proof_of_possession(&self) -> BlsSignature {
        bls::prove_possession(&self.sk)
    }
}

impl fmt::Debug for LocalBlsSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBlsSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl BlsSigner for LocalBlsSigner {
    fn address(&self) -> &str {
        &self.address
    }

    fn bls_pub_key(&self) -> BlsPublicKey {
        self.sk.sk_to_pk()
    }

    fn sign_msg_with_bls(&self, msg: &[u8]) -> Result<BlsSignature, CheckpointingError> {
        Ok(bls::sign(&self.sk, msg))
    }
}
