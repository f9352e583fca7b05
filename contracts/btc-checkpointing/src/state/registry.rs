use cosmwasm_std::{Binary, Storage};
use cw_storage_plus::Map;

use babylon_checkpointing::bls::{self, BlsPublicKey};
use babylon_checkpointing::CheckpointingError;

/// Map of compressed BLS public keys by validator address
pub(crate) const BLS_KEYS: Map<&str, Binary> = Map::new("bls_keys");

/// register_bls_key stores the BLS key of a validator after checking its
/// proof of possession. A validator registers one key, once.
pub fn register_bls_key(
    storage: &mut dyn Storage,
    addr: &str,
    pub_key: &Binary,
    pop: &Binary,
) -> Result<(), CheckpointingError> {
    if BLS_KEYS.has(storage, addr) {
        return Err(CheckpointingError::BlsKeyAlreadyExist(addr.to_string()));
    }
    let pk = bls::decode_pub_key(pub_key)?;
    if !bls::verify_possession(&pk, pop) {
        return Err(CheckpointingError::InvalidProofOfPossession(
            addr.to_string(),
        ));
    }
    BLS_KEYS.save(storage, addr, pub_key)?;
    Ok(())
}

pub fn load_pub_key(storage: &dyn Storage, addr: &str) -> Result<BlsPublicKey, CheckpointingError> {
    let pk_bytes = BLS_KEYS
        .may_load(storage, addr)?
        .ok_or_else(|| CheckpointingError::BlsKeyDoesNotExist(addr.to_string()))?;
    bls::decode_pub_key(&pk_bytes)
}
