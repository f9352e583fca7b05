//! BLS12-381 in the minimal-signature-size variant: signatures live in G1 and
//! public keys in G2. Checkpoint signatures and proofs of possession use
//! different domain separation tags, so a proof can never pass as a vote.
use blst::min_sig::{AggregateSignature, PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;

use btc_checkpoint_codec::BLS_SIG_LEN;

use crate::error::CheckpointingError;

pub type BlsPublicKey = PublicKey;
pub type BlsSignature = Signature;
pub type BlsSecretKey = SecretKey;

pub const BLS_PUB_KEY_LEN: usize = 96;

// Domain Separation Tag for signatures on G1 (minimal-signature-size)
pub const BLS_SIG_DST: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";
// Domain Separation Tag for proofs of possession
pub const BLS_POP_DST: &[u8] = b"BLS_POP_BLS12381G1_XMD:SHA-256_SSWU_RO_POP_";

/// gen_secret_key derives a secret key from at least 32 bytes of key material
pub fn gen_secret_key(ikm: &[u8]) -> Result<BlsSecretKey, CheckpointingError> {
    SecretKey::key_gen(ikm, &[])
        .map_err(|e| CheckpointingError::InvalidBlsKey(format!("key generation failed: {e:?}")))
}

/// decode_pub_key decodes a compressed public key, rejecting points outside
/// the prime-order subgroup and the identity
pub fn decode_pub_key(bytes: &[u8]) -> Result<BlsPublicKey, CheckpointingError> {
    if bytes.len() != BLS_PUB_KEY_LEN {
        return Err(CheckpointingError::InvalidBlsKey(format!(
            "expected {BLS_PUB_KEY_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    PublicKey::key_validate(bytes)
        .map_err(|e| CheckpointingError::InvalidBlsKey(format!("{e:?}")))
}

/// decode_signature decodes a compressed signature
pub fn decode_signature(bytes: &[u8]) -> Result<BlsSignature, String> {
    if bytes.len() != BLS_SIG_LEN {
        return Err(format!(
            "expected {BLS_SIG_LEN} signature bytes, got {}",
            bytes.len()
        ));
    }
    Signature::from_bytes(bytes).map_err(|e| format!("failed to decode signature: {e:?}"))
}

pub fn sign(sk: &BlsSecretKey, msg: &[u8]) -> BlsSignature {
    sk.sign(msg, BLS_SIG_DST, &[])
}

/// verify checks a single signature over msg
pub fn verify(sig_bytes: &[u8], pk: &BlsPublicKey, msg: &[u8]) -> bool {
    match decode_signature(sig_bytes) {
        Ok(sig) => sig.verify(true, msg, BLS_SIG_DST, &[], pk, false) == BLST_ERROR::BLST_SUCCESS,
        Err(_) => false,
    }
}

/// aggregate adds a signature into an existing aggregate and returns the
/// compressed result
pub fn aggregate(agg_bytes: &[u8], sig_bytes: &[u8]) -> Result<[u8; BLS_SIG_LEN], String> {
    let agg = decode_signature(agg_bytes)?;
    let sig = decode_signature(sig_bytes)?;

    let mut agg = AggregateSignature::from_signature(&agg);
    agg.add_signature(&sig, true)
        .map_err(|e| format!("failed to aggregate signatures: {e:?}"))?;
    Ok(agg.to_signature().compress())
}

/// verify_multisig checks an aggregate signature of the given signers over msg
pub fn verify_multisig(
    sig_bytes: &[u8],
    pks: &[BlsPublicKey],
    msg: &[u8],
) -> Result<(), String> {
    if pks.is_empty() {
        return Err("no signers to verify against".to_string());
    }
    let sig = decode_signature(sig_bytes)?;
    let pk_refs: Vec<&PublicKey> = pks.iter().collect();

    let res = sig.fast_aggregate_verify(true, msg, BLS_SIG_DST, &pk_refs);
    if res == BLST_ERROR::BLST_SUCCESS {
        return Ok(());
    }
    Err(format!(
        "failed to verify BLS multisignature with code {res:?}"
    ))
}

/// prove_possession signs the compressed public key of sk
pub fn prove_possession(sk: &BlsSecretKey) -> BlsSignature {
    sk.sign(&sk.sk_to_pk().compress(), BLS_POP_DST, &[])
}

pub fn verify_possession(pk: &BlsPublicKey, pop_bytes: &[u8]) -> bool {
    match decode_signature(pop_bytes) {
        Ok(pop) => {
            pop.verify(true, &pk.compress(), BLS_POP_DST, &[], pk, false)
                == BLST_ERROR::BLST_SUCCESS
        }
        Err(_) => false,
    }
}
