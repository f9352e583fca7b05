//! Checkpointing of Babylon epochs: validators BLS-sign the last block of
//! every epoch, signatures are aggregated until more than a third of the
//! voting power signed, and the sealed checkpoint follows its BTC submission
//! until it is deep enough to be final.
pub mod accumulator;
pub mod bls;
pub mod btc;
pub mod error;
pub mod hooks;
pub mod host;
pub mod keeper;
pub mod signer;
pub mod types;

pub use accumulator::has_quorum;
pub use error::CheckpointingError;
pub use hooks::{CheckpointStatusEvent, CheckpointingHooks};
pub use host::{CheckpointStore, CheckpointingHost, PubKeyRegistry, ValidatorSetProvider};
pub use keeper::Keeper;
pub use signer::{BlsSigner, LocalBlsSigner};
pub use types::{
    signed_msg, CheckpointStatus, MsgAddBlsSig, RawCheckpoint, RawCheckpointWithMeta, Validator,
    ValidatorSet,
};
