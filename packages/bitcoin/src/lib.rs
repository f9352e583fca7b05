pub use bitcoin::{
    consensus::encode::Error as EncodeError,
    consensus::{deserialize, serialize},
    ScriptBuf, Transaction, Txid,
};

pub mod error;
pub mod op_return;

pub type Result<T> = std::result::Result<T, error::Error>;

/// parse_transaction decodes a consensus-serialized BTC transaction
pub fn parse_transaction(raw_tx: &[u8]) -> Result<Transaction> {
    deserialize(raw_tx).map_err(|e| error::Error::TxDecodeError(e.to_string()))
}
