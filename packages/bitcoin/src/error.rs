use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Failed to decode BTC tx: {0}")]
    TxDecodeError(String),
    #[error("No OP_RETURN data in this BTC tx")]
    NoOpReturnData,
    #[error("OP_RETURN data is too large: {0} bytes")]
    OpReturnTooLarge(usize),
}
