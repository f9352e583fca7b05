use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidFieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Data with {0} bytes is neither a first nor a second checkpoint part")]
    InvalidDataLength(usize),
    #[error("Data does not have the expected tag, expected: {expected:?}, got: {actual:?}")]
    TagMismatch { expected: [u8; 4], actual: [u8; 4] },
    #[error("Data has format version {actual}, expected {expected}")]
    VersionMismatch { expected: u8, actual: u8 },
    #[error("Format version {0} is not supported")]
    UnsupportedVersion(u8),
    #[error("Checkpoint parts belong to different epochs: {first} and {second}")]
    UnmatchingEpoch { first: u64, second: u64 },
    #[error("Checkpoint parts do not connect: expected one first and one second part")]
    UnmatchingParts,
}

impl CodecError {
    /// is_decoding_mismatch tells whether the error only means the scanned bytes
    /// are not checkpoint data at all. Scanners can skip such data silently.
    pub fn is_decoding_mismatch(&self) -> bool {
        matches!(
            self,
            CodecError::InvalidDataLength(_)
                | CodecError::TagMismatch { .. }
                | CodecError::VersionMismatch { .. }
        )
    }
}
