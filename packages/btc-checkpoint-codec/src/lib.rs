//! btc-checkpoint-codec splits a Babylon checkpoint into two chunks, each small
//! enough for the OP_RETURN output of a Bitcoin transaction, and joins them back.
//!
//! Every chunk starts with the same header, `tag(4) | version(1) | epoch(8, BE)`,
//! followed by a slice of the application data. The two chunks have different
//! lengths, which is how a scanner tells them apart.
pub mod error;
mod formatter;

pub use error::CodecError;
pub use formatter::{
    connect_parts, encode_checkpoint_data, is_babylon_checkpoint_data, BabylonTag,
    CheckpointPart, PartIndex, MAIN_TAG, TEST_TAG,
};

pub type Result<T> = std::result::Result<T, CodecError>;

// header of every encoded part
pub const TAG_LEN: usize = 4;
pub const VERSION_LEN: usize = 1;
pub const EPOCH_LEN: usize = 8;
pub const HEADER_LEN: usize = TAG_LEN + VERSION_LEN + EPOCH_LEN;

pub const CURRENT_VERSION: u8 = 0;

// application data fields, in wire order
pub const LAST_COMMIT_HASH_LEN: usize = 32;
pub const BITMAP_LEN: usize = 13;
pub const BLS_SIG_LEN: usize = 48;
pub const ADDRESS_LEN: usize = 20;

pub const APPLICATION_DATA_LEN: usize =
    LAST_COMMIT_HASH_LEN + BITMAP_LEN + BLS_SIG_LEN + ADDRESS_LEN;

/// Offset at which the application data is split between the two parts
pub const FIRST_PART_DATA_LEN: usize = 65;
pub const SECOND_PART_DATA_LEN: usize = APPLICATION_DATA_LEN - FIRST_PART_DATA_LEN;

pub const FIRST_PART_LEN: usize = HEADER_LEN + FIRST_PART_DATA_LEN;
pub const SECOND_PART_LEN: usize = HEADER_LEN + SECOND_PART_DATA_LEN;

/// Largest payload a standard OP_RETURN output relays
pub const MAX_OP_RETURN_DATA_LEN: usize = 80;

const _: () = assert!(FIRST_PART_LEN <= MAX_OP_RETURN_DATA_LEN);
const _: () = assert!(SECOND_PART_LEN <= MAX_OP_RETURN_DATA_LEN);
const _: () = assert!(FIRST_PART_LEN != SECOND_PART_LEN);
