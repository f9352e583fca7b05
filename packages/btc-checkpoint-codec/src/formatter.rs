use crate::error::CodecError;
use crate::{
    Result, ADDRESS_LEN, APPLICATION_DATA_LEN, BITMAP_LEN, BLS_SIG_LEN, CURRENT_VERSION,
    EPOCH_LEN, FIRST_PART_DATA_LEN, FIRST_PART_LEN, HEADER_LEN, LAST_COMMIT_HASH_LEN,
    SECOND_PART_DATA_LEN, SECOND_PART_LEN, TAG_LEN,
};

/// BabylonTag identifies the chain / network that issued a checkpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BabylonTag([u8; TAG_LEN]);

pub const MAIN_TAG: BabylonTag = BabylonTag(*b"bbn0");
pub const TEST_TAG: BabylonTag = BabylonTag(*b"bbt0");

impl BabylonTag {
    pub const fn new(bytes: [u8; TAG_LEN]) -> Self {
        BabylonTag(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for BabylonTag {
    type Error = CodecError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let tag: [u8; TAG_LEN] = bytes
            .try_into()
            .map_err(|_| CodecError::InvalidFieldLength {
                field: "tag",
                expected: TAG_LEN,
                actual: bytes.len(),
            })?;
        Ok(BabylonTag(tag))
    }
}

/// PartIndex is the position of a part within the application data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartIndex {
    First = 0,
    Second = 1,
}

impl PartIndex {
    fn from_part_len(len: usize) -> Option<Self> {
        match len {
            FIRST_PART_LEN => Some(PartIndex::First),
            SECOND_PART_LEN => Some(PartIndex::Second),
            _ => None,
        }
    }
}

/// CheckpointPart is one decoded half of an encoded checkpoint.
/// It can only be obtained from `is_babylon_checkpoint_data`, so its payload
/// always has the length its index calls for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckpointPart {
    index: PartIndex,
    version: u8,
    epoch: u64,
    data: Vec<u8>,
}

impl CheckpointPart {
    pub fn index(&self) -> PartIndex {
        self.index
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// data is the slice of application data carried by this part
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

fn check_field_len(field: &'static str, data: &[u8], expected: usize) -> Result<()> {
    if data.len() != expected {
        return Err(CodecError::InvalidFieldLength {
            field,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

fn encode_part(tag: &BabylonTag, version: u8, epoch: u64, data: &[u8]) -> Vec<u8> {
    let mut part = Vec::with_capacity(HEADER_LEN + data.len());
    part.extend_from_slice(tag.as_bytes());
    part.push(version);
    part.extend_from_slice(&epoch.to_be_bytes());
    part.extend_from_slice(data);
    part
}

/// encode_checkpoint_data encodes a checkpoint into two parts of exactly
/// `FIRST_PART_LEN` and `SECOND_PART_LEN` bytes.
/// The application data is `last_commit_hash | bitmap | bls_sig | address`.
#[allow(clippy::too_many_arguments)]
pub fn encode_checkpoint_data(
    tag: &BabylonTag,
    version: u8,
    epoch: u64,
    last_commit_hash: &[u8],
    bitmap: &[u8],
    bls_sig: &[u8],
    address: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)> {
    if version > CURRENT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    check_field_len("last commit hash", last_commit_hash, LAST_COMMIT_HASH_LEN)?;
    check_field_len("bitmap", bitmap, BITMAP_LEN)?;
    check_field_len("BLS signature", bls_sig, BLS_SIG_LEN)?;
    check_field_len("address", address, ADDRESS_LEN)?;

    let mut app_data = Vec::with_capacity(APPLICATION_DATA_LEN);
    app_data.extend_from_slice(last_commit_hash);
    app_data.extend_from_slice(bitmap);
    app_data.extend_from_slice(bls_sig);
    app_data.extend_from_slice(address);

    let (first, second) = app_data.split_at(FIRST_PART_DATA_LEN);
    Ok((
        encode_part(tag, version, epoch, first),
        encode_part(tag, version, epoch, second),
    ))
}

/// is_babylon_checkpoint_data decodes a part of an encoded checkpoint, if the
/// given bytes are one. It accepts arbitrary input and never panics.
pub fn is_babylon_checkpoint_data(
    expected_tag: &BabylonTag,
    expected_version: u8,
    data: &[u8],
) -> Result<CheckpointPart> {
    let index =
        PartIndex::from_part_len(data.len()).ok_or(CodecError::InvalidDataLength(data.len()))?;

    // both part lengths exceed the header, so the splits below are in bounds
    let (tag, rest) = data.split_at(TAG_LEN);
    let (version, rest) = rest.split_at(1);
    let (epoch, payload) = rest.split_at(EPOCH_LEN);

    if tag != expected_tag.as_bytes() {
        let mut actual = [0u8; TAG_LEN];
        actual.copy_from_slice(tag);
        return Err(CodecError::TagMismatch {
            expected: *expected_tag.as_bytes(),
            actual,
        });
    }
    if version[0] != expected_version {
        return Err(CodecError::VersionMismatch {
            expected: expected_version,
            actual: version[0],
        });
    }

    let mut epoch_bytes = [0u8; EPOCH_LEN];
    epoch_bytes.copy_from_slice(epoch);

    Ok(CheckpointPart {
        index,
        version: version[0],
        epoch: u64::from_be_bytes(epoch_bytes),
        data: payload.to_vec(),
    })
}

/// connect_parts joins two decoded parts back into the application data.
/// The parts can be given in either order.
pub fn connect_parts(
    expected_version: u8,
    a: &CheckpointPart,
    b: &CheckpointPart,
) -> Result<Vec<u8>> {
    if expected_version > CURRENT_VERSION {
        return Err(CodecError::UnsupportedVersion(expected_version));
    }
    for part in [a, b] {
        if part.version != expected_version {
            return Err(CodecError::VersionMismatch {
                expected: expected_version,
                actual: part.version,
            });
        }
    }
    if a.epoch != b.epoch {
        return Err(CodecError::UnmatchingEpoch {
            first: a.epoch,
            second: b.epoch,
        });
    }

    let (first, second) = match (a.index, b.index) {
        (PartIndex::First, PartIndex::Second) => (a, b),
        (PartIndex::Second, PartIndex::First) => (b, a),
        _ => return Err(CodecError::UnmatchingParts),
    };
    if first.data.len() != FIRST_PART_DATA_LEN || second.data.len() != SECOND_PART_DATA_LEN {
        return Err(CodecError::UnmatchingParts);
    }

    let mut app_data = Vec::with_capacity(APPLICATION_DATA_LEN);
    app_data.extend_from_slice(&first.data);
    app_data.extend_from_slice(&second.data);
    Ok(app_data)
}
