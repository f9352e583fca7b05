use bitcoin::blockdata::opcodes;
use bitcoin::blockdata::script::{Builder, Instruction, PushBytesBuf, Script};
use bitcoin::{ScriptBuf, Transaction};

use crate::error::Error;
use crate::Result;

/// Largest data push a standard OP_RETURN output relays
pub const MAX_OP_RETURN_DATA_LEN: usize = 80;

/// op_return_data returns the data pushed right after OP_RETURN in the given
/// script, or None if the script is not a well-formed data carrier
fn op_return_data(script: &Script) -> Option<Vec<u8>> {
    let mut instructions = script.instructions();
    match instructions.next()? {
        Ok(Instruction::Op(op)) if op == opcodes::all::OP_RETURN => {}
        _ => return None,
    }
    match instructions.next()? {
        Ok(Instruction::PushBytes(data)) => Some(data.as_bytes().to_vec()),
        _ => None,
    }
}

/// extract_op_return_data returns the data of the first OP_RETURN output of the tx
pub fn extract_op_return_data(tx: &Transaction) -> Result<Vec<u8>> {
    tx.output
        .iter()
        .filter(|output| output.script_pubkey.is_op_return())
        .find_map(|output| op_return_data(&output.script_pubkey))
        .ok_or(Error::NoOpReturnData)
}

/// build_op_return_script builds an OP_RETURN output script carrying the given data
pub fn build_op_return_script(data: &[u8]) -> Result<ScriptBuf> {
    if data.len() > MAX_OP_RETURN_DATA_LEN {
        return Err(Error::OpReturnTooLarge(data.len()));
    }
    let push_bytes =
        PushBytesBuf::try_from(data.to_vec()).map_err(|_| Error::OpReturnTooLarge(data.len()))?;

    Ok(Builder::new()
        .push_opcode(opcodes::all::OP_RETURN)
        .push_slice(push_bytes)
        .into_script())
}
