use cosmwasm_schema::cw_serde;
use cw_controllers::Admin;
use cw_storage_plus::Item;

use btc_checkpoint_codec::BabylonTag;

pub const ADMIN: Admin = Admin::new("admin");
pub(crate) const CONFIG: Item<Config> = Item::new("config");
/// Epoch of the first conflicting checkpoint found on BTC. Once set, the
/// contract stops accepting state changes.
pub(crate) const CONFLICT: Item<u64> = Item::new("conflict");

#[cw_serde]
pub struct Config {
    pub babylon_tag: Vec<u8>,
    /// Confirmations after which a submitted checkpoint is confirmed (`k`)
    pub btc_confirmation_depth: u32,
    /// Confirmations after which a confirmed checkpoint is final (`w`)
    pub checkpoint_finalization_timeout: u32,
}

impl Config {
    pub fn tag(&self) -> Result<BabylonTag, btc_checkpoint_codec::CodecError> {
        BabylonTag::try_from(self.babylon_tag.as_slice())
    }
}
