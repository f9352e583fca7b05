use cosmwasm_std::{Api, Event};

use babylon_checkpointing::{
    CheckpointStatusEvent, CheckpointingHooks, RawCheckpoint, RawCheckpointWithMeta,
};

/// ApiLogHooks reports checkpoint lifecycle changes to the host's debug log
pub(crate) struct ApiLogHooks<'a> {
    api: &'a dyn Api,
}

impl<'a> ApiLogHooks<'a> {
    pub fn new(api: &'a dyn Api) -> Self {
        ApiLogHooks { api }
    }
}

impl CheckpointingHooks for ApiLogHooks<'_> {
    fn after_status_change(&self, event: &CheckpointStatusEvent) -> Result<(), String> {
        let from = event
            .old_status
            .map(|status| status.as_str())
            .unwrap_or("none");
        self.api.debug(&format!(
            "checkpoint of epoch {}: {} -> {}",
            event.epoch, from, event.new_status
        ));
        Ok(())
    }

    fn after_conflicting_checkpoint(
        &self,
        local: &RawCheckpointWithMeta,
        recovered: &RawCheckpoint,
    ) -> Result<(), String> {
        self.api.debug(&format!(
            "CONFLICTING checkpoint of epoch {}: local {}, recovered {}",
            local.epoch(),
            hex::encode(&local.ckpt.last_commit_hash),
            hex::encode(&recovered.last_commit_hash)
        ));
        Ok(())
    }
}

/// status_event turns a lifecycle change into a wasm event
pub(crate) fn status_event(event: &CheckpointStatusEvent) -> Event {
    let mut wasm_event =
        Event::new(event.event_type()).add_attribute("epoch", event.epoch.to_string());
    if let Some(old_status) = event.old_status {
        wasm_event = wasm_event.add_attribute("old_status", old_status.as_str());
    }
    wasm_event
        .add_attribute("new_status", event.new_status.as_str())
        .add_attribute(
            "last_commit_hash",
            hex::encode(&event.checkpoint.ckpt.last_commit_hash),
        )
}
