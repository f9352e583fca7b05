use crate::types::{CheckpointStatus, RawCheckpoint, RawCheckpointWithMeta};

/// A status change of a raw checkpoint
#[derive(Clone, Debug, PartialEq)]
pub struct CheckpointStatusEvent {
    pub epoch: u64,
    /// None when the checkpoint was just created
    pub old_status: Option<CheckpointStatus>,
    /// `Forgotten` for a reorg, even though the record is stored as `Sealed`
    pub new_status: CheckpointStatus,
    /// The record right after the change
    pub checkpoint: RawCheckpointWithMeta,
}

impl CheckpointStatusEvent {
    pub fn event_type(&self) -> &'static str {
        match (self.old_status, self.new_status) {
            (None, _) => "checkpoint_accumulating",
            (_, CheckpointStatus::Accumulating) => "checkpoint_accumulating",
            (_, CheckpointStatus::Sealed) => "checkpoint_sealed",
            (_, CheckpointStatus::Submitted) => "checkpoint_submitted",
            (_, CheckpointStatus::Confirmed) => "checkpoint_confirmed",
            (_, CheckpointStatus::Finalized) => "checkpoint_finalized",
            (_, CheckpointStatus::Forgotten) => "checkpoint_forgotten",
        }
    }
}

/// CheckpointingHooks lets other modules react to checkpoint lifecycle changes.
///
/// Hook failures are logged by the keeper and never undo the change that
/// triggered them.
pub trait CheckpointingHooks {
    fn after_status_change(&self, event: &CheckpointStatusEvent) -> Result<(), String>;

    /// after_conflicting_checkpoint runs when a valid checkpoint recovered from
    /// BTC contradicts the local one
    fn after_conflicting_checkpoint(
        &self,
        _local: &RawCheckpointWithMeta,
        _recovered: &RawCheckpoint,
    ) -> Result<(), String> {
        Ok(())
    }
}
