mod suite;

use assert_matches::assert_matches;
use cw_multi_test::AppResponse;

use babylon_checkpointing::btc::encode_checkpoint;
use babylon_checkpointing::{CheckpointStatus, CheckpointingError};
use btc_checkpoint_codec::{BabylonTag, CURRENT_VERSION};
use suite::{Suite, SuiteBuilder};
use test_utils::{op_return_tx, random_last_commit_hash, signed_checkpoint};

use crate::error::ContractError;

const EPOCH: u64 = 1;
const SUBMITTER: [u8; 20] = [0x11; 20];

fn has_event(res: &AppResponse, ty: &str) -> bool {
    let ty = format!("wasm-{ty}");
    res.events.iter().any(|e| e.ty == ty)
}

/// Builds the checkpoint of the epoch and signs it with the given validators
fn sealed_suite(signers: &[usize]) -> (Suite, Vec<u8>) {
    let mut suite = SuiteBuilder::new().build();
    let owner = suite.owner.clone();
    suite.setup_epoch(EPOCH);

    let lch = random_last_commit_hash();
    suite.build_checkpoint(&owner, EPOCH, &lch).unwrap();
    for i in signers {
        suite.add_bls_sig(*i, EPOCH, &lch).unwrap();
    }
    (suite, lch)
}

fn submit_local_checkpoint(suite: &mut Suite, epoch: u64) -> AppResponse {
    let owner = suite.owner.clone();
    let encoded = suite.get_encoded_checkpoint(epoch, &SUBMITTER).unwrap();
    // parts may arrive in either order
    suite
        .submit_btc_checkpoint(
            &owner,
            op_return_tx(&encoded.second_part),
            op_return_tx(&encoded.first_part),
        )
        .unwrap()
}

#[test]
fn initialization() {
    let suite = SuiteBuilder::new().build();

    let config = suite.get_config();
    assert_eq!(config.babylon_tag, [1, 2, 3, 4]);
    assert_eq!(config.btc_confirmation_depth, 6);
    assert_eq!(config.checkpoint_finalization_timeout, 100);
    assert_eq!(suite.get_admin().admin, Some(suite.admin().to_string()));
    assert_eq!(suite.get_conflict(), None);
}

mod validator_set {
    use super::*;

    #[test]
    fn set_validator_set_works() {
        let mut suite = SuiteBuilder::new().build();
        let owner = suite.owner.clone();
        suite.set_validator_set(&owner, EPOCH).unwrap();

        let set = suite.get_validator_set(EPOCH);
        assert_eq!(set.len(), 4);
        assert_eq!(set.total_power(), 100);

        let err = suite.set_validator_set(&owner, EPOCH).unwrap_err();
        assert_eq!(
            ContractError::ValidatorSetAlreadyExists(EPOCH),
            err.downcast().unwrap()
        );
    }

    #[test]
    fn only_admin_sets_validator_set() {
        let mut suite = SuiteBuilder::new().build();
        let val = suite.validator_addr(0);
        let err = suite.set_validator_set(&val, EPOCH).unwrap_err();
        assert_eq!(ContractError::Unauthorized, err.downcast().unwrap());
    }

    #[test]
    fn register_bls_key_once() {
        let mut suite = SuiteBuilder::new().build();
        suite.register_bls_key(0).unwrap();
        assert_eq!(
            suite.get_bls_public_key(0),
            Some(suite.validators[0].pub_key_bytes())
        );
        assert_eq!(suite.get_bls_public_key(1), None);

        let err = suite.register_bls_key(0).unwrap_err();
        assert_eq!(
            ContractError::Checkpointing(CheckpointingError::BlsKeyAlreadyExist(
                suite.validators[0].addr().to_string()
            )),
            err.downcast().unwrap()
        );
    }
}

mod accumulation {
    use super::*;

    #[test]
    fn checkpoint_is_sealed_at_quorum() {
        let (mut suite, lch) = sealed_suite(&[]);
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Accumulating);

        // 10 + 20 = 30 is not more than a third of 100
        let res = suite.add_bls_sig(0, EPOCH, &lch).unwrap();
        assert!(!has_event(&res, "checkpoint_sealed"));
        suite.add_bls_sig(1, EPOCH, &lch).unwrap();
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Accumulating);

        let res = suite.add_bls_sig(2, EPOCH, &lch).unwrap();
        assert!(has_event(&res, "checkpoint_sealed"));
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Sealed);

        // late signatures are accepted but change nothing
        let before = suite.get_checkpoint(EPOCH);
        suite.add_bls_sig(3, EPOCH, &lch).unwrap();
        assert_eq!(suite.get_checkpoint(EPOCH), before);
    }

    #[test]
    fn build_checkpoint_requires_validator_set() {
        let mut suite = SuiteBuilder::new().build();
        let owner = suite.owner.clone();
        let err = suite
            .build_checkpoint(&owner, EPOCH, &random_last_commit_hash())
            .unwrap_err();
        assert_eq!(
            ContractError::Checkpointing(CheckpointingError::ValidatorSetNotFound(EPOCH)),
            err.downcast().unwrap()
        );
    }

    #[test]
    fn add_bls_sig_rejections() {
        let (mut suite, lch) = sealed_suite(&[0]);

        let err = suite.add_bls_sig(0, EPOCH, &lch).unwrap_err();
        assert_eq!(
            ContractError::Checkpointing(CheckpointingError::AlreadyVoted(
                suite.validators[0].addr().to_string()
            )),
            err.downcast().unwrap()
        );

        let err = suite
            .add_bls_sig(1, EPOCH, &random_last_commit_hash())
            .unwrap_err();
        assert_eq!(
            ContractError::Checkpointing(CheckpointingError::CkptHashNotEqual(EPOCH)),
            err.downcast().unwrap()
        );

        let err = suite.add_bls_sig(1, 2, &lch).unwrap_err();
        assert_eq!(
            ContractError::Checkpointing(CheckpointingError::CkptDoesNotExist(2)),
            err.downcast().unwrap()
        );
    }

    #[test]
    fn encoded_checkpoint_requires_seal() {
        let (suite, _) = sealed_suite(&[0]);
        suite.get_encoded_checkpoint(EPOCH, &SUBMITTER).unwrap_err();

        let (suite, _) = sealed_suite(&[0, 1, 2]);
        suite.get_encoded_checkpoint(EPOCH, &SUBMITTER).unwrap();
        // submitter must be 20 bytes
        suite.get_encoded_checkpoint(EPOCH, &[0x11; 32]).unwrap_err();
    }

    #[test]
    fn single_validator_seals_alone() {
        let mut suite = SuiteBuilder::new().with_powers(&[5]).build();
        let owner = suite.owner.clone();
        suite.setup_epoch(EPOCH);
        let lch = random_last_commit_hash();
        suite.build_checkpoint(&owner, EPOCH, &lch).unwrap();

        let res = suite.add_bls_sig(0, EPOCH, &lch).unwrap();
        assert!(has_event(&res, "checkpoint_sealed"));
    }
}

mod btc {
    use super::*;

    #[test]
    fn checkpoint_lifecycle_on_btc() {
        let (mut suite, _) = sealed_suite(&[2, 3]);
        let owner = suite.owner.clone();

        let res = submit_local_checkpoint(&mut suite, EPOCH);
        assert!(has_event(&res, "checkpoint_submitted"));
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Submitted);

        // not deep enough yet
        suite.report_btc_depth(&owner, EPOCH, 5).unwrap();
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Submitted);

        let res = suite.report_btc_depth(&owner, EPOCH, 6).unwrap();
        assert!(has_event(&res, "checkpoint_confirmed"));
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Confirmed);

        let res = suite.report_btc_depth(&owner, EPOCH, 100).unwrap();
        assert!(has_event(&res, "checkpoint_finalized"));
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Finalized);

        // deeper reports on a final checkpoint are no-ops
        suite.report_btc_depth(&owner, EPOCH, 200).unwrap();
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Finalized);
    }

    #[test]
    fn deep_report_confirms_and_finalizes_at_once() {
        let (mut suite, _) = sealed_suite(&[3]);
        let owner = suite.owner.clone();
        submit_local_checkpoint(&mut suite, EPOCH);

        let res = suite.report_btc_depth(&owner, EPOCH, 150).unwrap();
        assert!(has_event(&res, "checkpoint_confirmed"));
        assert!(has_event(&res, "checkpoint_finalized"));
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Finalized);
    }

    #[test]
    fn rollback_allows_resubmission() {
        let (mut suite, _) = sealed_suite(&[3]);
        let owner = suite.owner.clone();
        submit_local_checkpoint(&mut suite, EPOCH);

        let res = suite.report_btc_rollback(&owner, EPOCH).unwrap();
        assert!(has_event(&res, "checkpoint_forgotten"));
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Sealed);

        submit_local_checkpoint(&mut suite, EPOCH);
        suite.report_btc_depth(&owner, EPOCH, 6).unwrap();
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Confirmed);

        // confirmed checkpoints cannot be rolled back
        let err = suite.report_btc_rollback(&owner, EPOCH).unwrap_err();
        assert_matches!(
            err.downcast::<ContractError>().unwrap(),
            ContractError::Checkpointing(CheckpointingError::InvalidStatusTransition { .. })
        );
    }

    #[test]
    fn depth_of_unsubmitted_checkpoint_is_rejected() {
        let (mut suite, _) = sealed_suite(&[3]);
        let owner = suite.owner.clone();

        let err = suite.report_btc_depth(&owner, EPOCH, 10).unwrap_err();
        assert_eq!(
            ContractError::Checkpointing(CheckpointingError::InvalidStatusTransition {
                epoch: EPOCH,
                expected: CheckpointStatus::Submitted,
                actual: CheckpointStatus::Sealed,
            }),
            err.downcast().unwrap()
        );
    }

    #[test]
    fn only_admin_reports_btc() {
        let (mut suite, _) = sealed_suite(&[3]);
        let val = suite.validator_addr(0);
        let encoded = suite.get_encoded_checkpoint(EPOCH, &SUBMITTER).unwrap();

        let err = suite
            .submit_btc_checkpoint(
                &val,
                op_return_tx(&encoded.first_part),
                op_return_tx(&encoded.second_part),
            )
            .unwrap_err();
        assert_eq!(ContractError::Unauthorized, err.downcast().unwrap());

        let err = suite.report_btc_depth(&val, EPOCH, 6).unwrap_err();
        assert_eq!(ContractError::Unauthorized, err.downcast().unwrap());
    }

    #[test]
    fn insufficient_power_checkpoint_is_rejected() {
        let (mut suite, _) = sealed_suite(&[3]);
        let owner = suite.owner.clone();

        // signed by 10 out of 100, for another block
        let set = suite.get_validator_set(EPOCH);
        let weak = signed_checkpoint(
            &set,
            &[&suite.validators[0]],
            EPOCH,
            &random_last_commit_hash(),
        );
        let (first, second) =
            encode_checkpoint(&BabylonTag::new([1, 2, 3, 4]), CURRENT_VERSION, &weak, &SUBMITTER)
                .unwrap();

        let err = suite
            .submit_btc_checkpoint(&owner, op_return_tx(&first), op_return_tx(&second))
            .unwrap_err();
        assert_eq!(
            ContractError::Checkpointing(CheckpointingError::InsufficientVotingPower {
                power: 10,
                total: 100,
            }),
            err.downcast().unwrap()
        );
        assert_eq!(suite.get_conflict(), None);
    }

    #[test]
    fn conflicting_checkpoint_halts_contract() {
        let (mut suite, lch) = sealed_suite(&[3]);
        let owner = suite.owner.clone();

        // a quorum also signed another block of the same epoch
        let set = suite.get_validator_set(EPOCH);
        let conflicting = signed_checkpoint(
            &set,
            &[&suite.validators[1], &suite.validators[2]],
            EPOCH,
            &random_last_commit_hash(),
        );
        let (first, second) = encode_checkpoint(
            &BabylonTag::new([1, 2, 3, 4]),
            CURRENT_VERSION,
            &conflicting,
            &SUBMITTER,
        )
        .unwrap();

        let res = suite
            .submit_btc_checkpoint(&owner, op_return_tx(&first), op_return_tx(&second))
            .unwrap();
        assert!(has_event(&res, "conflicting_checkpoint"));
        assert_eq!(suite.get_conflict(), Some(EPOCH));
        // the local checkpoint is untouched
        assert_eq!(suite.get_status(EPOCH), CheckpointStatus::Sealed);

        let err = suite.add_bls_sig(0, EPOCH, &lch).unwrap_err();
        assert_eq!(ContractError::Halted(EPOCH), err.downcast().unwrap());
        let err = suite.set_validator_set(&owner, 2).unwrap_err();
        assert_eq!(ContractError::Halted(EPOCH), err.downcast().unwrap());
    }

    #[test]
    fn foreign_tag_is_rejected() {
        let (mut suite, _) = sealed_suite(&[3]);
        let owner = suite.owner.clone();
        let ckpt = suite.get_checkpoint(EPOCH).ckpt;
        let (first, second) =
            encode_checkpoint(&BabylonTag::new(*b"bbn0"), CURRENT_VERSION, &ckpt, &SUBMITTER)
                .unwrap();

        let err = suite
            .submit_btc_checkpoint(&owner, op_return_tx(&first), op_return_tx(&second))
            .unwrap_err();
        assert_matches!(
            err.downcast::<ContractError>().unwrap(),
            ContractError::Checkpointing(CheckpointingError::Codec(_))
        );
    }
}

mod admin {
    use super::*;

    #[test]
    fn update_admin_works() {
        let mut suite = SuiteBuilder::new().build();
        let owner = suite.owner.clone();
        let new_admin = suite.validator_addr(0);

        suite
            .update_admin(&owner, Some(new_admin.to_string()))
            .unwrap();
        assert_eq!(suite.get_admin().admin, Some(new_admin.to_string()));

        let err = suite.set_validator_set(&owner, EPOCH).unwrap_err();
        assert_eq!(ContractError::Unauthorized, err.downcast().unwrap());
        suite.set_validator_set(&new_admin, EPOCH).unwrap();
    }

    #[test]
    fn migrate_works() {
        let mut suite = SuiteBuilder::new().build();
        let admin = suite.admin().to_string();
        suite.migrate(&admin, cosmwasm_std::Empty {}).unwrap();
    }
}
