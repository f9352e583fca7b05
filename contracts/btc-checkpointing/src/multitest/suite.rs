use anyhow::Result as AnyResult;
use cosmwasm_std::{Addr, Binary, Empty};
use cw_controllers::AdminResponse;
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};
use derivative::Derivative;

use babylon_checkpointing::{CheckpointStatus, RawCheckpointWithMeta, Validator, ValidatorSet};
use test_utils::TestValidator;

use crate::msg::{EncodedCheckpointResponse, ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::state::config::Config;

fn contract_btc_checkpointing() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(crate::execute, crate::instantiate, crate::query)
        .with_migrate(crate::migrate);
    Box::new(contract)
}

#[derive(Derivative)]
#[derivative(Default = "new")]
pub struct SuiteBuilder {
    #[derivative(Default(value = "vec![10, 20, 30, 40]"))]
    powers: Vec<u64>,
    #[derivative(Default(value = "\"01020304\".to_owned()"))]
    babylon_tag: String,
    #[derivative(Default(value = "6"))]
    btc_confirmation_depth: u32,
    #[derivative(Default(value = "100"))]
    checkpoint_finalization_timeout: u32,
}

impl SuiteBuilder {
    /// Sets the voting powers of the validators
    pub fn with_powers(mut self, powers: &[u64]) -> Self {
        self.powers = powers.to_vec();
        self
    }

    #[track_caller]
    pub fn build(self) -> Suite {
        let mut app = App::default();
        let owner = app.api().addr_make("owner");

        let validators = self
            .powers
            .iter()
            .enumerate()
            .map(|(i, power)| {
                let addr = app.api().addr_make(&format!("val{i}"));
                TestValidator::new(addr, i as u8 + 1, *power)
            })
            .collect();

        let code_id = app.store_code(contract_btc_checkpointing());
        let contract = app
            .instantiate_contract(
                code_id,
                owner.clone(),
                &InstantiateMsg {
                    admin: Some(owner.to_string()),
                    babylon_tag: self.babylon_tag,
                    btc_confirmation_depth: self.btc_confirmation_depth,
                    checkpoint_finalization_timeout: self.checkpoint_finalization_timeout,
                },
                &[],
                "btc-checkpointing",
                Some(owner.to_string()),
            )
            .unwrap();

        Suite {
            app,
            code_id,
            contract,
            owner,
            validators,
        }
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Suite {
    #[derivative(Debug = "ignore")]
    pub app: App,
    /// The code id of the btc-checkpointing contract
    code_id: u64,
    /// btc-checkpointing contract address
    pub contract: Addr,
    /// Admin of the btc-checkpointing contract
    pub owner: Addr,
    #[derivative(Debug = "ignore")]
    pub validators: Vec<TestValidator>,
}

impl Suite {
    pub fn admin(&self) -> &str {
        self.owner.as_str()
    }

    pub fn validator_addr(&self, i: usize) -> Addr {
        Addr::unchecked(self.validators[i].addr())
    }

    fn execute(&mut self, sender: Addr, msg: &ExecuteMsg) -> AnyResult<AppResponse> {
        self.app
            .execute_contract(sender, self.contract.clone(), msg, &[])
    }

    pub fn update_admin(&mut self, sender: &Addr, admin: Option<String>) -> AnyResult<AppResponse> {
        self.execute(sender.clone(), &ExecuteMsg::UpdateAdmin { admin })
    }

    pub fn set_validator_set(&mut self, sender: &Addr, epoch: u64) -> AnyResult<AppResponse> {
        let validators = self
            .validators
            .iter()
            .map(|val| Validator {
                addr: val.addr().to_string(),
                power: val.power,
            })
            .collect();
        self.execute(
            sender.clone(),
            &ExecuteMsg::SetValidatorSet { epoch, validators },
        )
    }

    pub fn register_bls_key(&mut self, i: usize) -> AnyResult<AppResponse> {
        let msg = ExecuteMsg::RegisterBlsKey {
            pub_key: self.validators[i].pub_key_bytes(),
            pop: self.validators[i].pop_bytes(),
        };
        self.execute(self.validator_addr(i), &msg)
    }

    /// Sets the validator set of the epoch and registers all BLS keys
    pub fn setup_epoch(&mut self, epoch: u64) {
        let owner = self.owner.clone();
        self.set_validator_set(&owner, epoch).unwrap();
        for i in 0..self.validators.len() {
            if self.get_bls_public_key(i).is_none() {
                self.register_bls_key(i).unwrap();
            }
        }
    }

    pub fn build_checkpoint(
        &mut self,
        sender: &Addr,
        epoch: u64,
        last_commit_hash: &[u8],
    ) -> AnyResult<AppResponse> {
        self.execute(
            sender.clone(),
            &ExecuteMsg::BuildCheckpoint {
                epoch,
                last_commit_hash: Binary::from(last_commit_hash),
            },
        )
    }

    pub fn add_bls_sig(
        &mut self,
        i: usize,
        epoch: u64,
        last_commit_hash: &[u8],
    ) -> AnyResult<AppResponse> {
        let msg = ExecuteMsg::AddBlsSig {
            epoch,
            last_commit_hash: Binary::from(last_commit_hash),
            signature: self.validators[i].sign(epoch, last_commit_hash),
        };
        self.execute(self.validator_addr(i), &msg)
    }

    pub fn submit_btc_checkpoint(
        &mut self,
        sender: &Addr,
        first_tx: Vec<u8>,
        second_tx: Vec<u8>,
    ) -> AnyResult<AppResponse> {
        self.execute(
            sender.clone(),
            &ExecuteMsg::SubmitBtcCheckpoint {
                first_tx: Binary::from(first_tx),
                second_tx: Binary::from(second_tx),
            },
        )
    }

    pub fn report_btc_depth(
        &mut self,
        sender: &Addr,
        epoch: u64,
        depth: u32,
    ) -> AnyResult<AppResponse> {
        self.execute(sender.clone(), &ExecuteMsg::ReportBtcDepth { epoch, depth })
    }

    pub fn report_btc_rollback(&mut self, sender: &Addr, epoch: u64) -> AnyResult<AppResponse> {
        self.execute(sender.clone(), &ExecuteMsg::ReportBtcRollback { epoch })
    }

    pub fn migrate(&mut self, addr: &str, msg: Empty) -> AnyResult<AppResponse> {
        self.app.migrate_contract(
            Addr::unchecked(addr),
            self.contract.clone(),
            &msg,
            self.code_id,
        )
    }

    #[track_caller]
    pub fn get_config(&self) -> Config {
        self.app
            .wrap()
            .query_wasm_smart(self.contract.clone(), &QueryMsg::Config {})
            .unwrap()
    }

    #[track_caller]
    pub fn get_admin(&self) -> AdminResponse {
        self.app
            .wrap()
            .query_wasm_smart(self.contract.clone(), &QueryMsg::Admin {})
            .unwrap()
    }

    #[track_caller]
    pub fn get_checkpoint(&self, epoch: u64) -> RawCheckpointWithMeta {
        self.app
            .wrap()
            .query_wasm_smart(self.contract.clone(), &QueryMsg::Checkpoint { epoch })
            .unwrap()
    }

    #[track_caller]
    pub fn get_status(&self, epoch: u64) -> CheckpointStatus {
        self.app
            .wrap()
            .query_wasm_smart(self.contract.clone(), &QueryMsg::Status { epoch })
            .unwrap()
    }

    #[track_caller]
    pub fn get_validator_set(&self, epoch: u64) -> ValidatorSet {
        self.app
            .wrap()
            .query_wasm_smart(self.contract.clone(), &QueryMsg::ValidatorSet { epoch })
            .unwrap()
    }

    #[track_caller]
    pub fn get_bls_public_key(&self, i: usize) -> Option<Binary> {
        self.app
            .wrap()
            .query_wasm_smart(
                self.contract.clone(),
                &QueryMsg::BlsPublicKey {
                    address: self.validators[i].addr().to_string(),
                },
            )
            .unwrap()
    }

    pub fn get_encoded_checkpoint(
        &self,
        epoch: u64,
        submitter: &[u8],
    ) -> cosmwasm_std::StdResult<EncodedCheckpointResponse> {
        self.app.wrap().query_wasm_smart(
            self.contract.clone(),
            &QueryMsg::EncodedCheckpoint {
                epoch,
                submitter: hex::encode(submitter),
            },
        )
    }

    #[track_caller]
    pub fn get_conflict(&self) -> Option<u64> {
        self.app
            .wrap()
            .query_wasm_smart(self.contract.clone(), &QueryMsg::Conflict {})
            .unwrap()
    }
}
