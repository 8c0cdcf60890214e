use board_lib::{
    client::{
        program::{get_miner_account, get_round_account},
        transport::Transport,
    },
    errors::KnownProgramError,
    instruction::{
        DeployArgs, Target, compute_budget_instructions, deploy, fee_transfer,
        protocol_fee_lamports, sol_to_lamports, squares_mask,
    },
    pda::derive_miner_pda,
    settlement::{SettlementState, settlement_state},
    storage::{SubmissionRecord, SubmissionStatus},
    types::Decoded,
};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Signature, Signer},
};
use tracing::{debug, info, warn};

use crate::{
    App, DeploySettings,
    keepers::{CycleError, resolve_failure},
    short_signature,
};

const OP: &str = "deploy";

/// Inputs of one deployment cycle.
#[derive(Clone, Debug)]
pub struct DeployRequest<'a> {
    pub round_id: u64,
    pub stake_per_square_sol: f64,
    pub selection: &'a [Target],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoSigner,
    EmptySelection,
    /// Every selected square is already funded in the current round.
    AlreadyDeployed,
    ZeroStake,
    /// Total stake does not fit in a `u64` of lamports.
    StakeOverflow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferReason {
    RoundNotInitialized,
    RoundMalformed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeployReceipt {
    pub signature: Signature,
    pub round_id: u64,
    /// Stale round settled in the same transaction.
    pub checkpointed: Option<u64>,
    pub mask: u32,
    pub stake_lamports: u64,
    pub fee_lamports: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Skipped(SkipReason),
    Deferred(DeferReason),
    Submitted(DeployReceipt),
    BenignDuplicate(KnownProgramError),
}

/// Ordered instruction list for one deployment.
pub fn assemble(
    settings: &DeploySettings,
    authority: &Pubkey,
    round_id: u64,
    checkpoint: Option<Instruction>,
    fee_lamports: u64,
    args: DeployArgs,
) -> Vec<Instruction> {
    let mut ixs = Vec::from(compute_budget_instructions(
        settings.cu_limit,
        settings.cu_price_micro_lamports,
    ));
    ixs.extend(checkpoint);
    if fee_lamports > 0 {
        ixs.push(fee_transfer(authority, &settings.fee_collector, fee_lamports));
    }
    ixs.push(deploy(&settings.program_id, authority, authority, round_id, args));
    ixs
}

pub fn run_one<T: Transport>(
    app: &App<T>,
    request: &DeployRequest<'_>,
) -> Result<CycleOutcome, CycleError> {
    let Some(signer) = app.signer() else {
        debug!("no signer loaded, skipping deploy");
        return Ok(CycleOutcome::Skipped(SkipReason::NoSigner));
    };

    let mut selection: Vec<Target> = request
        .selection
        .iter()
        .copied()
        .filter(Target::in_range)
        .collect();
    selection.sort_by_key(|t| t.id);
    selection.dedup();
    if selection.is_empty() {
        debug!("empty selection, skipping deploy");
        return Ok(CycleOutcome::Skipped(SkipReason::EmptySelection));
    }

    let settings = app.settings();
    let program_id = &settings.program_id;
    let round_id = request.round_id;

    let round = match get_round_account(app.transport(), program_id, round_id)? {
        Decoded::Ready(round) => round,
        Decoded::NotYetInitialized => {
            info!(round_id, "round not initialized yet, deferring");
            return Ok(CycleOutcome::Deferred(DeferReason::RoundNotInitialized));
        }
        Decoded::Malformed(reason) => {
            warn!(round_id, %reason, "round account malformed, deferring");
            return Ok(CycleOutcome::Deferred(DeferReason::RoundMalformed));
        }
    };
    debug!(
        round_id,
        total_deployed = round.total_deployed,
        funded_squares = round.funded_squares(),
        "round ready"
    );

    let authority = signer.pubkey();
    let miner = match get_miner_account(app.transport(), program_id, &authority)? {
        Decoded::Ready(miner) => Some(miner),
        Decoded::NotYetInitialized => None,
        Decoded::Malformed(reason) => {
            return Err(CycleError::MalformedMiner {
                address: derive_miner_pda(program_id, &authority),
                reason,
            });
        }
    };

    if let Some(miner) = miner.as_ref().filter(|m| m.round_id == round_id) {
        let requested = selection.len();
        selection.retain(|t| !miner.has_deployed(t.id));
        if selection.is_empty() {
            info!(round_id, "selected squares already funded this round, skipping");
            return Ok(CycleOutcome::Skipped(SkipReason::AlreadyDeployed));
        }
        if selection.len() < requested {
            info!(
                round_id,
                already_funded = requested - selection.len(),
                "deploying only to squares not yet funded this round"
            );
        }
    }

    let settlement = settlement_state(miner.as_ref(), round_id);
    if let SettlementState::DirtyIneligible {
        round_id: miner_round,
        checkpoint_id,
    } = settlement
    {
        warn!(
            round_id,
            miner_round,
            checkpoint_id,
            "miner has an unsettled round that cannot be checkpointed, deploying without settlement"
        );
    }
    let checkpoint = settlement.checkpoint_instruction(program_id, &authority, &authority);

    let stake_lamports = sol_to_lamports(request.stake_per_square_sol);
    if stake_lamports == 0 {
        warn!(
            stake_per_square_sol = request.stake_per_square_sol,
            "stake rounds to zero lamports, skipping"
        );
        return Ok(CycleOutcome::Skipped(SkipReason::ZeroStake));
    }
    let Some(fee_lamports) = protocol_fee_lamports(stake_lamports, selection.len()) else {
        warn!(stake_lamports, squares = selection.len(), "total stake overflows, skipping");
        return Ok(CycleOutcome::Skipped(SkipReason::StakeOverflow));
    };
    let args = DeployArgs {
        amount: stake_lamports,
        mask: squares_mask(&selection),
    };

    let instructions = assemble(settings, &authority, round_id, checkpoint, fee_lamports, args);
    debug!(
        round_id,
        instructions = instructions.len(),
        data = %hex::encode(args.to_bytes()),
        "submitting deploy"
    );

    let mut record = SubmissionRecord::new(OP, SubmissionStatus::Success);
    record.round_id = Some(round_id);
    record.checkpoint_round_id = settlement.stale_round();
    record.squares_mask = Some(args.mask);
    record.stake_lamports = Some(stake_lamports);
    record.fee_lamports = Some(fee_lamports);

    match app.transport().submit(&instructions, signer) {
        Ok(signature) => {
            info!(
                round_id,
                signature = %short_signature(&signature),
                squares = selection.len(),
                stake_lamports,
                fee_lamports,
                checkpointed = ?settlement.stale_round(),
                "deploy confirmed"
            );
            record.signature = Some(signature.to_string());
            app.journal_record(&record);

            Ok(CycleOutcome::Submitted(DeployReceipt {
                signature,
                round_id,
                checkpointed: settlement.stale_round(),
                mask: args.mask,
                stake_lamports,
                fee_lamports,
            }))
        }
        Err(failure) => resolve_failure(app, OP, &instructions, failure, record)
            .map(CycleOutcome::BenignDuplicate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_lib::instruction::checkpoint;
    use solana_sdk::compute_budget::ComputeBudgetInstruction;

    fn settings() -> DeploySettings {
        DeploySettings {
            program_id: Pubkey::new_unique(),
            fee_collector: Pubkey::new_unique(),
            cu_limit: 1_400_000,
            cu_price_micro_lamports: 1_000,
        }
    }

    #[test]
    fn assembles_in_fixed_order() {
        let settings = settings();
        let authority = Pubkey::new_unique();
        let args = DeployArgs { amount: 5, mask: 3 };
        let ckpt = checkpoint(&settings.program_id, &authority, &authority, 8);

        let ixs = assemble(&settings, &authority, 10, Some(ckpt.clone()), 7, args);

        assert_eq!(ixs.len(), 5);
        assert_eq!(
            ixs[0],
            ComputeBudgetInstruction::set_compute_unit_limit(settings.cu_limit)
        );
        assert_eq!(
            ixs[1],
            ComputeBudgetInstruction::set_compute_unit_price(settings.cu_price_micro_lamports)
        );
        assert_eq!(ixs[2], ckpt);
        assert_eq!(ixs[3], fee_transfer(&authority, &settings.fee_collector, 7));
        assert_eq!(ixs[4].data, args.to_bytes().to_vec());
    }

    #[test]
    fn omits_zero_fee_and_absent_checkpoint() {
        let settings = settings();
        let authority = Pubkey::new_unique();
        let args = DeployArgs { amount: 5, mask: 1 };

        let ixs = assemble(&settings, &authority, 10, None, 0, args);

        assert_eq!(ixs.len(), 3);
        assert_eq!(ixs[2].program_id, settings.program_id);
    }
}
