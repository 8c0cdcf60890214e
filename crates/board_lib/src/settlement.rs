use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::{instruction, types::MinerAccount};

/// Settlement state of an authority relative to the current round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementState {
    /// Nothing unsettled, or no record yet.
    Clean,
    /// `stale_round` must be checkpointed before deploying.
    DirtyEligible { stale_round: u64 },
    /// Unsettled but the recorded round is not older than the current one.
    /// No checkpoint is possible; the deploy goes ahead regardless.
    DirtyIneligible { round_id: u64, checkpoint_id: u64 },
}

pub fn classify_progress(checkpoint_id: u64, round_id: u64, current_round: u64) -> SettlementState {
    if checkpoint_id == round_id {
        SettlementState::Clean
    } else if round_id < current_round {
        SettlementState::DirtyEligible {
            stale_round: round_id,
        }
    } else {
        SettlementState::DirtyIneligible {
            round_id,
            checkpoint_id,
        }
    }
}

pub fn settlement_state(miner: Option<&MinerAccount>, current_round: u64) -> SettlementState {
    match miner {
        Some(miner) => classify_progress(miner.checkpoint_id, miner.round_id, current_round),
        None => SettlementState::Clean,
    }
}

impl SettlementState {
    /// The checkpoint to prepend ahead of the deploy, if any.
    pub fn checkpoint_instruction(
        &self,
        program_id: &Pubkey,
        signer: &Pubkey,
        authority: &Pubkey,
    ) -> Option<Instruction> {
        match *self {
            SettlementState::DirtyEligible { stale_round } => Some(instruction::checkpoint(
                program_id,
                signer,
                authority,
                stale_round,
            )),
            SettlementState::Clean | SettlementState::DirtyIneligible { .. } => None,
        }
    }

    pub fn stale_round(&self) -> Option<u64> {
        match *self {
            SettlementState::DirtyEligible { stale_round } => Some(stale_round),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pda::derive_round_pda;

    #[test]
    fn settled_record_is_clean_for_any_round() {
        for current in [0, 1, 9, 10, 11, u64::MAX] {
            assert_eq!(classify_progress(9, 9, current), SettlementState::Clean);
        }
    }

    #[test]
    fn missing_record_is_clean() {
        assert_eq!(settlement_state(None, 10), SettlementState::Clean);
    }

    #[test]
    fn older_unsettled_round_is_eligible() {
        let miner = MinerAccount::new([1; 32], 8, 7);
        assert_eq!(
            settlement_state(Some(&miner), 10),
            SettlementState::DirtyEligible { stale_round: 8 }
        );
    }

    #[test]
    fn current_unsettled_round_is_ineligible() {
        assert_eq!(
            classify_progress(9, 10, 10),
            SettlementState::DirtyIneligible {
                round_id: 10,
                checkpoint_id: 9
            }
        );
        assert_eq!(
            classify_progress(3, 12, 10),
            SettlementState::DirtyIneligible {
                round_id: 12,
                checkpoint_id: 3
            }
        );
    }

    #[test]
    fn checkpoint_targets_stale_round_not_current() {
        let program_id = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let state = classify_progress(7, 8, 10);

        let ix = state
            .checkpoint_instruction(&program_id, &authority, &authority)
            .expect("checkpoint required");
        let rounds: Vec<Pubkey> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert!(rounds.contains(&derive_round_pda(&program_id, 8)));
        assert!(!rounds.contains(&derive_round_pda(&program_id, 10)));
    }

    #[test]
    fn no_checkpoint_unless_eligible() {
        let program_id = Pubkey::new_unique();
        let authority = Pubkey::new_unique();

        for state in [classify_progress(9, 9, 10), classify_progress(9, 10, 10)] {
            assert!(
                state
                    .checkpoint_instruction(&program_id, &authority, &authority)
                    .is_none()
            );
        }
    }
}
