use crate::types::{AccountDiscriminator, AccountLayout, SQUARE_COUNT};
use anchor_lang::prelude::*;

/// Per-authority progress record.
///
/// `round_id` is the round last deployed into and `checkpoint_id` the round
/// last settled. The record is dirty while the two differ.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct MinerAccount {
    pub authority: [u8; 32],
    /// Lamports deployed on each square during `round_id`.
    pub deployed: [u64; SQUARE_COUNT],
    pub cumulative: [u64; SQUARE_COUNT],
    pub checkpoint_fee: u64,
    pub checkpoint_id: u64,
    pub last_claim_ore_at: i64,
    pub last_claim_sol_at: i64,
    pub rewards_factor: [u8; 16],
    pub rewards_sol: u64,
    pub rewards_ore: u64,
    pub refined_ore: u64,
    pub round_id: u64,
    pub lifetime_rewards_sol: u64,
    pub lifetime_rewards_ore: u64,
}

impl AccountLayout for MinerAccount {
    const DISCRIMINATOR: AccountDiscriminator = AccountDiscriminator::Miner;
    const LEN: usize = 536;
}

impl MinerAccount {
    pub fn new(authority: [u8; 32], round_id: u64, checkpoint_id: u64) -> Self {
        Self {
            authority,
            deployed: [0; SQUARE_COUNT],
            cumulative: [0; SQUARE_COUNT],
            checkpoint_fee: 0,
            checkpoint_id,
            last_claim_ore_at: 0,
            last_claim_sol_at: 0,
            rewards_factor: [0; 16],
            rewards_sol: 0,
            rewards_ore: 0,
            refined_ore: 0,
            round_id,
            lifetime_rewards_sol: 0,
            lifetime_rewards_ore: 0,
        }
    }

    /// Whether the 1-based square `id` already holds a deployment for `round_id`.
    pub fn has_deployed(&self, id: u8) -> bool {
        match id {
            1..=25 => self.deployed[usize::from(id - 1)] > 0,
            _ => false,
        }
    }
}
