use crate::types::{AccountDiscriminator, AccountLayout, SQUARE_COUNT};
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RoundAccount {
    pub id: u64,
    /// Lamports deployed on each square.
    pub deployed: [u64; SQUARE_COUNT],
    pub slot_hash: [u8; 32],
    /// Miners on each square.
    pub count: [u64; SQUARE_COUNT],
    pub expires_at: u64,
    pub motherlode: u64,
    pub rent_payer: [u8; 32],
    pub top_miner: [u8; 32],
    pub top_miner_reward: u64,
    pub total_deployed: u64,
    pub total_vaulted: u64,
    pub total_winnings: u64,
}

impl AccountLayout for RoundAccount {
    const DISCRIMINATOR: AccountDiscriminator = AccountDiscriminator::Round;
    const LEN: usize = 560;
}

impl RoundAccount {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            deployed: [0; SQUARE_COUNT],
            slot_hash: [0; 32],
            count: [0; SQUARE_COUNT],
            expires_at: 0,
            motherlode: 0,
            rent_payer: [0; 32],
            top_miner: [0; 32],
            top_miner_reward: 0,
            total_deployed: 0,
            total_vaulted: 0,
            total_winnings: 0,
        }
    }

    /// Number of squares that have received at least one deployment.
    pub fn funded_squares(&self) -> usize {
        self.deployed.iter().filter(|&&d| d > 0).count()
    }
}
