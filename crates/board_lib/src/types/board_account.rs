use crate::types::{AccountDiscriminator, AccountLayout};
use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct BoardAccount {
    pub round_id: u64,
    pub start_slot: u64,
    pub end_slot: u64,
}

impl AccountLayout for BoardAccount {
    const DISCRIMINATOR: AccountDiscriminator = AccountDiscriminator::Board;
    const LEN: usize = 32;
}
