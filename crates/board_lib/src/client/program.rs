use anyhow::Result;
use solana_sdk::pubkey::Pubkey;

use crate::{
    client::transport::Transport,
    pda::{derive_automation_pda, derive_board_pda, derive_miner_pda, derive_round_pda},
    types::{
        AccountDiscriminator, AccountLayout, BoardAccount, Decoded, MinerAccount, RoundAccount,
        decode_account,
    },
};

/// Fetch `address` and decode it as `T`, rejecting accounts the program
/// does not own.
pub fn fetch_decoded<T: AccountLayout>(
    transport: &impl Transport,
    program_id: &Pubkey,
    address: &Pubkey,
) -> Result<Decoded<T>> {
    let Some(acc) = transport.fetch_account(address)? else {
        return Ok(Decoded::NotYetInitialized);
    };

    if acc.owner != *program_id {
        return Ok(Decoded::Malformed(format!(
            "{:?} owner mismatch. expected={}, got={}",
            T::DISCRIMINATOR,
            program_id,
            acc.owner
        )));
    }

    Ok(decode_account(&acc.data))
}

pub fn get_board_account(
    transport: &impl Transport,
    program_id: &Pubkey,
) -> Result<Decoded<BoardAccount>> {
    fetch_decoded(transport, program_id, &derive_board_pda(program_id))
}

pub fn get_round_account(
    transport: &impl Transport,
    program_id: &Pubkey,
    round_id: u64,
) -> Result<Decoded<RoundAccount>> {
    fetch_decoded(transport, program_id, &derive_round_pda(program_id, round_id))
}

pub fn get_miner_account(
    transport: &impl Transport,
    program_id: &Pubkey,
    authority: &Pubkey,
) -> Result<Decoded<MinerAccount>> {
    fetch_decoded(transport, program_id, &derive_miner_pda(program_id, authority))
}

/// Whether `authority` currently has an automation account.
pub fn automation_exists(
    transport: &impl Transport,
    program_id: &Pubkey,
    authority: &Pubkey,
) -> Result<bool> {
    let address = derive_automation_pda(program_id, authority);
    let discriminator = AccountDiscriminator::Automation.to_le_bytes();
    Ok(transport
        .fetch_account(&address)?
        .is_some_and(|acc| acc.owner == *program_id && acc.data.starts_with(&discriminator)))
}
