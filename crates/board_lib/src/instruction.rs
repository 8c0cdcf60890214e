use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
};

use crate::pda::{
    derive_automation_pda, derive_board_pda, derive_miner_pda, derive_round_pda,
    derive_treasury_pda,
};
use crate::types::SQUARE_COUNT;

/// Instruction opcodes understood by the board program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Automate = 0,
    Checkpoint = 2,
    Deploy = 6,
}

pub const DEPLOY_DATA_LEN: usize = 13;
pub const CLOSE_AUTOMATION_DATA_LEN: usize = 41;

/// Protocol fee charged on the total stake of a deployment, in percent.
pub const PROTOCOL_FEE_PERCENT: u64 = 1;

/// A selectable square, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    pub id: u8,
}

impl Target {
    pub fn new(id: u8) -> Self {
        Self { id }
    }

    pub fn in_range(&self) -> bool {
        (1..=SQUARE_COUNT as u8).contains(&self.id)
    }
}

/// Pack a selection into the program's squares mask.
///
/// Ids outside `1..=25` never set a bit. The result does not depend on order.
pub fn squares_mask(selection: &[Target]) -> u32 {
    selection
        .iter()
        .filter(|t| t.in_range())
        .fold(0u32, |mask, t| mask | 1 << (t.id - 1))
}

/// Truncating SOL to lamports conversion. Negative and NaN inputs give zero.
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64) as u64
}

/// Fee in lamports owed for staking `stake_lamports` on each of `squares`
/// squares, rounded down. `None` when the total stake overflows.
pub fn protocol_fee_lamports(stake_lamports: u64, squares: usize) -> Option<u64> {
    let squares = u64::try_from(squares).ok()?;
    let total = stake_lamports.checked_mul(squares)?;
    Some(total / 100 * PROTOCOL_FEE_PERCENT + total % 100 * PROTOCOL_FEE_PERCENT / 100)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeployArgs {
    /// Lamports per selected square.
    pub amount: u64,
    pub mask: u32,
}

impl DeployArgs {
    pub fn to_bytes(&self) -> [u8; DEPLOY_DATA_LEN] {
        let mut data = [0u8; DEPLOY_DATA_LEN];
        data[0] = OpCode::Deploy as u8;
        data[1..9].copy_from_slice(&self.amount.to_le_bytes());
        data[9..13].copy_from_slice(&self.mask.to_le_bytes());
        data
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() != DEPLOY_DATA_LEN || data[0] != OpCode::Deploy as u8 {
            return None;
        }
        let mut amount = [0u8; 8];
        amount.copy_from_slice(&data[1..9]);
        let mut mask = [0u8; 4];
        mask.copy_from_slice(&data[9..13]);
        Some(Self {
            amount: u64::from_le_bytes(amount),
            mask: u32::from_le_bytes(mask),
        })
    }
}

pub fn checkpoint_data() -> [u8; 1] {
    [OpCode::Checkpoint as u8]
}

pub fn close_automation_data() -> [u8; CLOSE_AUTOMATION_DATA_LEN] {
    let mut data = [0u8; CLOSE_AUTOMATION_DATA_LEN];
    data[0] = OpCode::Automate as u8;
    data
}

pub fn compute_budget_instructions(
    cu_limit: u32,
    cu_price_micro_lamports: u64,
) -> [Instruction; 2] {
    [
        ComputeBudgetInstruction::set_compute_unit_limit(cu_limit),
        ComputeBudgetInstruction::set_compute_unit_price(cu_price_micro_lamports),
    ]
}

/// Deploy `args` into `round_id` on behalf of `authority`.
pub fn deploy(
    program_id: &Pubkey,
    signer: &Pubkey,
    authority: &Pubkey,
    round_id: u64,
    args: DeployArgs,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*signer, true),
        AccountMeta::new(*authority, false),
        AccountMeta::new(derive_automation_pda(program_id, authority), false),
        AccountMeta::new(derive_board_pda(program_id), false),
        AccountMeta::new(derive_miner_pda(program_id, authority), false),
        AccountMeta::new(derive_round_pda(program_id, round_id), false),
        AccountMeta::new_readonly(solana_system_interface::program::ID, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: args.to_bytes().to_vec(),
    }
}

/// Settle `authority`'s exposure in the stale round `round_id`.
pub fn checkpoint(
    program_id: &Pubkey,
    signer: &Pubkey,
    authority: &Pubkey,
    round_id: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*signer, true),
        AccountMeta::new(derive_board_pda(program_id), false),
        AccountMeta::new(derive_miner_pda(program_id, authority), false),
        AccountMeta::new(derive_round_pda(program_id, round_id), false),
        AccountMeta::new(derive_treasury_pda(program_id), false),
        AccountMeta::new_readonly(solana_system_interface::program::ID, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: checkpoint_data().to_vec(),
    }
}

/// Zeroed automate call; with the default executor the program closes the
/// authority's automation account.
pub fn close_automation(program_id: &Pubkey, signer: &Pubkey) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*signer, true),
        AccountMeta::new(derive_automation_pda(program_id, signer), false),
        AccountMeta::new(Pubkey::default(), false),
        AccountMeta::new(derive_miner_pda(program_id, signer), false),
        AccountMeta::new_readonly(solana_system_interface::program::ID, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: close_automation_data().to_vec(),
    }
}

pub fn fee_transfer(payer: &Pubkey, fee_collector: &Pubkey, lamports: u64) -> Instruction {
    solana_system_interface::instruction::transfer(payer, fee_collector, lamports)
}
