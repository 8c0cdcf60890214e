use solana_sdk::pubkey::Pubkey;

pub const BOARD_SEED: &[u8] = b"board";
pub const ROUND_SEED: &[u8] = b"round";
pub const MINER_SEED: &[u8] = b"miner";
pub const AUTOMATION_SEED: &[u8] = b"automation";
pub const TREASURY_SEED: &[u8] = b"treasury";

/// Program-owned account roles addressed by the keeper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountRole<'a> {
    Board,
    Round(u64),
    Miner(&'a Pubkey),
    Automation(&'a Pubkey),
    Treasury,
}

/// Derive the address for `role` under `program_id`. Pure and infallible.
pub fn derive_address(program_id: &Pubkey, role: AccountRole<'_>) -> Pubkey {
    match role {
        AccountRole::Board => Pubkey::find_program_address(&[BOARD_SEED], program_id).0,
        AccountRole::Round(round_id) => {
            Pubkey::find_program_address(&[ROUND_SEED, &round_id.to_le_bytes()], program_id).0
        }
        AccountRole::Miner(authority) => {
            Pubkey::find_program_address(&[MINER_SEED, authority.as_ref()], program_id).0
        }
        AccountRole::Automation(authority) => {
            Pubkey::find_program_address(&[AUTOMATION_SEED, authority.as_ref()], program_id).0
        }
        AccountRole::Treasury => Pubkey::find_program_address(&[TREASURY_SEED], program_id).0,
    }
}

pub fn derive_board_pda(program_id: &Pubkey) -> Pubkey {
    derive_address(program_id, AccountRole::Board)
}

pub fn derive_round_pda(program_id: &Pubkey, round_id: u64) -> Pubkey {
    derive_address(program_id, AccountRole::Round(round_id))
}

pub fn derive_miner_pda(program_id: &Pubkey, authority: &Pubkey) -> Pubkey {
    derive_address(program_id, AccountRole::Miner(authority))
}

pub fn derive_automation_pda(program_id: &Pubkey, authority: &Pubkey) -> Pubkey {
    derive_address(program_id, AccountRole::Automation(authority))
}

pub fn derive_treasury_pda(program_id: &Pubkey) -> Pubkey {
    derive_address(program_id, AccountRole::Treasury)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let program_id = Pubkey::new_unique();
        let authority = Pubkey::new_unique();

        assert_eq!(derive_board_pda(&program_id), derive_board_pda(&program_id));
        assert_eq!(
            derive_round_pda(&program_id, 42),
            derive_round_pda(&program_id, 42)
        );
        assert_eq!(
            derive_miner_pda(&program_id, &authority),
            derive_address(&program_id, AccountRole::Miner(&authority))
        );
    }

    #[test]
    fn roles_and_parameters_yield_distinct_addresses() {
        let program_id = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let other = Pubkey::new_unique();

        assert_ne!(
            derive_round_pda(&program_id, 1),
            derive_round_pda(&program_id, 2)
        );
        assert_ne!(
            derive_miner_pda(&program_id, &authority),
            derive_automation_pda(&program_id, &authority)
        );
        assert_ne!(
            derive_miner_pda(&program_id, &authority),
            derive_miner_pda(&program_id, &other)
        );
        assert_ne!(derive_board_pda(&program_id), derive_treasury_pda(&program_id));
    }

    #[test]
    fn round_seed_is_little_endian_id() {
        let program_id = Pubkey::new_unique();
        let expected =
            Pubkey::find_program_address(&[b"round", &7u64.to_le_bytes()], &program_id).0;
        assert_eq!(derive_round_pda(&program_id, 7), expected);
    }
}
