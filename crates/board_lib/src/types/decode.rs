use anchor_lang::{AnchorDeserialize, AnchorSerialize};

use crate::types::{AccountDiscriminator, BoardAccount, MinerAccount, RoundAccount};

/// Fixed on-chain layout: an 8-byte discriminator followed by the body.
pub trait AccountLayout: AnchorSerialize + AnchorDeserialize {
    const DISCRIMINATOR: AccountDiscriminator;
    /// Minimum buffer length, discriminator included.
    const LEN: usize;
}

/// Result of decoding a fetched account buffer.
///
/// `NotYetInitialized` is the expected state of an account the program has
/// not written yet. `Malformed` is never folded into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded<T> {
    Ready(T),
    NotYetInitialized,
    Malformed(String),
}

impl<T> Decoded<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Decoded::Ready(value) => Some(value),
            _ => None,
        }
    }
}

pub fn decode_account<T: AccountLayout>(data: &[u8]) -> Decoded<T> {
    if data.is_empty() {
        return Decoded::NotYetInitialized;
    }
    if data.len() < AccountDiscriminator::LEN {
        return Decoded::Malformed(format!(
            "{:?} account data too short: {} bytes",
            T::DISCRIMINATOR,
            data.len()
        ));
    }

    let mut disc = [0u8; AccountDiscriminator::LEN];
    disc.copy_from_slice(&data[..AccountDiscriminator::LEN]);
    let disc = u64::from_le_bytes(disc);
    if disc == 0 {
        return Decoded::NotYetInitialized;
    }
    if disc != T::DISCRIMINATOR as u64 {
        return Decoded::Malformed(format!(
            "discriminator mismatch. expected={:?}, got={}",
            T::DISCRIMINATOR,
            disc
        ));
    }

    if data.len() < T::LEN {
        return Decoded::Malformed(format!(
            "{:?} account data too short: expected at least {} bytes, got {}",
            T::DISCRIMINATOR,
            T::LEN,
            data.len()
        ));
    }

    let mut cursor = &data[AccountDiscriminator::LEN..];
    match T::deserialize(&mut cursor) {
        Ok(account) => Decoded::Ready(account),
        Err(err) => Decoded::Malformed(format!(
            "failed to deserialize {:?}: {}",
            T::DISCRIMINATOR,
            err
        )),
    }
}

/// Inverse of [`decode_account`], used to build simulated account state.
pub fn encode_account<T: AccountLayout>(account: &T) -> Vec<u8> {
    let mut data = Vec::with_capacity(T::LEN);
    data.extend_from_slice(&T::DISCRIMINATOR.to_le_bytes());
    // Writing into a Vec cannot fail.
    let _ = account.serialize(&mut data);
    data
}

pub fn decode_board(data: &[u8]) -> Decoded<BoardAccount> {
    decode_account(data)
}

pub fn decode_round(data: &[u8]) -> Decoded<RoundAccount> {
    decode_account(data)
}

pub fn decode_miner(data: &[u8]) -> Decoded<MinerAccount> {
    decode_account(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_protocol_lengths() {
        let round = encode_account(&RoundAccount::new(1));
        assert_eq!(round.len(), RoundAccount::LEN);

        let miner = encode_account(&MinerAccount::new([7; 32], 1, 1));
        assert_eq!(miner.len(), MinerAccount::LEN);

        let board = encode_account(&BoardAccount {
            round_id: 1,
            start_slot: 10,
            end_slot: 160,
        });
        assert_eq!(board.len(), BoardAccount::LEN);
    }

    #[test]
    fn miner_fields_sit_at_fixed_offsets() {
        let mut miner = MinerAccount::new([7; 32], 9, 8);
        miner.deployed[0] = 5;
        let data = encode_account(&miner);

        assert_eq!(&data[..8], &103u64.to_le_bytes());
        assert_eq!(&data[8..40], &[7u8; 32]);
        assert_eq!(&data[40..48], &5u64.to_le_bytes());
        assert_eq!(&data[448..456], &8u64.to_le_bytes());
        assert_eq!(&data[512..520], &9u64.to_le_bytes());
    }

    #[test]
    fn round_total_deployed_offset() {
        let mut round = RoundAccount::new(12);
        round.total_deployed = 1_000;
        let data = encode_account(&round);

        assert_eq!(&data[8..16], &12u64.to_le_bytes());
        assert_eq!(&data[536..544], &1_000u64.to_le_bytes());
    }

    #[test]
    fn decodes_ready_round() {
        let mut round = RoundAccount::new(10);
        round.deployed[3] = 250;
        round.total_deployed = 250;

        let decoded = decode_round(&encode_account(&round));
        assert_eq!(decoded, Decoded::Ready(round));
    }

    #[test]
    fn empty_or_zeroed_buffer_is_not_initialized() {
        assert_eq!(decode_round(&[]), Decoded::NotYetInitialized);
        assert_eq!(
            decode_round(&vec![0u8; RoundAccount::LEN]),
            Decoded::NotYetInitialized
        );
    }

    #[test]
    fn truncated_buffer_is_malformed() {
        let data = encode_account(&RoundAccount::new(10));
        let decoded = decode_round(&data[..100]);
        assert!(matches!(decoded, Decoded::Malformed(_)));

        assert!(matches!(decode_miner(&[103, 0, 0]), Decoded::Malformed(_)));
    }

    #[test]
    fn wrong_discriminator_is_malformed() {
        let data = encode_account(&MinerAccount::new([1; 32], 3, 3));
        assert!(matches!(decode_round(&data), Decoded::Malformed(_)));
    }

    #[test]
    fn trailing_bytes_are_tolerated() {
        let board = BoardAccount {
            round_id: 4,
            start_slot: 100,
            end_slot: 250,
        };
        let mut data = encode_account(&board);
        data.extend_from_slice(&[0u8; 16]);

        assert_eq!(decode_board(&data).ready(), Some(board));
    }
}
