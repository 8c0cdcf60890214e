/// Leading discriminator of every program-owned account, stored as a
/// little-endian `u64` in the first eight bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum AccountDiscriminator {
    Automation = 100,
    Miner = 103,
    Board = 105,
    Round = 109,
}

impl AccountDiscriminator {
    pub const LEN: usize = 8;

    pub fn to_le_bytes(self) -> [u8; 8] {
        (self as u64).to_le_bytes()
    }
}
