pub mod board_account;
pub mod decode;
pub mod enums;
pub mod miner_account;
pub mod round_account;

pub use board_account::*;
pub use decode::*;
pub use enums::*;
pub use miner_account::*;
pub use round_account::*;

/// Number of selectable squares on the board.
pub const SQUARE_COUNT: usize = 25;
