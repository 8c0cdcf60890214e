pub mod client;
pub mod errors;
pub mod instruction;
pub mod pda;
pub mod settlement;
pub mod storage;
pub mod types;
pub mod wallet;
