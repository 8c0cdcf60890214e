use anyhow::Result;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
};
use thiserror::Error;

/// Raw account as returned by the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteAccount {
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

/// A submission that did not confirm.
#[derive(Clone, Debug, Default, Error)]
#[error("transaction failed: {message}")]
pub struct SubmitFailure {
    /// Signature of the attempted transaction, when it was built and signed.
    pub signature: Option<Signature>,
    /// Custom program error code reported by the runtime, if any.
    pub program_error: Option<u32>,
    /// Index of the instruction the runtime blamed for the failure.
    pub failed_instruction: Option<u8>,
    pub logs: Vec<String>,
    pub message: String,
}

impl SubmitFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Everything the keeper needs from the network.
pub trait Transport {
    /// `None` when the account does not exist.
    fn fetch_account(&self, address: &Pubkey) -> Result<Option<RemoteAccount>>;

    /// Sign `instructions` in order with `signer` as fee payer and wait for
    /// confirmation.
    fn submit(&self, instructions: &[Instruction], signer: &Keypair)
    -> Result<Signature, SubmitFailure>;

    /// Program logs of a landed transaction. Best effort.
    fn fetch_logs(&self, _signature: &Signature) -> Result<Option<Vec<String>>> {
        Ok(None)
    }
}
