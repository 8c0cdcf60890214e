use anyhow::{Context, Result};
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_client::RpcClient,
    rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig},
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, TransactionError},
};
use solana_transaction_status_client_types::UiTransactionEncoding;
use std::{
    thread,
    time::{Duration, Instant},
};

use crate::client::transport::{RemoteAccount, SubmitFailure, Transport};

/// Upper bound on waiting for a sent transaction to reach the commitment.
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(90);
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct Rpc {
    inner: RpcClient,
    commitment_cfg: CommitmentConfig,
    send_cfg: RpcSendTransactionConfig,
}

impl Rpc {
    pub fn new(
        rpc_url: &str,
        timeout_ms: u64,
        commitment: CommitmentLevel,
        preflight: bool,
        max_retries: usize,
    ) -> Self {
        let commitment_cfg = CommitmentConfig { commitment };
        let inner = RpcClient::new_with_timeout_and_commitment(
            rpc_url.to_string(),
            Duration::from_millis(timeout_ms),
            commitment_cfg,
        );
        let send_cfg = RpcSendTransactionConfig {
            skip_preflight: !preflight,
            max_retries: Some(max_retries),
            preflight_commitment: Some(commitment),
            ..Default::default()
        };

        Self {
            inner,
            commitment_cfg,
            send_cfg,
        }
    }

    /// Poll the signature status until the transaction reaches the configured
    /// commitment, fails, or `CONFIRM_TIMEOUT` elapses.
    fn await_confirmation(&self, signature: Signature) -> Result<(), SubmitFailure> {
        let deadline = Instant::now() + CONFIRM_TIMEOUT;
        loop {
            let status = self
                .inner
                .get_signature_status_with_commitment(&signature, self.commitment_cfg)
                .map_err(|err| failure_from_client_error(Some(signature), &err))?;

            match status {
                Some(Ok(())) => return Ok(()),
                Some(Err(err)) => return Err(failure_from_transaction_error(signature, &err)),
                None if Instant::now() >= deadline => {
                    return Err(SubmitFailure {
                        signature: Some(signature),
                        ..SubmitFailure::new(format!(
                            "transaction {} not confirmed within {:?}",
                            signature, CONFIRM_TIMEOUT
                        ))
                    });
                }
                None => thread::sleep(CONFIRM_POLL_INTERVAL),
            }
        }
    }
}

impl Transport for Rpc {
    fn fetch_account(&self, address: &Pubkey) -> Result<Option<RemoteAccount>> {
        let response = self
            .inner
            .get_account_with_commitment(address, self.commitment_cfg)
            .with_context(|| format!("Failed to fetch account {}", address))?;

        Ok(response.value.map(|acc| RemoteAccount {
            owner: acc.owner,
            data: acc.data,
        }))
    }

    fn submit(
        &self,
        instructions: &[Instruction],
        signer: &Keypair,
    ) -> Result<Signature, SubmitFailure> {
        let blockhash = self.inner.get_latest_blockhash().map_err(|err| {
            SubmitFailure::new(format!("failed to fetch latest blockhash: {}", err))
        })?;

        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&signer.pubkey()),
            &[signer],
            blockhash,
        );
        let signature = tx.signatures.first().copied();

        let signature = self
            .inner
            .send_transaction_with_config(&tx, self.send_cfg.clone())
            .map_err(|err| failure_from_client_error(signature, &err))?;
        self.await_confirmation(signature)?;
        Ok(signature)
    }

    fn fetch_logs(&self, signature: &Signature) -> Result<Option<Vec<String>>> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(self.commitment_cfg),
            max_supported_transaction_version: Some(0),
        };
        let tx = self
            .inner
            .get_transaction_with_config(signature, config)
            .with_context(|| format!("Failed to fetch transaction {}", signature))?;

        Ok(tx
            .transaction
            .meta
            .and_then(|meta| Option::<Vec<String>>::from(meta.log_messages)))
    }
}

/// Custom code and blamed instruction index of a runtime error.
fn instruction_failure(err: &TransactionError) -> (Option<u8>, Option<u32>) {
    match err {
        TransactionError::InstructionError(idx, InstructionError::Custom(code)) => {
            (Some(*idx), Some(*code))
        }
        TransactionError::InstructionError(idx, _) => (Some(*idx), None),
        _ => (None, None),
    }
}

fn failure_from_transaction_error(signature: Signature, err: &TransactionError) -> SubmitFailure {
    let (failed_instruction, program_error) = instruction_failure(err);
    SubmitFailure {
        signature: Some(signature),
        program_error,
        failed_instruction,
        logs: Vec::new(),
        message: err.to_string(),
    }
}

fn failure_from_client_error(signature: Option<Signature>, err: &ClientError) -> SubmitFailure {
    let (failed_instruction, program_error) = err
        .get_transaction_error()
        .map(|tx_err| instruction_failure(&tx_err))
        .unwrap_or_default();

    // Preflight failures carry the simulated program logs.
    let logs = match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data: RpcResponseErrorData::SendTransactionPreflightFailure(sim),
            ..
        }) => sim.logs.clone().unwrap_or_default(),
        _ => Vec::new(),
    };

    SubmitFailure {
        signature,
        program_error,
        failed_instruction,
        logs,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_code_keeps_its_instruction_index() {
        let err = TransactionError::InstructionError(2, InstructionError::Custom(1));
        assert_eq!(instruction_failure(&err), (Some(2), Some(1)));

        let err = TransactionError::InstructionError(3, InstructionError::InvalidAccountData);
        assert_eq!(instruction_failure(&err), (Some(3), None));

        assert_eq!(
            instruction_failure(&TransactionError::BlockhashNotFound),
            (None, None)
        );
    }

    #[test]
    fn landed_failure_carries_signature_and_index() {
        let signature = Signature::from([7u8; 64]);
        let err = TransactionError::InstructionError(4, InstructionError::Custom(0x2a));
        let failure = failure_from_transaction_error(signature, &err);

        assert_eq!(failure.signature, Some(signature));
        assert_eq!(failure.failed_instruction, Some(4));
        assert_eq!(failure.program_error, Some(0x2a));
        assert!(failure.logs.is_empty());
    }
}
