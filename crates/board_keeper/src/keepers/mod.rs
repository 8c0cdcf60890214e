use board_lib::{
    client::transport::{SubmitFailure, Transport},
    errors::{Classification, KnownProgramError, classify, program_error_code},
    storage::{SubmissionRecord, SubmissionStatus},
};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use thiserror::Error;
use tracing::{debug, info};

use crate::App;

pub mod close_automation;
pub mod deploy;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("{op} failed: {failure}")]
    Fatal {
        op: &'static str,
        failure: SubmitFailure,
    },
    #[error("miner account {address} is malformed: {reason}")]
    MalformedMiner { address: Pubkey, reason: String },
    /// Account reads failed; the next cycle may succeed.
    #[error(transparent)]
    Rpc(#[from] anyhow::Error),
}

impl CycleError {
    /// Whether the process should stop after reporting this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CycleError::Rpc(_))
    }
}

/// Classify a failed submission of `instructions`, recovering program logs
/// first when the failure carries none. Benign duplicates come back as `Ok`.
pub(crate) fn resolve_failure<T: Transport>(
    app: &App<T>,
    op: &'static str,
    instructions: &[Instruction],
    mut failure: SubmitFailure,
    mut record: SubmissionRecord,
) -> Result<KnownProgramError, CycleError> {
    if failure.logs.is_empty() {
        if let Some(signature) = failure.signature {
            match app.transport().fetch_logs(&signature) {
                Ok(Some(logs)) => failure.logs = logs,
                Ok(None) => {}
                Err(err) => debug!(op, error = %err, "could not recover transaction logs"),
            }
        }
    }

    record.signature = failure.signature.map(|s| s.to_string());
    let program_id = &app.settings().program_id;
    record.error_code =
        program_error_code(&failure, program_id, instructions).or(failure.program_error);
    record.error_message = Some(failure.message.clone());

    match classify(&failure, program_id, instructions, op) {
        Classification::BenignDuplicate(code) => {
            info!(op, ?code, "program reports work already settled, treating as success");
            record.status = SubmissionStatus::Benign;
            app.journal_record(&record);
            Ok(code)
        }
        Classification::Fatal => {
            record.status = SubmissionStatus::Failed;
            app.journal_record(&record);
            Err(CycleError::Fatal { op, failure })
        }
    }
}
