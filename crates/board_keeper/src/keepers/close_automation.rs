use board_lib::{
    client::{program::automation_exists, transport::Transport},
    errors::KnownProgramError,
    instruction::{close_automation, compute_budget_instructions},
    storage::{SubmissionRecord, SubmissionStatus},
};
use solana_sdk::signature::{Signature, Signer};
use tracing::info;

use crate::{
    App,
    keepers::{CycleError, resolve_failure},
    short_signature,
};

const OP: &str = "close_automation";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    NoSigner,
    NothingToClose,
    Closed(Signature),
    BenignDuplicate(KnownProgramError),
}

/// One-shot reset of the signer's automation account.
pub fn run_one<T: Transport>(app: &App<T>) -> Result<CloseOutcome, CycleError> {
    let Some(signer) = app.signer() else {
        return Ok(CloseOutcome::NoSigner);
    };

    let settings = app.settings();
    let authority = signer.pubkey();
    if !automation_exists(app.transport(), &settings.program_id, &authority)? {
        info!(%authority, "no automation account to close");
        return Ok(CloseOutcome::NothingToClose);
    }

    let mut instructions = Vec::from(compute_budget_instructions(
        settings.cu_limit,
        settings.cu_price_micro_lamports,
    ));
    instructions.push(close_automation(&settings.program_id, &authority));

    let mut record = SubmissionRecord::new(OP, SubmissionStatus::Success);
    match app.transport().submit(&instructions, signer) {
        Ok(signature) => {
            info!(%authority, signature = %short_signature(&signature), "automation closed");
            record.signature = Some(signature.to_string());
            app.journal_record(&record);
            Ok(CloseOutcome::Closed(signature))
        }
        Err(failure) => resolve_failure(app, OP, &instructions, failure, record)
            .map(CloseOutcome::BenignDuplicate),
    }
}
