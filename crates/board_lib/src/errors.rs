use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::client::transport::SubmitFailure;

const CUSTOM_ERROR_MARKER: &str = "custom program error: 0x";
const INSTRUCTION_MARKER: &str = "Instruction ";

/// Program error codes the keeper knows how to interpret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum KnownProgramError {
    AmountTooSmall = 0x0,
    /// The checkpoint was already applied, or the round cannot be settled yet.
    AlreadySettled = 0x1,
}

impl KnownProgramError {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0x0 => Some(Self::AmountTooSmall),
            0x1 => Some(Self::AlreadySettled),
            _ => None,
        }
    }

    pub fn is_benign(self) -> bool {
        matches!(self, Self::AlreadySettled)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Safe to treat as success.
    BenignDuplicate(KnownProgramError),
    Fatal,
}

/// Custom error code raised by `program_id` while executing `instructions`.
///
/// A code is only accepted when it can be attributed to `program_id`: through
/// the blamed instruction index, a `Program <id> failed:` log line, or the
/// indexed message text. Codes raised by any other program yield `None`.
pub fn program_error_code(
    failure: &SubmitFailure,
    program_id: &Pubkey,
    instructions: &[Instruction],
) -> Option<u32> {
    let blamed_ours = failure
        .failed_instruction
        .or_else(|| parse_failed_instruction(&failure.message))
        .and_then(|idx| instructions.get(usize::from(idx)))
        .map(|ix| ix.program_id == *program_id);

    match blamed_ours {
        Some(false) => None,
        Some(true) => failure
            .program_error
            .or_else(|| failed_line_code(&failure.logs, program_id))
            .or_else(|| parse_custom_error(&failure.message)),
        None => failed_line_code(&failure.logs, program_id),
    }
}

fn failed_line_code(logs: &[String], program_id: &Pubkey) -> Option<u32> {
    let prefix = format!("Program {} failed: ", program_id);
    logs.iter()
        .find_map(|line| line.strip_prefix(prefix.as_str()).and_then(parse_custom_error))
}

pub fn parse_custom_error(text: &str) -> Option<u32> {
    let start = text.find(CUSTOM_ERROR_MARKER)? + CUSTOM_ERROR_MARKER.len();
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    u32::from_str_radix(&digits, 16).ok()
}

/// Instruction index from runtime text such as `Error processing Instruction 2: ...`.
pub fn parse_failed_instruction(text: &str) -> Option<u8> {
    let start = text.find(INSTRUCTION_MARKER)? + INSTRUCTION_MARKER.len();
    let rest = &text[start..];
    let digits = rest.split(':').next()?;
    digits.trim().parse().ok()
}

pub fn classify(
    failure: &SubmitFailure,
    program_id: &Pubkey,
    instructions: &[Instruction],
    op: &str,
) -> Classification {
    let Some(code) = program_error_code(failure, program_id, instructions) else {
        tracing::debug!(
            op,
            failed_instruction = ?failure.failed_instruction,
            "no error code attributable to the board program"
        );
        return Classification::Fatal;
    };

    match KnownProgramError::from_code(code) {
        Some(known) if known.is_benign() => Classification::BenignDuplicate(known),
        known => {
            tracing::debug!(op, code, ?known, "program error is not benign");
            Classification::Fatal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{DeployArgs, checkpoint, deploy, fee_transfer};

    struct Tx {
        program_id: Pubkey,
        instructions: Vec<Instruction>,
    }

    /// checkpoint, fee transfer, deploy
    fn tx() -> Tx {
        let program_id = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let instructions = vec![
            checkpoint(&program_id, &authority, &authority, 8),
            fee_transfer(&authority, &Pubkey::new_unique(), 10_000),
            deploy(&program_id, &authority, &authority, 9, DeployArgs { amount: 5, mask: 1 }),
        ];
        Tx {
            program_id,
            instructions,
        }
    }

    fn with_logs(logs: &[String]) -> SubmitFailure {
        SubmitFailure {
            logs: logs.to_vec(),
            ..SubmitFailure::new("simulation failed")
        }
    }

    fn classify_in(tx: &Tx, failure: &SubmitFailure) -> Classification {
        classify(failure, &tx.program_id, &tx.instructions, "deploy")
    }

    #[test]
    fn parses_custom_error_from_log_line() {
        let line = format!("Program {} failed: custom program error: 0x1", Pubkey::new_unique());
        assert_eq!(parse_custom_error(&line), Some(1));
        assert_eq!(parse_custom_error("custom program error: 0x1b, rest"), Some(0x1b));
        assert_eq!(parse_custom_error("Program log: ok"), None);
        assert_eq!(parse_custom_error("custom program error: 0x"), None);
    }

    #[test]
    fn parses_instruction_index_from_message() {
        let msg = "Error processing Instruction 2: custom program error: 0x1";
        assert_eq!(parse_failed_instruction(msg), Some(2));
        assert_eq!(parse_failed_instruction("blockhash not found"), None);
    }

    #[test]
    fn benign_code_from_board_program_is_duplicate() {
        let tx = tx();
        let failure = with_logs(&[
            "Program log: Instruction: Checkpoint".to_string(),
            format!("Program {} failed: custom program error: 0x1", tx.program_id),
        ]);
        assert_eq!(
            classify_in(&tx, &failure),
            Classification::BenignDuplicate(KnownProgramError::AlreadySettled)
        );
    }

    #[test]
    fn same_code_from_system_program_is_fatal() {
        let tx = tx();
        let failure = SubmitFailure {
            program_error: Some(1),
            failed_instruction: Some(1),
            ..with_logs(&[
                "Transfer: insufficient lamports 5000, need 10000".to_string(),
                "Program 11111111111111111111111111111111 failed: custom program error: 0x1"
                    .to_string(),
            ])
        };
        assert_eq!(classify_in(&tx, &failure), Classification::Fatal);

        let unindexed = SubmitFailure {
            failed_instruction: None,
            ..failure
        };
        assert_eq!(classify_in(&tx, &unindexed), Classification::Fatal);
    }

    #[test]
    fn structured_code_wins_over_logs() {
        let tx = tx();
        let failure = SubmitFailure {
            program_error: Some(0x0),
            failed_instruction: Some(2),
            ..with_logs(&[format!(
                "Program {} failed: custom program error: 0x1",
                tx.program_id
            )])
        };
        assert_eq!(classify_in(&tx, &failure), Classification::Fatal);
    }

    #[test]
    fn indexed_message_is_last_resort() {
        let tx = tx();
        let ours = SubmitFailure::new("Error processing Instruction 0: custom program error: 0x1");
        assert_eq!(
            classify_in(&tx, &ours),
            Classification::BenignDuplicate(KnownProgramError::AlreadySettled)
        );

        let transfer =
            SubmitFailure::new("Error processing Instruction 1: custom program error: 0x1");
        assert_eq!(classify_in(&tx, &transfer), Classification::Fatal);

        let unattributed = SubmitFailure::new("custom program error: 0x1");
        assert_eq!(classify_in(&tx, &unattributed), Classification::Fatal);
    }

    #[test]
    fn unknown_or_missing_codes_are_fatal() {
        let tx = tx();
        assert_eq!(
            classify_in(&tx, &SubmitFailure::new("blockhash not found")),
            Classification::Fatal
        );
        let failure = with_logs(&[format!(
            "Program {} failed: custom program error: 0x2a",
            tx.program_id
        )]);
        assert_eq!(classify_in(&tx, &failure), Classification::Fatal);
    }
}
