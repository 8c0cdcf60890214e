use tracing::error;

use crate::keepers::CycleError;

/// Single reporting path for failures the keeper will not recover from.
///
/// Logs the error with every recovered program log line. Callers terminate
/// afterwards.
pub fn report(err: &CycleError) {
    match err {
        CycleError::Fatal { op, failure } => {
            error!(
                op,
                signature = ?failure.signature.map(|s| s.to_string()),
                program_error = ?failure.program_error,
                message = %failure.message,
                "fatal submission failure"
            );
            for (idx, line) in failure.logs.iter().enumerate() {
                error!(op, idx, log = %line, "program log");
            }
        }
        other => error!(error = %other, "fatal keeper error"),
    }
}
