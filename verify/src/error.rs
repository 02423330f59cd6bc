use thiserror::Error;

/// Caller-misuse errors. A failed verification is a normal return value,
/// never one of these.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("challenge {0} is not active")]
    ChallengeInactive(u64),

    #[error("challenge {id} uses method {expected}, not {got}")]
    MethodMismatch {
        id: u64,
        expected: String,
        got: String,
    },
}
