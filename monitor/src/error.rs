use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("config error: {0}")]
    Config(String),

    #[error("verification error: {0}")]
    Verify(#[from] circle_verify::VerifyError),
}
