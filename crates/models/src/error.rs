use thiserror::Error;

#[derive(Error, Debug)]
pub enum CricketError {
    #[error("Invalid probability: {value}, must be between 0 and 100")]
    InvalidProbability { value: f64 },

    #[error("Win probabilities must sum to 100, got {team_a} + {team_b}")]
    UnbalancedProbability { team_a: u8, team_b: u8 },

    #[error("Invalid score range: max {max} must exceed min {min}")]
    InvalidScoreRange { min: u32, max: u32 },

    #[error("Invalid polling interval: {ms}ms")]
    InvalidInterval { ms: u64 },

    #[error("Snapshot generation failed: {reason}")]
    Generation { reason: String },

    #[error("No tokio runtime available to drive polling timers")]
    NoRuntime,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CricketError>;
