use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    #[error("Frame too large: {size} bytes (max {max_size})")]
    FrameTooLarge { size: usize, max_size: usize },

    // Connection errors
    #[error("Not connected to reader service")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("No response from reader within {0}ms")]
    ReaderTimeout(u64),

    // Enrollment errors
    #[error("Enrollment already in progress for member {0}")]
    EnrollmentInProgress(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Store errors
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Attendance write failed: {0}")]
    AttendanceWrite(String),

    #[error("Store error: {0}")]
    Store(String),

    // Validation errors
    #[error("Invalid tenant id: {0}")]
    InvalidTenantId(String),

    #[error("Invalid member id: {0}")]
    InvalidMemberId(String),

    #[error("Invalid quality score: {0}")]
    InvalidQuality(u8),

    #[error("Invalid confidence value: {0}")]
    InvalidConfidence(f64),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
