use domain_name_query_types::NameError;
use thiserror::Error;

/// Reasons a message can fail to decode.
#[derive(Debug, Error)]
pub enum DnsError {
    /// Ran out of bytes while reading a field.
    #[error("truncated message: {0}")]
    Io(#[from] std::io::Error),

    #[error("message has QR=1, expected a query")]
    NotAQuery,

    #[error("expected exactly one question, found {0}")]
    QuestionCount(u16),

    #[error("invalid domain name: {0}")]
    Name(#[from] NameError),

    #[error("compression pointer to offset {0} does not point backwards")]
    BadPointer(u16),

    #[error("reserved label type {0:#04x}")]
    LabelType(u8),

    #[error("rdata length {declared} does not match the {actual} octets consumed")]
    RdataLength { declared: u16, actual: u64 },
}
