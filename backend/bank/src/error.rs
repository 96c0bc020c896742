use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Not signed in")]
    Unauthorized,

    #[error("Malformed row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Malformed select: {0}")]
    MalformedSelect(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),
}

impl BankError {
    /// Message suitable for showing back to the visitor, if the backend gave one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            BankError::Rejected { message, .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}
