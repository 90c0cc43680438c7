use thiserror::Error;

/// Problems with an uploaded department table.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid number '{value}' in column {column} (row {row})")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Division by zero: {column} is 0 for department {department} (row {row})")]
    DivisionByZero {
        row: usize,
        column: String,
        department: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the chat-completion service.
#[derive(Error, Debug)]
pub enum NarrativeServiceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
