use thiserror::Error;

/// Errors surfaced by the task core and its persistence layer.
///
/// `Display` renders the human-readable message only; [`AppError::code`]
/// carries the stable machine code the CLI prefixes it with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("task with ID {0} not found")]
    NotFound(u64),
    #[error("unknown priority: {0}")]
    InvalidPriority(String),
    #[error("reminder time cannot be after due date")]
    InvalidTimeOrder,
    #[error("invalid date time format: {0}")]
    InvalidDateFormat(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    InvalidData(String),
    #[error("{0}")]
    Io(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidPriority(_) => "invalid_priority",
            Self::InvalidTimeOrder => "invalid_time_order",
            Self::InvalidDateFormat(_) => "invalid_date_format",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    /// `"<code> - <message>"`, the form printed after `ERROR:` by the CLI.
    pub fn report(&self) -> String {
        format!("{} - {}", self.code(), self)
    }
}
