use thiserror::Error;

/// Everything that can go wrong while reading a dosing schedule.
///
/// All variants are recoverable: the caller shows the message and asks again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleSyntaxError {
    #[error("Empty dosing schedule")]
    EmptyInput,

    #[error("Unbalanced brackets in '{0}'")]
    UnbalancedBrackets(String),

    #[error("Expected a bracketed group, found '{0}'")]
    ExpectedGroup(String),

    #[error("Empty group '[]'")]
    EmptyGroup,

    #[error("Missing duration after 'x' in '{0}'")]
    MissingDuration(String),

    #[error("Unexpected text after group: '{0}'")]
    TrailingInput(String),

    #[error("Dose '{0}' has no matching duration")]
    UnpairedDose(String),

    #[error("Invalid dose: '{0}'")]
    InvalidDose(String),

    #[error("Dose must not be negative: '{0}'")]
    NegativeDose(String),

    #[error("Invalid duration: '{0}'")]
    InvalidDuration(String),

    #[error("Invalid time unit in '{0}' (expected h, d, w, mo or y)")]
    InvalidUnit(String),

    #[error("Invalid weekday code '{0}' (expected Su, M, Tu, W, Th, F, Sa)")]
    InvalidWeekday(String),
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Schedule syntax error: {0}")]
    Schedule(#[from] ScheduleSyntaxError),

    #[error("Parameter validation error: {0}")]
    Validation(String),
}

pub type SimResult<T> = Result<T, SimError>;
