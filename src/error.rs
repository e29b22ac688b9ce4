//! Error types shared by every notation parser and interval constructor.

/// Errors raised while parsing notations or building intervals
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TheoryError {
    /// Malformed input to one of the `from_notation` parsers
    #[error("Cannot parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Diatonic number and chromatic size do not agree under the quality table
    #[error("Invalid interval {number}: {reason}")]
    InvalidInterval { number: i32, reason: String },
}

impl TheoryError {
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        TheoryError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_interval(number: i32, reason: impl Into<String>) -> Self {
        TheoryError::InvalidInterval {
            number,
            reason: reason.into(),
        }
    }

    /// True for malformed-notation failures
    pub fn is_parse(&self) -> bool {
        matches!(self, TheoryError::Parse { .. })
    }

    /// True for number/quality consistency failures
    pub fn is_invalid_interval(&self) -> bool {
        matches!(self, TheoryError::InvalidInterval { .. })
    }
}

pub type Result<T> = std::result::Result<T, TheoryError>;
