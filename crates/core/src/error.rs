//! Validation errors raised by the data models.

/// Errors produced when a model rejects its input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// A required text field was blank
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// Month key is not of the form `YYYY-MM`
    #[error("Invalid month key '{0}', expected YYYY-MM")]
    InvalidMonthKey(String),

    /// Requested month length is not a real month length
    #[error("Invalid days in month: {0} (expected 28-31)")]
    InvalidMonthLength(usize),

    /// Day index outside the month array
    #[error("Day index {index} out of range for month of {len} days")]
    DayOutOfRange {
        /// Requested index
        index: usize,
        /// Length of the month array
        len: usize,
    },

    /// Money amount is negative or not finite
    #[error("Invalid {field}: {value}")]
    InvalidAmount {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f64,
    },
}

/// Trimmed `value`, or [`CoreError::EmptyField`] if nothing is left.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}
