//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes; anything else exits with 1.

use std::fmt;

use mediadiary_core::DiaryError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, store)
    NotFound { message: String, hint: String },

    /// Command needs a signed-in user
    NotSignedIn,

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => write!(f, "{}\n{}", message, hint),
            CliError::NotSignedIn => write!(
                f,
                "No user is signed in\nHint: Run `mediadiary login --uid <UID>` first."
            ),
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::NotSignedIn => exit_codes::NOT_SIGNED_IN,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }
}

/// Exit code for any error bubbled up to `main`.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    if let Some(cli_error) = error.downcast_ref::<CliError>() {
        return cli_error.exit_code();
    }
    match error.downcast_ref::<DiaryError>() {
        Some(DiaryError::NotSignedIn) => exit_codes::NOT_SIGNED_IN,
        Some(DiaryError::Validation(_)) | Some(DiaryError::InvalidInput(_)) => {
            exit_codes::INVALID_INPUT
        }
        Some(DiaryError::NotFound(_)) => exit_codes::NOT_FOUND,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let err = anyhow::Error::new(CliError::invalid_input("bad"));
        assert_eq!(exit_code_for(&err), exit_codes::INVALID_INPUT);

        let err = anyhow::Error::new(DiaryError::NotSignedIn);
        assert_eq!(exit_code_for(&err), exit_codes::NOT_SIGNED_IN);

        let err = anyhow::Error::new(DiaryError::Write("boom".to_string()));
        assert_eq!(exit_code_for(&err), 1);
    }
}
