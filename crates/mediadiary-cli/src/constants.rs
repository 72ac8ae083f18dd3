//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, store).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Command needs a signed-in user.
    pub const NOT_SIGNED_IN: i32 = 5;
}

/// Environment variable holding the `tracing` filter.
pub const LOG_ENV: &str = "MEDIADIARY_LOG";

/// Filter used when neither the environment nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "warn";
