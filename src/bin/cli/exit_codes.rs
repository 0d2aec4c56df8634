//! Exit codes for the CLI tool.

use unipkg::{Error, ErrorKind};

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Package could not be decoded
pub const BAD_PACKAGE: i32 = 3;
/// Asset not found
pub const NOT_FOUND: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// GUID or path already in use
pub const COLLISION: i32 = 6;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadPackage,
    NotFound,
    IoError,
    Collision,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadPackage => BAD_PACKAGE,
            Self::NotFound => NOT_FOUND,
            Self::IoError => IO_ERROR,
            Self::Collision => COLLISION,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a library error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error.kind() {
        ErrorKind::Io => ExitCode::IoError,
        ErrorKind::Decode => ExitCode::BadPackage,
        ErrorKind::NotFound => ExitCode::NotFound,
        ErrorKind::Collision => ExitCode::Collision,
        ErrorKind::InvalidInput => ExitCode::BadArgs,
        ErrorKind::Limit | ErrorKind::UnsupportedMedia => ExitCode::FatalError,
        // Future error kinds - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
