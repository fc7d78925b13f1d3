//! Process exit codes
//!
//! Every command maps its outcome onto this fixed scheme so scripts can
//! branch on the code. Usage mistakes (unknown subcommand, missing
//! arguments) exit 2 via clap, never 0.

use bkt_core::Error;

/// Exit codes for the bkt binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    /// Operation failed (remote error, I/O error, sweep with failures)
    GeneralError = 1,
    /// Invalid flags or arguments
    UsageError = 2,
    /// Client could not be constructed or the endpoint is unreachable
    NetworkError = 3,
    /// The invocation deadline elapsed
    Cancelled = 4,
    /// Object, bucket, or profile does not exist
    NotFound = 5,
}

impl ExitCode {
    /// Map an operation error onto its exit code
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::NotFound(_) | Error::ProfileNotFound(_) => ExitCode::NotFound,
            Error::Cancelled(_) => ExitCode::Cancelled,
            _ => ExitCode::GeneralError,
        }
    }

    /// Terminate the process with this code
    pub fn exit(self) -> ! {
        std::process::exit(self as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values_are_stable() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::GeneralError as i32, 1);
        assert_eq!(ExitCode::UsageError as i32, 2);
        assert_eq!(ExitCode::NetworkError as i32, 3);
        assert_eq!(ExitCode::Cancelled as i32, 4);
        assert_eq!(ExitCode::NotFound as i32, 5);
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ExitCode::from_error(&Error::NotFound("x".to_string())),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from_error(&Error::ProfileNotFound("p".to_string())),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from_error(&Error::Cancelled("deadline".to_string())),
            ExitCode::Cancelled
        );
        assert_eq!(
            ExitCode::from_error(&Error::NotEmpty("b".to_string())),
            ExitCode::GeneralError
        );
        assert_eq!(
            ExitCode::from_error(&Error::RemoteWrite("w".to_string())),
            ExitCode::GeneralError
        );
    }
}
