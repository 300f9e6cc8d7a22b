use std::process::ExitCode;

/// Process exit status.
///
/// - `Success` (0): the document was written to stdout
/// - `Failure` (1): no readable input was given; usage was printed
/// - `Error` (2): the input could not be documented (parse error, unsupported shape, ...)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// Missing or nonexistent input.
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
