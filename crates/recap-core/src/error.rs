use std::fmt;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InputNotFound,
    ConfigParseError,
    LogParseFailed,
    UnsupportedLogVersion,
    InvalidEndTime,
    VerificationFailed,
    LogWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InputNotFound => "E1001",
            Self::ConfigParseError => "E1002",
            Self::LogParseFailed => "E2001",
            Self::UnsupportedLogVersion => "E2002",
            Self::InvalidEndTime => "E2003",
            Self::VerificationFailed => "E3001",
            Self::LogWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InputNotFound => "Input file not found",
            Self::ConfigParseError => "Config file parse error",
            Self::LogParseFailed => "Record log parse error",
            Self::UnsupportedLogVersion => "Unsupported record log version",
            Self::InvalidEndTime => "End time precedes last record",
            Self::VerificationFailed => "Squashed replay does not match original",
            Self::LogWriteFailed => "Record log write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InputNotFound => Some("Check the path, or pass `-` to read from stdin."),
            Self::ConfigParseError => Some("Fix syntax in recap.toml and retry."),
            Self::LogParseFailed => Some("The reported line number points at the bad record."),
            Self::UnsupportedLogVersion => Some("Upgrade recap to read logs from newer writers."),
            Self::InvalidEndTime => {
                Some("Pass an --end-time at or after the last record, or omit it.")
            }
            Self::VerificationFailed => {
                Some("Report a bug with the input log attached; rerun with --no-verify to keep the output.")
            }
            Self::LogWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
