use std::fmt;
use std::num::{ParseFloatError, ParseIntError};

/// All fatal conditions a trajectory reader can report.
///
/// Clean exhaustion of a trajectory is *not* an error; readers report it as
/// `Ok(None)` from `next_frame`. Every variant here aborts iteration, after
/// which `close` remains safe to call.
#[derive(Debug)]
pub enum TrajError {
    /// Malformed or unsupported header/column layout.
    Format(String),
    /// Atom count or column schema changed between frames of one trajectory.
    Consistency {
        what: &'static str,
        expected: String,
        found: String,
    },
    /// End-of-stream in the middle of a frame, as opposed to a clean end
    /// between frames.
    Truncated(&'static str),
    /// A required external library or plugin is absent on this host.
    UnavailableBackend(&'static str),
    InvalidVectorLength { expected: usize, found: usize },
    InvalidNumberFormat(String),
    Io(std::io::Error),
}

impl fmt::Display for TrajError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrajError::Format(msg) => {
                write!(f, "malformed trajectory data: {msg}")
            }
            TrajError::Consistency {
                what,
                expected,
                found,
            } => {
                write!(
                    f,
                    "{what} changed between frames: was {expected}, now {found}"
                )
            }
            TrajError::Truncated(context) => {
                write!(f, "file ended unexpectedly while reading {context}")
            }
            TrajError::UnavailableBackend(backend) => {
                write!(f, "required backend is not available on this host: {backend}")
            }
            TrajError::InvalidVectorLength { expected, found } => {
                write!(f, "expected {expected} values on line, found {found}")
            }
            TrajError::InvalidNumberFormat(msg) => {
                write!(f, "invalid number format: {msg}")
            }
            TrajError::Io(e) => {
                write!(f, "i/o error: {e}")
            }
        }
    }
}

impl std::error::Error for TrajError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrajError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseFloatError> for TrajError {
    fn from(e: ParseFloatError) -> Self {
        TrajError::InvalidNumberFormat(e.to_string())
    }
}

impl From<ParseIntError> for TrajError {
    fn from(e: ParseIntError) -> Self {
        TrajError::InvalidNumberFormat(e.to_string())
    }
}

impl From<fast_float2::Error> for TrajError {
    fn from(_: fast_float2::Error) -> Self {
        TrajError::InvalidNumberFormat("invalid float".to_string())
    }
}

impl From<std::io::Error> for TrajError {
    fn from(e: std::io::Error) -> Self {
        TrajError::Io(e)
    }
}
