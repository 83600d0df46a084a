//! Unified error type for the ledbus-lib crate.
//!
//! [`LedbusError`] wraps module-specific errors (`DecodeError`, `StripError`,
//! `BusError`, `BootstrapError`) and domain-specific error kinds (`Config`,
//! `Color`). `From` impls allow `?` to propagate across module boundaries
//! seamlessly.

use std::fmt;

use crate::bus::BusError;
use crate::message::DecodeError;
use crate::plc::BootstrapError;
use crate::strip::StripError;

/// Unified error type for ledbus-lib operations.
#[derive(Debug)]
pub enum LedbusError {
    /// Bus payload decoding error (message dropped, no state change).
    Decode(DecodeError),
    /// LED strip backend error (init or hardware write).
    Strip(StripError),
    /// Bus connection or subscription error.
    Bus(BusError),
    /// Powerline bootstrap error (fatal to startup).
    Bootstrap(BootstrapError),
    /// Standard I/O error (config persistence).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Color parsing error.
    Color(String),
}

impl fmt::Display for LedbusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedbusError::Decode(e) => write!(f, "{e}"),
            LedbusError::Strip(e) => write!(f, "{e}"),
            LedbusError::Bus(e) => write!(f, "{e}"),
            LedbusError::Bootstrap(e) => write!(f, "{e}"),
            LedbusError::Io(e) => write!(f, "I/O error: {e}"),
            LedbusError::Config(e) => write!(f, "Config error: {e}"),
            LedbusError::Color(e) => write!(f, "Color error: {e}"),
        }
    }
}

impl std::error::Error for LedbusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedbusError::Decode(e) => Some(e),
            LedbusError::Strip(e) => Some(e),
            LedbusError::Bus(e) => Some(e),
            LedbusError::Bootstrap(e) => Some(e),
            LedbusError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecodeError> for LedbusError {
    fn from(e: DecodeError) -> Self {
        LedbusError::Decode(e)
    }
}

impl From<StripError> for LedbusError {
    fn from(e: StripError) -> Self {
        LedbusError::Strip(e)
    }
}

impl From<BusError> for LedbusError {
    fn from(e: BusError) -> Self {
        LedbusError::Bus(e)
    }
}

impl From<BootstrapError> for LedbusError {
    fn from(e: BootstrapError) -> Self {
        LedbusError::Bootstrap(e)
    }
}

impl From<std::io::Error> for LedbusError {
    fn from(e: std::io::Error) -> Self {
        LedbusError::Io(e)
    }
}

/// Crate-level Result alias using [`LedbusError`].
pub type Result<T> = std::result::Result<T, LedbusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_decode_error() {
        let e: LedbusError = DecodeError::Syntax("bad json".into()).into();
        assert!(matches!(e, LedbusError::Decode(DecodeError::Syntax(_))));
    }

    #[test]
    fn from_strip_error() {
        let e: LedbusError = StripError::WriteFailed("render".into()).into();
        assert!(matches!(e, LedbusError::Strip(StripError::WriteFailed(_))));
    }

    #[test]
    fn from_bootstrap_error() {
        let e: LedbusError = BootstrapError::TimedOut(30).into();
        assert!(matches!(
            e,
            LedbusError::Bootstrap(BootstrapError::TimedOut(30))
        ));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: LedbusError = io_err.into();
        assert!(matches!(e, LedbusError::Io(_)));
    }

    #[test]
    fn display_config_error() {
        let e = LedbusError::Config("invalid pixel count".into());
        assert_eq!(e.to_string(), "Config error: invalid pixel count");
    }

    #[test]
    fn display_color_error() {
        let e = LedbusError::Color("bad hex".into());
        assert_eq!(e.to_string(), "Color error: bad hex");
    }

    #[test]
    fn source_chains_strip_error() {
        let e = LedbusError::Strip(StripError::WriteFailed("timeout".into()));
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("timeout"));
    }

    #[test]
    fn source_none_for_string_variants() {
        let e = LedbusError::Config("test".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_decode_to_ledbus() {
        fn inner() -> crate::message::Result<()> {
            Err(DecodeError::Syntax("nope".into()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, LedbusError::Decode(DecodeError::Syntax(_))));
    }

    #[test]
    fn question_mark_propagation_io_to_ledbus() {
        fn inner() -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "nope"))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, LedbusError::Io(_)));
    }
}
