//! Error definitions.
use std::error::Error;
use std::{fmt, result};

/// A specialized Result type for this library.
pub type Result<T, E = FindSimsubError> = result::Result<T, E>;

/// Errors in find-simsub.
#[derive(Debug)]
pub enum FindSimsubError {
    /// Contains [`InputError`].
    Input(InputError),
    /// Contains [`InsufficientDataError`].
    InsufficientData(InsufficientDataError),
    /// Contains [`ConfigMismatchError`].
    ConfigMismatch(ConfigMismatchError),
    /// Contains [`CancelledError`].
    Cancelled(CancelledError),
}

impl fmt::Display for FindSimsubError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Input(e) => e.fmt(f),
            Self::InsufficientData(e) => e.fmt(f),
            Self::ConfigMismatch(e) => e.fmt(f),
            Self::Cancelled(e) => e.fmt(f),
        }
    }
}

impl Error for FindSimsubError {}

impl FindSimsubError {
    pub(crate) fn input<S: Into<String>>(msg: S) -> Self {
        Self::Input(InputError { msg: msg.into() })
    }

    pub(crate) const fn insufficient_data(num_documents: usize) -> Self {
        Self::InsufficientData(InsufficientDataError { num_documents })
    }

    pub(crate) fn config_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::ConfigMismatch(ConfigMismatchError { msg: msg.into() })
    }

    pub(crate) const fn cancelled() -> Self {
        Self::Cancelled(CancelledError)
    }
}

/// Error used when an input argument or document is invalid.
#[derive(Debug)]
pub struct InputError {
    msg: String,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InputError: {}", self.msg)
    }
}

/// Error used when a checking run has fewer than two documents.
#[derive(Debug)]
pub struct InsufficientDataError {
    num_documents: usize,
}

impl InsufficientDataError {
    /// Number of documents the run was invoked with.
    pub const fn num_documents(&self) -> usize {
        self.num_documents
    }
}

impl fmt::Display for InsufficientDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "InsufficientDataError: a checking run requires at least 2 documents, but got {}.",
            self.num_documents
        )
    }
}

/// Error used when signature configurations do not line up within one run.
#[derive(Debug)]
pub struct ConfigMismatchError {
    msg: String,
}

impl fmt::Display for ConfigMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ConfigMismatchError: {}", self.msg)
    }
}

/// Error used when a run observes its cancellation flag.
#[derive(Debug)]
pub struct CancelledError;

impl fmt::Display for CancelledError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CancelledError: the checking run was cancelled.")
    }
}
