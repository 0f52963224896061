//! Error types of the option core.

use std::io;

use thiserror::Error;

/// Codec and registry failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("option {name} ({code}) at offset {offset}: length {length} exceeds the buffer")]
    BogusLength {
        name: String,
        code: u32,
        offset: usize,
        length: usize,
    },
    #[error("option buffer truncated at offset {offset}")]
    Truncated { offset: usize },
    #[error("encapsulated {space} options in {name} are malformed")]
    BadEncapsulation { space: String, name: String },
    #[error("no option space named {0}")]
    UnknownSpace(String),
    #[error("option space {0} already exists")]
    DuplicateSpace(String),
    #[error("unsupported field width {0}")]
    BadFieldWidth(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Recoverable evaluation failures.
///
/// Callers treat any of these as "no value" and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("expression has no value")]
    NoValue,
    #[error("{op} opcode in evaluate_{entry}_expression")]
    WrongKind {
        entry: &'static str,
        op: &'static str,
    },
    #[error("binding type {found} in evaluate_{entry}_expression")]
    TypeMismatch {
        entry: &'static str,
        found: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("no such variable: {0}")]
    UnknownVariable(String),
    #[error("{0}: no such function")]
    NoSuchFunction(String),
    #[error("{0}: not a function")]
    NotAFunction(String),
    #[error("{name}: too {which} arguments")]
    ArgumentCount { name: String, which: &'static str },
    #[error("{name} needs {needed} bytes, only {available} present")]
    TooShort {
        name: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("{0} is not available in this context")]
    Unavailable(&'static str),
    #[error("invalid width {width} in {name}")]
    BadWidth { name: &'static str, width: u64 },
    #[error("lease has already expired")]
    LeaseExpired,
    #[error("host unknown: {0}")]
    HostUnknown(String),
    #[error("function {0} did not return a value")]
    NoReturnValue(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub type EvalResult<T> = std::result::Result<T, EvalError>;
