//! tixql error handling. There are three kinds of failures: connection
//! errors (fatal, only at startup), statement errors (recoverable, reported
//! per menu action), and invalid input (handled locally by re-prompting).

/// A tixql error.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Failed to establish the database connection. This is fatal: the
    /// process reports the diagnostic and exits. It is never produced once
    /// a session has been established.
    Connection(String),
    /// A statement failed to execute. This is recoverable: the current menu
    /// action is abandoned, and the session remains usable.
    Statement(String),
    /// Invalid user input.
    InvalidInput(String),
    /// An IO or terminal error.
    Io(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Connection(msg) => write!(f, "unable to connect to database: {msg}"),
            Error::Statement(msg) => write!(f, "statement failed: {msg}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

/// A tixql result returning Error.
pub type Result<T> = std::result::Result<T, Error>;

impl From<postgres::Error> for Error {
    fn from(err: postgres::Error) -> Self {
        Error::Statement(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for Error {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<log::ParseLevelError> for Error {
    fn from(err: log::ParseLevelError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::Io(err.to_string())
    }
}
