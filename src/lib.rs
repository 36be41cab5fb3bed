#![warn(clippy::all)]

pub mod error;
pub mod input;
pub mod session;
pub mod shell;

pub use error::{Error, Result};
pub use session::Session;
pub use shell::Shell;
