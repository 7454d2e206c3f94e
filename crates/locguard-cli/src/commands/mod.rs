//! Subcommand implementations.

pub mod check;
pub mod completion;
pub mod ls;
pub mod mkdir;
pub mod read;
pub mod rm;
pub mod sanitize;
pub mod stat;
pub mod write;
