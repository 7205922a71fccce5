//! Mapping request targets onto the document root and opening what they
//! point at.

pub mod access;
pub mod resolver;

pub use access::{open, FileError, OpenedFile};
pub use resolver::resolve;
