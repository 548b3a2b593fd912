//! Feature modules.
pub mod collections;
