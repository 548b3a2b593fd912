//! Core, DOM-free primitives for the management console.
pub mod cache;
pub mod debounce;
pub mod descriptor;
pub mod pagination;
pub mod password_reset;
pub mod session;
pub mod store;
