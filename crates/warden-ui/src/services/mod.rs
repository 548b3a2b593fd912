//! Remote API access.
//!
//! # Design
//! - Everything above the `Transport` trait is DOM-free and tested natively.
//! - The browser transport is the only wasm-specific piece.
pub mod auth;
pub mod client;
#[cfg(target_arch = "wasm32")]
pub mod http;
pub mod transport;
