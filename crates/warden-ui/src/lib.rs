#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Warden admin console.
//!
//! Role-gated management screens for users, agents and admins, built with Yew.
//! Query, cache, pagination and mutation logic lives in DOM-free modules that
//! run natively under test; the components and browser transport compile only
//! for wasm32.

pub mod config;
pub mod core;
pub mod features;
pub mod services;
pub mod telemetry;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod components;

#[cfg(target_arch = "wasm32")]
pub use app::run_app;
