//! Managed collection screens: definitions, row actions and view state.
pub mod actions;
pub mod catalog;
pub mod dispatch;
pub mod state;

#[cfg(target_arch = "wasm32")]
pub(crate) mod view;
