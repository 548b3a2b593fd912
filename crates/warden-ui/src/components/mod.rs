//! Presentational components shared by the console screens.

pub(crate) mod auth;
pub(crate) mod empty_state;
pub(crate) mod mutation_dialog;
pub(crate) mod pagination;
pub(crate) mod search_input;
pub(crate) mod shell;
pub(crate) mod toast;
