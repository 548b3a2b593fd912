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
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Warden console wasm entry point; natively it prints what the browser build serves.

#[cfg(target_arch = "wasm32")]
fn main() -> Result<(), std::io::Error> {
    warden_ui::run_app();
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn native_banner(config: &warden_ui::config::ConsoleConfig) -> String {
    use std::fmt::Write as _;
    use warden_api_models::Role;
    use warden_ui::features::collections::catalog::accessible_collections;

    let mut banner = String::from(
        "warden-ui is the browser console; serve it with `trunk serve` or build for wasm32-unknown-unknown.\n",
    );
    let _ = writeln!(banner, "API base URL: {}", config.api_base_url);
    for role in [Role::SuperAdmin, Role::Admin, Role::Agent] {
        let screens: Vec<String> = accessible_collections(role)
            .iter()
            .map(|kind| format!("/manage/{}", kind.slug()))
            .collect();
        let _ = writeln!(banner, "{:<10} {}", role.label(), screens.join(", "));
    }
    banner
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), std::io::Error> {
    use std::io::{self, Write};

    let banner = native_banner(&warden_ui::config::ConsoleConfig::default());
    io::stderr().lock().write_all(banner.as_bytes())
}
