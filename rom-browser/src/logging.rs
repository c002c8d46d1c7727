//! Logging setup for binaries embedding the browser.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host.

/// Default filter: info+ for the browser crates, warn+ for everything else.
pub const DEFAULT_FILTER: &str = "rom_browser=info,rom_picker=info,warn";

/// Initialize a tracing subscriber honoring `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    install(filter, false);
}

/// Initialize a tracing subscriber with a custom filter
#[cfg(feature = "tracing")]
pub fn init_tracing_with_filter(filter: &str) {
    install(tracing_subscriber::EnvFilter::new(filter), false);
}

/// Initialize tracing for development: debug+ for the browser crates, with
/// source locations.
#[cfg(feature = "tracing")]
pub fn init_tracing_dev() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rom_browser=debug,rom_picker=debug,info".into());
    install(filter, true);
}

#[cfg(feature = "tracing")]
fn install(filter: tracing_subscriber::EnvFilter, verbose: bool) {
    // Logs go to stderr; stdout belongs to the listing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .try_init();
}

// Fallback implementations when tracing is not available
/// Without the `tracing` feature this only prints a warning.
#[cfg(not(feature = "tracing"))]
pub fn init_tracing() {
    eprintln!("Warning: tracing feature not enabled, logging disabled");
}

/// Without the `tracing` feature this only prints a warning.
#[cfg(not(feature = "tracing"))]
pub fn init_tracing_with_filter(_filter: &str) {
    eprintln!("Warning: tracing feature not enabled, logging disabled");
}

/// Without the `tracing` feature this only prints a warning.
#[cfg(not(feature = "tracing"))]
pub fn init_tracing_dev() {
    eprintln!("Warning: tracing feature not enabled, logging disabled");
}
