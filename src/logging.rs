//! Logging initialization utilities.

use env_logger::Env;

/// Initialize logging with a default filter level.
///
/// The library only emits through the `log` facade; binaries and tests that
/// want to see the output call this once at startup. `RUST_LOG` overrides the
/// default `info` level.
pub fn init() {
    let env = Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();
}

/// Like [`init`], but tolerates a logger that is already installed.
pub fn try_init() -> bool {
    let env = Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).try_init().is_ok()
}
