//! Logging setup shared by binaries and tests.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, with this crate at
/// `info` unless overridden.
///
/// Returns an error if a global subscriber is already set.
pub fn try_init() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("site_i18n=info".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
