//! Tracing bootstrap. Operational logs sit alongside the mandatory audit
//! trail (`meridian-audit`), never in place of it — audit events are the
//! compliance record; these spans are for debugging and ops dashboards.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `tracing` subscriber. Safe to call more than once; later
/// calls are no-ops if a global subscriber is already set.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
