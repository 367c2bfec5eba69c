//! Log subscriber setup for hosts that don't install their own.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber writing to stderr.
///
/// Filtering follows `RUST_LOG`. With `json` set, events are emitted as
/// one JSON object per line. Calling this again after a subscriber is
/// installed does nothing.
pub fn init(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);

    let result = if json { builder.json().try_init() } else { builder.try_init() };

    if result.is_ok() {
        tracing::debug!(json, "log subscriber installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
        tracing::info!("still logging");
    }
}
