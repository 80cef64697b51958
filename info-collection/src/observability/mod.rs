//! Structured logging
//!
//! Resolution, dispatch and export emit `tracing` events; this module
//! installs the subscriber that prints them.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
#[must_use]
pub const fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,info_collection=debug"
    } else {
        "info"
    }
}

/// Initialize logging
///
/// Sets up:
/// - JSON formatting in release builds, pretty formatting in debug builds
/// - Level filtering from `RUST_LOG`, falling back to [`default_filter`]
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
///
/// # Example
///
/// ```rust,no_run
/// use info_collection::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(default_filter()).is_ok());
    }
}
