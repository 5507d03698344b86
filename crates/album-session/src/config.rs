//! Configuration for the session store.

use std::time::Duration;

/// Default idle lifetime of a session (5 minutes).
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(300);

/// Default name of the cookie carrying the session identifier.
pub const DEFAULT_COOKIE_NAME: &str = "baophotos";

/// Smallest sweep period the background task will use.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for the session store.
///
/// Fixed when the [`SessionManager`](crate::SessionManager) is constructed.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the cookie the HTTP layer uses to carry the identifier.
    pub cookie_name: String,

    /// Sessions idle for at least this long are evicted by the sweeper.
    pub max_idle: Duration,

    /// Period of the background sweep. `None` means "same as `max_idle`".
    pub sweep_interval: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            max_idle: DEFAULT_MAX_IDLE,
            sweep_interval: None,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the idle lifetime.
    pub fn with_max_idle(mut self, max_idle: Duration) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// Set an explicit sweep period.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// The effective sweep period (never zero).
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
            .unwrap_or(self.max_idle)
            .max(MIN_SWEEP_INTERVAL)
    }

    /// The idle lifetime in whole seconds, as used for cookie `Max-Age`.
    pub fn max_idle_secs(&self) -> u64 {
        self.max_idle.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.cookie_name, "baophotos");
        assert_eq!(config.max_idle, Duration::from_secs(300));
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.max_idle_secs(), 300);
    }

    #[test]
    fn test_sweep_interval_follows_max_idle() {
        let config = SessionConfig::new().with_max_idle(Duration::from_secs(30));
        assert_eq!(config.sweep_interval(), Duration::from_secs(30));

        let config = config.with_sweep_interval(Duration::from_secs(5));
        assert_eq!(config.sweep_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_sweep_interval_never_zero() {
        let config = SessionConfig::new().with_max_idle(Duration::ZERO);
        assert!(!config.sweep_interval().is_zero());
    }
}
