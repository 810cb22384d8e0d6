//! Runtime configuration
//!
//! All sections have defaults, so an empty TOML document is a valid config.
//!
//! ```toml
//! [resolver]
//! max_redirects = 10
//! hook_timeout_ms = 5000
//!
//! [notifications]
//! ttl_ms = 3000
//!
//! [logging]
//! profile = "production"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{HuddleError, Result};
use crate::logging_facility::Profile;

/// Default bound on transitive redirects per navigation
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Default notification lifetime
pub const DEFAULT_TTL_MS: u64 = 3000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuddleConfig {
    pub resolver: ResolverConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

/// Transition resolver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Redirects allowed per `navigate` call before `RedirectLoop`
    pub max_redirects: usize,
    /// Per-hook timeout; `None` lets a hung hook stay pending until superseded
    pub hook_timeout_ms: Option<u64>,
    /// Transition records retained by the navigation context
    pub history_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            hook_timeout_ms: None,
            history_limit: 64,
        }
    }
}

impl ResolverConfig {
    pub fn hook_timeout(&self) -> Option<Duration> {
        self.hook_timeout_ms.map(Duration::from_millis)
    }
}

/// Notification collection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Lifetime of a notification from insert to eviction
    pub ttl_ms: u64,
    /// Time spent in the `Entering` phase
    pub enter_ms: u64,
    /// Time spent in the `Leaving` phase before eviction
    pub leave_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            enter_ms: 150,
            leave_ms: 150,
        }
    }
}

impl NotificationConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `development`, `production`, `test`
    pub profile: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: "development".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed logging profile
    ///
    /// # Errors
    ///
    /// Returns `Config` for an unknown profile name.
    pub fn profile(&self) -> Result<Profile> {
        self.profile.parse()
    }
}

impl HuddleConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `Config` if the document is malformed or fails validation.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: HuddleConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `Config` if it is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.resolver.max_redirects == 0 {
            return Err(HuddleError::Config {
                reason: "resolver.max_redirects must be at least 1".to_string(),
            });
        }
        if self.resolver.hook_timeout_ms == Some(0) {
            return Err(HuddleError::Config {
                reason: "resolver.hook_timeout_ms must be positive when set".to_string(),
            });
        }
        let n = &self.notifications;
        if n.ttl_ms == 0 {
            return Err(HuddleError::Config {
                reason: "notifications.ttl_ms must be positive".to_string(),
            });
        }
        if n.enter_ms.saturating_add(n.leave_ms) > n.ttl_ms {
            return Err(HuddleError::Config {
                reason: format!(
                    "notifications.enter_ms + leave_ms ({}) exceeds ttl_ms ({})",
                    n.enter_ms + n.leave_ms,
                    n.ttl_ms
                ),
            });
        }
        self.logging.profile()?;
        Ok(())
    }
}
