//! Redacting wrapper for credentials
//!
//! Session tokens handed to the data source must never end up in log output,
//! including `{:?}` of a config struct that happens to contain one.

use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// Wrapper that redacts its contents in Debug and Display
///
/// # Example
///
/// ```
/// use huddle_core_types::Sensitive;
///
/// let token = Sensitive::new("bearer-abc");
/// assert_eq!(format!("{:?}", token), "***REDACTED***");
/// assert_eq!(token.expose(), &"bearer-abc");
/// ```
#[derive(Clone, Default)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the underlying value; call only where it is actually sent
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
