//! Configuration for [`super::MergeScheduler`].

use thiserror::Error;

/// Upper bound accepted for the concurrency limit.
///
/// Used as the default, so an unconfigured merge is effectively unbounded.
pub const MAX_CONCURRENCY_LIMIT: usize = 1 << 16;

/// Errors raised while building a [`MergeConfig`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MergeConfigError {
    /// The limit was zero or exceeded [`MAX_CONCURRENCY_LIMIT`].
    #[error("invalid concurrency limit {0}; must be between 1 and {max}", max = MAX_CONCURRENCY_LIMIT)]
    InvalidConcurrencyLimit(usize),
}

/// Validated merge settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeConfig {
    concurrency_limit: usize,
}

impl MergeConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> MergeConfigBuilder { MergeConfigBuilder::default() }

    /// Shorthand for a configuration with only the limit set.
    ///
    /// # Errors
    ///
    /// See [`MergeConfigBuilder::build`].
    pub fn with_limit(limit: usize) -> Result<Self, MergeConfigError> {
        Self::builder().concurrency_limit(limit).build()
    }

    /// Maximum number of inner sequences active at once.
    #[must_use]
    pub fn concurrency_limit(&self) -> usize { self.concurrency_limit }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: MAX_CONCURRENCY_LIMIT,
        }
    }
}

/// Builder for [`MergeConfig`].
///
/// ```
/// use eventframe::merge::MergeConfig;
///
/// let config = MergeConfig::builder()
///     .concurrency_limit(4)
///     .build()
///     .expect("valid limit");
/// assert_eq!(config.concurrency_limit(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct MergeConfigBuilder {
    concurrency_limit: usize,
}

impl Default for MergeConfigBuilder {
    fn default() -> Self {
        Self {
            concurrency_limit: MAX_CONCURRENCY_LIMIT,
        }
    }
}

impl MergeConfigBuilder {
    /// Set the maximum number of concurrently active inner sequences.
    #[must_use]
    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MergeConfigError::InvalidConcurrencyLimit`] if the limit is
    /// zero or greater than [`MAX_CONCURRENCY_LIMIT`].
    pub fn build(self) -> Result<MergeConfig, MergeConfigError> {
        if !(1..=MAX_CONCURRENCY_LIMIT).contains(&self.concurrency_limit) {
            return Err(MergeConfigError::InvalidConcurrencyLimit(
                self.concurrency_limit,
            ));
        }
        Ok(MergeConfig {
            concurrency_limit: self.concurrency_limit,
        })
    }
}
