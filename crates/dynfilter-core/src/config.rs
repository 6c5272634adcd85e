//! Compiler configuration.

/// Configuration for a [`QueryCompiler`](crate::QueryCompiler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Maximum number of memoised predicates. None disables the cache.
    pub cache_capacity: Option<usize>,

    /// Extra `chrono` formats tried after the built-in date/time layouts.
    pub datetime_formats: Vec<String>,

    /// Whether to log when a substring test marked not-null meets a null.
    pub warn_on_null_violation: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: None,
            datetime_formats: Vec::new(),
            warn_on_null_violation: true,
        }
    }
}

impl CompilerConfig {
    /// Create a configuration with a predicate cache of `capacity` entries.
    pub fn with_cache(capacity: usize) -> Self {
        Self {
            cache_capacity: Some(capacity),
            ..Default::default()
        }
    }

    /// Set the cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Disable the predicate cache.
    pub fn without_cache(mut self) -> Self {
        self.cache_capacity = None;
        self
    }

    /// Add an extra date/time format.
    pub fn datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_formats.push(format.into());
        self
    }

    /// Set whether broken not-null hints are logged.
    pub fn warn_on_null_violation(mut self, warn: bool) -> Self {
        self.warn_on_null_violation = warn;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.cache_capacity, None);
        assert!(config.datetime_formats.is_empty());
        assert!(config.warn_on_null_violation);
    }

    #[test]
    fn test_builder() {
        let config = CompilerConfig::with_cache(64)
            .datetime_format("%d.%m.%Y")
            .warn_on_null_violation(false);
        assert_eq!(config.cache_capacity, Some(64));
        assert_eq!(config.datetime_formats, vec!["%d.%m.%Y".to_string()]);
        assert!(!config.warn_on_null_violation);

        assert_eq!(config.without_cache().cache_capacity, None);
    }
}
