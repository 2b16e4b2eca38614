/// Concurrency ceiling used when none is configured.
pub const DEFAULT_PARALLELISM: usize = 100;

/// Queue tuning parameters.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Diagnostic label. Appears in log events and in the stopped-rejection
    /// error; no behavioral effect.
    pub name: String,
    /// Maximum number of entries processing concurrently. Values below 1 are
    /// treated as 1.
    pub parallelism: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: "dedup-queue".to_string(),
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl QueueConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = QueueConfig::default();
        assert_eq!(config.parallelism, DEFAULT_PARALLELISM);
        assert_eq!(config.name, "dedup-queue");
    }

    #[test]
    fn builder_style_overrides() {
        let config = QueueConfig::new("thumbnails").with_parallelism(4);
        assert_eq!(config.name, "thumbnails");
        assert_eq!(config.parallelism, 4);
    }
}
