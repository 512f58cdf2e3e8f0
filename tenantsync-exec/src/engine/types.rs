use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 200;
pub const DEFAULT_CONCURRENCY: usize = 10;

/// What the coordinator does after a tenant fails setup (`pre_execute` or
/// `get_total`). Work already queued is drained either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupFailurePolicy {
    /// Keep publishing the remaining tenants and report every failure at the end.
    #[default]
    Continue,
    /// Stop publishing further tenants.
    Abort,
}

#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Number of workers, and capacity of the work queue.
    pub concurrency: usize,
    /// Rows per page handed to `execute_job`.
    pub page_size: i64,
    pub setup_failure: SetupFailurePolicy,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
            setup_failure: SetupFailurePolicy::default(),
        }
    }
}

impl JobConfig {
    /// `page_size` of `None` or `0` means unset and falls back to the default.
    pub fn new(concurrency: usize, page_size: Option<i64>) -> Result<Self, ConfigError> {
        let page_size = match page_size {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(n) => n,
        };
        let config = Self {
            concurrency,
            page_size,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_setup_failure(mut self, policy: SetupFailurePolicy) -> Self {
        self.setup_failure = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.page_size < 1 {
            return Err(ConfigError::InvalidPageSize(self.page_size));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("page size must be positive, got {0}")]
    InvalidPageSize(i64),
}
