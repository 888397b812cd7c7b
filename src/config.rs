//! Index and decryption pool configuration

/// Default bound on keyword-to-keyword hops during search
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Default capacity of each worker's request channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 8;

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|s| s == "true" || s == "1")
        .unwrap_or(false)
}

/// Index client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindexConfig {
    /// Log per-call summaries at info instead of debug
    pub verbose: bool,

    /// Default chain rows read per keyword (0 = unlimited)
    pub max_results_per_keyword: usize,

    /// Default search depth
    pub max_depth: usize,
}

impl Default for FindexConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            max_results_per_keyword: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FindexConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self {
            verbose: env_flag("FINDEX_VERBOSE"),
            max_results_per_keyword: std::env::var("FINDEX_MAX_RESULTS_PER_KEYWORD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            max_depth: std::env::var("FINDEX_MAX_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }
}

/// Decryption worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of workers, at least 1
    pub workers: usize,

    /// Bounded channel capacity per worker
    pub channel_capacity: usize,

    /// Log skipped entries and per-call summaries
    pub verbose: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            verbose: false,
        }
    }
}

/// Hardware concurrency, or 1 when unknown
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl PoolConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            ..Self::default()
        }
    }

    /// Load from environment variables
    pub fn from_env() -> Self {
        Self {
            workers: std::env::var("FINDEX_WORKERS")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or_else(default_workers)
                .max(1),
            channel_capacity: std::env::var("FINDEX_WORKER_CHANNEL_CAPACITY")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(DEFAULT_CHANNEL_CAPACITY)
                .max(1),
            verbose: env_flag("FINDEX_VERBOSE"),
        }
    }
}
