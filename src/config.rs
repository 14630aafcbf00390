use crate::alignment_mode::AlignmentMode;

/// Knobs that change how much work the engine does, not what it computes.
#[derive(Debug, Clone)]
pub struct SwConfig {
    pub mode: AlignmentMode,
    /// Skip whole problems whose score bound is below the minimum score.
    pub problem_skip: bool,
    /// Skip trailing rows no valid alignment can pass through.
    pub row_skip: bool,
    /// Track the best non-overlapping runner-up alignment.
    pub second_best: bool,
    pub workers: usize,
    pub channel_capacity: usize,
}

impl Default for SwConfig {
    fn default() -> Self {
        Self {
            mode: AlignmentMode::Local,
            problem_skip: true,
            row_skip: true,
            second_best: true,
            workers: 4,
            channel_capacity: 64,
        }
    }
}

impl SwConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: AlignmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_problem_skip(mut self, enabled: bool) -> Self {
        self.problem_skip = enabled;
        self
    }

    pub fn with_row_skip(mut self, enabled: bool) -> Self {
        self.row_skip = enabled;
        self
    }

    pub fn with_second_best(mut self, enabled: bool) -> Self {
        self.second_best = enabled;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Apply environment overrides on top of `self`.
    ///
    /// - `SW_ALIGNER_NO_ROW_SKIP=1`: disable row skipping
    /// - `SW_ALIGNER_NO_PROBLEM_SKIP=1`: disable whole-problem skipping
    /// - `SW_ALIGNER_WORKERS=<n>`: worker thread count for the pool
    pub fn with_env_overrides(mut self) -> Self {
        if env_flag("SW_ALIGNER_NO_ROW_SKIP") {
            log::info!("SW_ALIGNER_NO_ROW_SKIP=1: row skipping disabled");
            self.row_skip = false;
        }
        if env_flag("SW_ALIGNER_NO_PROBLEM_SKIP") {
            log::info!("SW_ALIGNER_NO_PROBLEM_SKIP=1: problem skipping disabled");
            self.problem_skip = false;
        }
        if let Ok(v) = std::env::var("SW_ALIGNER_WORKERS") {
            match v.parse::<usize>() {
                Ok(n) if n > 0 => {
                    log::info!("SW_ALIGNER_WORKERS={}: using {} worker threads", v, n);
                    self.workers = n;
                }
                _ => log::warn!("Ignoring invalid SW_ALIGNER_WORKERS value {:?}", v),
            }
        }
        self
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| v == "1").unwrap_or(false)
}
