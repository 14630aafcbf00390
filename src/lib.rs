//! Affine-gap dynamic programming core for read alignment.
//!
//! Fills the three Gotoh matrices for a read against a reference window,
//! walks the backtrace from the best (and tracks the second-best) end cell,
//! and reports the resulting edits together with work counters that can be
//! merged across threads.

use thiserror::Error;

pub mod aligner;
pub mod alignment_mode;
pub mod bound;
pub mod colorspace;
pub mod config;
pub mod edit;
pub mod matrix;
pub mod metrics;
pub mod pool;
pub mod result;
pub mod scoring;
pub mod sequence;
pub mod sink;
pub mod traceback;

pub use aligner::{AlignOutcome, SwAligner};
pub use alignment_mode::AlignmentMode;
pub use bound::{MatchBonusBound, ScoreBound};
pub use config::SwConfig;
pub use edit::{Edit, EditKind};
pub use matrix::{DpMatrix, EndCell, NEG_INF};
pub use metrics::{SharedSwMetrics, SwCounters, SwMetrics};
pub use pool::{SwJob, SwJobResult, SwWorkerPool};
pub use result::{AlnRes, SwResult};
pub use scoring::{MismatchPolicy, ScoringScheme};
pub use sequence::{Read, RefWindow, SequenceKind};
pub use sink::{
    ActionReporter, CounterReporter, StreamTabActionReporter, StreamTabCounterReporter,
    SwAction, SwActionSink, SwCounterSink,
};
pub use traceback::{BtCell, BtTransition, Traceback};

// Default scoring parameters
pub const DEFAULT_MATCH_BONUS: i32 = 2;
pub const DEFAULT_MISMATCH_MIN: i32 = 2;
pub const DEFAULT_MISMATCH_MAX: i32 = 6;
pub const DEFAULT_N_PENALTY: i32 = 1;
pub const DEFAULT_GAP_OPEN: i32 = 8;
pub const DEFAULT_GAP_EXT: i32 = 3;
pub const DEFAULT_SNP_PENALTY: i32 = 30;

/// Phred quality assumed when a read carries no qualities.
pub const DEFAULT_QUALITY: u8 = 30;
/// Qualities above this saturate the quality-scaled mismatch penalty.
pub const MAX_SCALED_QUALITY: u8 = 40;

#[derive(Debug, Error)]
pub enum SwAlignerError {
    #[error("Invalid scoring scheme: {0}")]
    InvalidScoring(String),
    #[error("Invalid character {ch:?} at position {pos}")]
    InvalidBase { ch: char, pos: usize },
    #[error("Quality length {qual_len} does not match sequence length {seq_len}")]
    QualityLengthMismatch { seq_len: usize, qual_len: usize },
    #[error("Empty sequence: {0}")]
    EmptySequence(String),
    #[error("Sink write failed: {0}")]
    SinkIo(#[from] std::io::Error),
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

pub type Result<T> = std::result::Result<T, SwAlignerError>;
