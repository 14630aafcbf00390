//! Admissible score bounds behind the problem and row skip filters.
//!
//! A bound must never be lower than the score an alignment can actually
//! reach; otherwise the engine would skip problems or rows holding valid
//! alignments.

use crate::alignment_mode::AlignmentMode;
use crate::scoring::ScoringScheme;

pub trait ScoreBound: Send + Sync {
    /// Upper bound on any alignment score for a `read_len` x `ref_len` problem.
    fn problem_bound(
        &self,
        read_len: usize,
        ref_len: usize,
        scoring: &ScoringScheme,
        mode: AlignmentMode,
    ) -> i64;

    /// Upper bound on any alignment passing through `row` (1-based), given
    /// the best score of any cell in `row - 1`.
    fn row_bound(
        &self,
        row: usize,
        read_len: usize,
        prev_row_best: i32,
        scoring: &ScoringScheme,
        mode: AlignmentMode,
    ) -> i64;
}

/// Assumes every remaining read position scores the match bonus.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchBonusBound;

impl ScoreBound for MatchBonusBound {
    fn problem_bound(
        &self,
        read_len: usize,
        ref_len: usize,
        scoring: &ScoringScheme,
        mode: AlignmentMode,
    ) -> i64 {
        match mode {
            AlignmentMode::Local => scoring.perfect_score(read_len.min(ref_len)),
            AlignmentMode::EndToEnd if read_len <= ref_len => scoring.perfect_score(read_len),
            // The surplus read positions must be inserted
            AlignmentMode::EndToEnd => {
                scoring.perfect_score(ref_len) - scoring.read_gap_cost(read_len - ref_len)
            }
        }
    }

    fn row_bound(
        &self,
        row: usize,
        read_len: usize,
        prev_row_best: i32,
        scoring: &ScoringScheme,
        mode: AlignmentMode,
    ) -> i64 {
        let carried = if mode.is_local() {
            prev_row_best.max(0)
        } else {
            prev_row_best
        };
        carried as i64 + scoring.perfect_score(read_len + 1 - row)
    }
}
