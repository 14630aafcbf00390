use std::fmt;
use std::sync::Arc;

use crate::bound::{MatchBonusBound, ScoreBound};
use crate::colorspace;
use crate::config::SwConfig;
use crate::matrix::{DpMatrix, EndCell, FillParams};
use crate::result::SwResult;
use crate::scoring::ScoringScheme;
use crate::sequence::{Read, RefWindow};
use crate::sink::{SwAction, SwActionSink, SwCounterSink};
use crate::traceback::{BtWalk, Traceback};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignOutcome {
    /// An alignment was installed in the result.
    Aligned,
    /// The matrices were filled but no end cell reached the minimum score.
    Failed,
    /// The score bound ruled the problem out before filling.
    Skipped,
}

impl fmt::Display for AlignOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignOutcome::Aligned => write!(f, "aligned"),
            AlignOutcome::Failed => write!(f, "failed"),
            AlignOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Solves one DP problem at a time, reusing its matrices between calls.
///
/// An aligner is owned by a single thread; sinks may be shared.
pub struct SwAligner {
    scoring: ScoringScheme,
    config: SwConfig,
    bound: Box<dyn ScoreBound>,
    matrix: DpMatrix,
    dp_ref: Vec<u8>,
    last_best: Option<EndCell>,
    counter_sinks: Vec<Arc<SwCounterSink>>,
    action_sinks: Vec<Arc<SwActionSink>>,
}

impl SwAligner {
    pub fn new(scoring: ScoringScheme, config: SwConfig) -> Result<Self> {
        scoring.validate()?;
        Ok(Self {
            scoring,
            config,
            bound: Box::new(MatchBonusBound),
            matrix: DpMatrix::new(),
            dp_ref: Vec::new(),
            last_best: None,
            counter_sinks: Vec::new(),
            action_sinks: Vec::new(),
        })
    }

    pub fn with_bound(mut self, bound: impl ScoreBound + 'static) -> Self {
        self.bound = Box::new(bound);
        self
    }

    pub fn with_counter_sink(mut self, sink: Arc<SwCounterSink>) -> Self {
        self.counter_sinks.push(sink);
        self
    }

    pub fn with_action_sink(mut self, sink: Arc<SwActionSink>) -> Self {
        self.action_sinks.push(sink);
        self
    }

    pub fn scoring(&self) -> &ScoringScheme {
        &self.scoring
    }

    pub fn config(&self) -> &SwConfig {
        &self.config
    }

    /// Best end cell of the last fill, if any.
    pub fn last_best(&self) -> Option<EndCell> {
        self.last_best
    }

    /// Align `read` against `window`, overwriting `res`.
    ///
    /// Failing to find an alignment is reported through the outcome and
    /// the counters; errors come only from the sinks.
    pub fn align(
        &mut self,
        read: &Read,
        window: &RefWindow,
        res: &mut SwResult,
    ) -> Result<AlignOutcome> {
        res.reset();
        self.last_best = None;
        let mode = self.config.mode;

        self.dp_ref.clear();
        if read.is_color() {
            self.dp_ref.extend(window.color_masks());
        } else {
            self.dp_ref.extend_from_slice(window.masks());
        }

        let n = read.len();
        let m = self.dp_ref.len();
        if self.config.problem_skip {
            let bound = self.bound.problem_bound(n, m, &self.scoring, mode);
            if bound < self.scoring.min_score as i64 {
                res.counters.swskip += 1;
                log::debug!(
                    "Skipping {} ({}x{}): bound {} below minimum {}",
                    read.name,
                    n,
                    m,
                    bound,
                    self.scoring.min_score
                );
                return self.finish(read, window, res, AlignOutcome::Skipped);
            }
        }

        res.counters.sws += 1;
        let params = FillParams {
            mode,
            row_skip: self.config.row_skip,
            second_best: self.config.second_best,
            bound: self.bound.as_ref(),
        };
        let outcome = self.matrix.fill(
            read.codes(),
            read.quals(),
            &self.dp_ref,
            &self.scoring,
            &params,
        );
        res.counters.swcups += outcome.stats.cups;
        res.counters.swrows += outcome.stats.rows;
        res.counters.swskiprows += outcome.stats.skipped_rows;

        let Some(best) = outcome.best else {
            res.counters.swfail += 1;
            log::debug!("No {} alignment for {} at {}", mode, read.name, window.offset);
            return self.finish(read, window, res, AlignOutcome::Failed);
        };
        self.last_best = Some(best);

        let walk = self.backtrace(read, &best);
        res.counters.swbts += walk.steps();
        debug_assert_eq!(
            walk.start.j, best.origin,
            "backtrace start disagrees with the recorded origin"
        );

        let aln = &mut res.alres;
        aln.score = Some(best.score);
        aln.second_best = outcome.second_best.map(|c| c.score);
        aln.read_span = walk.start.i..walk.end.i;
        aln.ref_span = walk.start.j..walk.end.j;
        aln.ref_offset = window.offset;
        if read.is_color() {
            let dec = colorspace::decode(
                read,
                window.masks(),
                &self.dp_ref,
                &walk,
                &self.scoring,
            )
            .into_walk_order();
            aln.ned = dec.ned;
            aln.aed = dec.aed;
            aln.ced = dec.ced;
            aln.cmiss = dec.cmiss;
            res.nup = Some(dec.nup);
            res.ndn = Some(dec.ndn);
        } else {
            aln.ned = walk.ned;
            aln.aed = walk.aed;
        }
        aln.path = walk.path;

        res.reverse();
        debug_assert!(res.rep_ok());
        res.counters.swsucc += 1;
        self.finish(read, window, res, AlignOutcome::Aligned)
    }

    /// Walk back from `end` over the matrix retained from the last fill.
    pub fn backtrace(&self, read: &Read, end: &EndCell) -> BtWalk {
        Traceback::new(&self.matrix, read, &self.dp_ref).walk(end)
    }

    fn finish(
        &self,
        read: &Read,
        window: &RefWindow,
        res: &SwResult,
        outcome: AlignOutcome,
    ) -> Result<AlignOutcome> {
        for sink in &self.counter_sinks {
            sink.report_counters(&res.counters)?;
        }
        if !self.action_sinks.is_empty() {
            let action = SwAction {
                read_name: read.name.clone(),
                outcome,
                read_len: read.len(),
                ref_offset: window.offset,
                ref_len: window.len(),
                score: res.score(),
            };
            for sink in &self.action_sinks {
                sink.report_action(&action)?;
            }
        }
        Ok(outcome)
    }
}

impl fmt::Debug for SwAligner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwAligner")
            .field("scoring", &self.scoring)
            .field("config", &self.config)
            .field("dims", &self.matrix.dims())
            .finish_non_exhaustive()
    }
}
