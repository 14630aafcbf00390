use std::ops::Range;

use crate::edit::{edits_ordered, Edit};
use crate::metrics::SwCounters;
use crate::traceback::BtTransition;

/// The alignment produced by one DP problem: scores, spans and edits.
///
/// Edit lists are built right to left by the backtrace and must be
/// reversed once before use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlnRes {
    pub score: Option<i32>,
    /// Best score among end cells not overlapping this alignment.
    pub second_best: Option<i32>,
    /// Read offsets covered (colors for colorspace reads).
    pub read_span: Range<usize>,
    /// Window offsets covered (color columns for colorspace reads).
    pub ref_span: Range<usize>,
    /// Window offset within the full reference.
    pub ref_offset: usize,
    pub ned: Vec<Edit>,
    pub aed: Vec<Edit>,
    pub ced: Vec<Edit>,
    pub cmiss: Vec<Edit>,
    pub path: Vec<BtTransition>,
}

impl AlnRes {
    pub fn reset(&mut self) {
        self.score = None;
        self.second_best = None;
        self.read_span = 0..0;
        self.ref_span = 0..0;
        self.ref_offset = 0;
        self.ned.clear();
        self.aed.clear();
        self.ced.clear();
        self.cmiss.clear();
        self.path.clear();
    }

    pub fn reverse_edits(&mut self) {
        self.ned.reverse();
        self.aed.reverse();
        self.ced.reverse();
        self.cmiss.reverse();
        self.path.reverse();
    }

    pub fn is_empty(&self) -> bool {
        self.score.is_none()
    }

    /// Leftmost reference coordinate of the alignment.
    pub fn ref_coord(&self) -> usize {
        self.ref_offset + self.ref_span.start
    }

    pub fn read_gaps(&self) -> usize {
        self.path.iter().filter(|t| t.is_read_gap()).count()
    }

    pub fn ref_gaps(&self) -> usize {
        self.path.iter().filter(|t| t.is_ref_gap()).count()
    }

    /// Consistency check; expects edit lists in left-to-right order.
    pub fn rep_ok(&self) -> bool {
        let Some(score) = self.score else {
            assert!(self.second_best.is_none(), "second-best without a best score");
            assert!(
                self.ned.is_empty()
                    && self.aed.is_empty()
                    && self.ced.is_empty()
                    && self.cmiss.is_empty()
                    && self.path.is_empty(),
                "empty result carries edits"
            );
            return true;
        };
        if let Some(second) = self.second_best {
            assert!(score >= second, "best {} below second-best {}", score, second);
        }
        for (name, edits) in [
            ("ned", &self.ned),
            ("aed", &self.aed),
            ("ced", &self.ced),
            ("cmiss", &self.cmiss),
        ] {
            assert!(edits_ordered(edits), "{} edits out of order", name);
            for e in edits.iter() {
                assert!(
                    self.read_span.start <= e.pos
                        && e.pos <= self.read_span.end
                        && self.ref_span.start <= e.ref_pos
                        && e.ref_pos <= self.ref_span.end,
                    "{} edit {} outside alignment",
                    name,
                    e
                );
            }
        }
        for m in &self.cmiss {
            assert!(
                self.ced
                    .iter()
                    .any(|c| c.pos == m.pos && c.ref_pos == m.ref_pos),
                "miscall {} is not a color edit",
                m
            );
        }
        let read_len: usize = self.path.iter().map(|t| t.info().read).sum();
        let ref_len: usize = self.path.iter().map(|t| t.info().reference).sum();
        assert_eq!(read_len, self.read_span.len(), "path and read span disagree");
        assert_eq!(ref_len, self.ref_span.len(), "path and reference span disagree");
        true
    }
}

/// Result of one DP invocation: the alignment (if any), the decoded
/// flanking nucleotides for colorspace reads, and the work counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwResult {
    pub alres: AlnRes,
    pub counters: SwCounters,
    pub nup: Option<u8>, // upstream decoded nucleotide; colorspace reads
    pub ndn: Option<u8>, // downstream decoded nucleotide; colorspace reads
}

impl SwResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all contents, keeping allocations for reuse.
    pub fn reset(&mut self) {
        self.counters.reset();
        self.alres.reset();
        self.nup = None;
        self.ndn = None;
    }

    pub fn reverse(&mut self) {
        self.alres.reverse_edits();
    }

    /// True iff no alignment has been installed.
    pub fn is_empty(&self) -> bool {
        self.alres.is_empty()
    }

    pub fn rep_ok(&self) -> bool {
        assert!(self.alres.rep_ok());
        true
    }

    pub fn score(&self) -> Option<i32> {
        self.alres.score
    }

    pub fn second_best(&self) -> Option<i32> {
        self.alres.second_best
    }
}
