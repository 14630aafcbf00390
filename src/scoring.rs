use crate::alignment_mode::AlignmentMode;
use crate::sequence::{mask_contains, BASE_N, MASK_N};
use crate::{
    Result, SwAlignerError, DEFAULT_GAP_EXT, DEFAULT_GAP_OPEN, DEFAULT_MATCH_BONUS,
    DEFAULT_MISMATCH_MAX, DEFAULT_MISMATCH_MIN, DEFAULT_N_PENALTY, DEFAULT_SNP_PENALTY,
    MAX_SCALED_QUALITY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Same penalty at every position.
    Constant(i32),
    /// Penalty grows linearly with base quality, saturating at Q40.
    QualityScaled { min: i32, max: i32 },
}

impl MismatchPolicy {
    pub fn penalty(&self, qual: u8) -> i32 {
        match *self {
            MismatchPolicy::Constant(p) => p,
            MismatchPolicy::QualityScaled { min, max } => {
                let q = qual.min(MAX_SCALED_QUALITY) as i64;
                let scaled = (max as i64 - min as i64) * q / MAX_SCALED_QUALITY as i64;
                (min as i64 + scaled) as i32
            }
        }
    }
}

/// Scores and penalties for one alignment problem.
///
/// Penalties are stored as positive costs and subtracted by the recurrence.
/// A gap of length `k` costs `open + (k - 1) * extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringScheme {
    pub match_bonus: i32,
    pub mismatch: MismatchPolicy,
    pub n_penalty: i32,
    /// Read positions aligned to a gap in the reference (insertions).
    pub read_gap_open: i32,
    pub read_gap_extend: i32,
    /// Reference positions aligned to a gap in the read (deletions).
    pub ref_gap_open: i32,
    pub ref_gap_extend: i32,
    /// Cost of a decoded colorspace nucleotide disagreeing with the reference.
    pub snp_penalty: i32,
    pub min_score: i32,
}

impl Default for ScoringScheme {
    fn default() -> Self {
        Self {
            match_bonus: DEFAULT_MATCH_BONUS,
            mismatch: MismatchPolicy::QualityScaled {
                min: DEFAULT_MISMATCH_MIN,
                max: DEFAULT_MISMATCH_MAX,
            },
            n_penalty: DEFAULT_N_PENALTY,
            read_gap_open: DEFAULT_GAP_OPEN,
            read_gap_extend: DEFAULT_GAP_EXT,
            ref_gap_open: DEFAULT_GAP_OPEN,
            ref_gap_extend: DEFAULT_GAP_EXT,
            snp_penalty: DEFAULT_SNP_PENALTY,
            min_score: 0,
        }
    }
}

impl ScoringScheme {
    /// Constant mismatch penalty and identical read/reference gap costs.
    pub fn new(match_bonus: i32, mismatch: i32, gap_open: i32, gap_extend: i32) -> Result<Self> {
        let scheme = Self {
            match_bonus,
            mismatch: MismatchPolicy::Constant(mismatch),
            read_gap_open: gap_open,
            read_gap_extend: gap_extend,
            ref_gap_open: gap_open,
            ref_gap_extend: gap_extend,
            ..Self::default()
        };
        scheme.validate()?;
        Ok(scheme)
    }

    pub fn with_read_gaps(mut self, open: i32, extend: i32) -> Result<Self> {
        self.read_gap_open = open;
        self.read_gap_extend = extend;
        self.validate()?;
        Ok(self)
    }

    pub fn with_ref_gaps(mut self, open: i32, extend: i32) -> Result<Self> {
        self.ref_gap_open = open;
        self.ref_gap_extend = extend;
        self.validate()?;
        Ok(self)
    }

    pub fn with_mismatch(mut self, mismatch: MismatchPolicy) -> Result<Self> {
        self.mismatch = mismatch;
        self.validate()?;
        Ok(self)
    }

    pub fn with_n_penalty(mut self, n_penalty: i32) -> Result<Self> {
        self.n_penalty = n_penalty;
        self.validate()?;
        Ok(self)
    }

    pub fn with_min_score(mut self, min_score: i32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.match_bonus < 0 {
            return Err(SwAlignerError::InvalidScoring(format!(
                "match bonus {} is negative",
                self.match_bonus
            )));
        }
        match self.mismatch {
            MismatchPolicy::Constant(p) if p < 0 => {
                return Err(SwAlignerError::InvalidScoring(format!(
                    "mismatch penalty {} is negative",
                    p
                )))
            }
            MismatchPolicy::QualityScaled { min, max } if min < 0 || min > max => {
                return Err(SwAlignerError::InvalidScoring(format!(
                    "quality-scaled mismatch range {}..{} is invalid",
                    min, max
                )))
            }
            _ => {}
        }
        if self.n_penalty < 0 || self.snp_penalty < 0 {
            return Err(SwAlignerError::InvalidScoring(
                "N and SNP penalties must be non-negative".to_string(),
            ));
        }
        check_gap("read", self.read_gap_open, self.read_gap_extend)?;
        check_gap("reference", self.ref_gap_open, self.ref_gap_extend)
    }

    pub fn mismatch_penalty(&self, qual: u8) -> i32 {
        self.mismatch.penalty(qual)
    }

    /// Score of read code `code` (quality `qual`) against reference mask `mask`.
    ///
    /// Used for both nucleotides and colors; in colorspace `mask` is the set
    /// of colors the two flanking reference positions can produce.
    pub fn sub_score(&self, code: u8, qual: u8, mask: u8) -> i32 {
        if code >= BASE_N || mask == MASK_N {
            -self.n_penalty
        } else if mask_contains(mask, code) {
            self.match_bonus
        } else {
            -self.mismatch_penalty(qual)
        }
    }

    /// Cost of a gap of `len` read positions.
    pub fn read_gap_cost(&self, len: usize) -> i64 {
        gap_cost(self.read_gap_open, self.read_gap_extend, len)
    }

    /// Cost of a gap of `len` reference positions.
    pub fn ref_gap_cost(&self, len: usize) -> i64 {
        gap_cost(self.ref_gap_open, self.ref_gap_extend, len)
    }

    /// Best score a read of `read_len` positions can possibly reach.
    pub fn perfect_score(&self, read_len: usize) -> i64 {
        read_len as i64 * self.match_bonus as i64
    }

    /// Whether `score` is acceptable as an alignment end in `mode`.
    pub fn is_valid_score(&self, score: i32, mode: AlignmentMode) -> bool {
        score >= self.min_score && (!mode.is_local() || score > 0)
    }
}

fn check_gap(which: &str, open: i32, extend: i32) -> Result<()> {
    if extend < 0 || open < extend {
        return Err(SwAlignerError::InvalidScoring(format!(
            "{} gap penalties must satisfy 0 <= extend ({}) <= open ({})",
            which, extend, open
        )));
    }
    Ok(())
}

fn gap_cost(open: i32, extend: i32, len: usize) -> i64 {
    if len == 0 {
        0
    } else {
        open as i64 + (len as i64 - 1) * extend as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub i: usize,
    pub j: usize,
}

/// A valid end cell and where its path entered the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndCandidate {
    pub score: i32,
    pub pos: Position,
    /// Reference column where the candidate's path starts.
    pub origin: usize,
}

impl EndCandidate {
    /// Reference positions consumed, as a half-open range.
    pub fn ref_span(&self) -> std::ops::Range<usize> {
        self.origin..self.pos.j
    }

    pub fn overlaps(&self, other: &EndCandidate) -> bool {
        let (a, b) = (self.ref_span(), other.ref_span());
        a.start < b.end && b.start < a.end
    }

    /// Preferred of two end cells: higher score, then leftmost column,
    /// then topmost row.
    fn beats(&self, other: &EndCandidate) -> bool {
        (other.score, self.pos.j, self.pos.i) < (self.score, other.pos.j, other.pos.i)
    }
}

/// Every valid end cell of one fill, in the order the matrix pass found
/// them.
#[derive(Debug, Default)]
pub(crate) struct EndCandidates {
    cells: Vec<EndCandidate>,
}

impl EndCandidates {
    pub fn reset(&mut self) {
        self.cells.clear();
    }

    pub fn offer(&mut self, cand: EndCandidate) {
        self.cells.push(cand);
    }

    pub fn best(&self) -> Option<EndCandidate> {
        self.best_where(|_| true)
    }

    /// Best end cell whose reference span does not overlap `best`'s.
    pub fn second_best(&self, best: &EndCandidate) -> Option<EndCandidate> {
        self.best_where(|c| !c.overlaps(best))
    }

    fn best_where<F: Fn(&EndCandidate) -> bool>(&self, keep: F) -> Option<EndCandidate> {
        let mut best: Option<EndCandidate> = None;
        for cand in self.cells.iter().filter(|c| keep(c)) {
            if best.map_or(true, |b| cand.beats(&b)) {
                best = Some(*cand);
            }
        }
        best
    }
}
