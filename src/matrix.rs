//! Gotoh three-matrix fill.
//!
//! Only two rows of scores are live at any time; every cell keeps a one-byte
//! backtrace tag so the walk can run after the fill. Each score also carries
//! the reference column its path started in, which is what lets the
//! second-best search reject candidates overlapping the best alignment
//! without walking them.

use crate::alignment_mode::AlignmentMode;
use crate::bound::ScoreBound;
use crate::scoring::{EndCandidates, Position, ScoringScheme};

pub use crate::scoring::EndCandidate as EndCell;

/// Score of a cell no alignment can reach.
pub const NEG_INF: i32 = i32::MIN / 2;

/// Which term produced a cell's `Oall` score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OallSource {
    /// Row 0, or the local-alignment floor.
    Start,
    Diagonal,
    ReadGap,
    RefGap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellTag(u8);

impl CellTag {
    const SOURCE_MASK: u8 = 0b0011;
    const RDGAP_EXTEND: u8 = 0b0100;
    const RFGAP_EXTEND: u8 = 0b1000;

    pub fn new(source: OallSource, rdgap_extend: bool, rfgap_extend: bool) -> Self {
        let mut bits = match source {
            OallSource::Start => 0,
            OallSource::Diagonal => 1,
            OallSource::ReadGap => 2,
            OallSource::RefGap => 3,
        };
        if rdgap_extend {
            bits |= Self::RDGAP_EXTEND;
        }
        if rfgap_extend {
            bits |= Self::RFGAP_EXTEND;
        }
        CellTag(bits)
    }

    pub fn source(self) -> OallSource {
        match self.0 & Self::SOURCE_MASK {
            0 => OallSource::Start,
            1 => OallSource::Diagonal,
            2 => OallSource::ReadGap,
            _ => OallSource::RefGap,
        }
    }

    /// `Rdgap` here extends the gap from the cell above rather than opening it.
    pub fn rdgap_extended(self) -> bool {
        self.0 & Self::RDGAP_EXTEND != 0
    }

    /// `Rfgap` here extends the gap from the cell to the left.
    pub fn rfgap_extended(self) -> bool {
        self.0 & Self::RFGAP_EXTEND != 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Scored {
    score: i32,
    origin: usize,
}

const UNREACHED: Scored = Scored {
    score: NEG_INF,
    origin: 0,
};

#[derive(Debug, Clone, Copy)]
struct Cell {
    oall: Scored,
    rdgap: Scored,
    rfgap: Scored,
}

impl Cell {
    fn start(col: usize) -> Self {
        Cell {
            oall: Scored {
                score: 0,
                origin: col,
            },
            rdgap: UNREACHED,
            rfgap: UNREACHED,
        }
    }

    fn best(&self) -> i32 {
        self.oall.score.max(self.rdgap.score).max(self.rfgap.score)
    }
}

/// Open from `from_open` or extend from `from_extend`; ties open.
///
/// Saturates so that any penalty accepted by `ScoringScheme::validate`
/// leaves an unreached cell at `NEG_INF`.
fn gap_step(from_open: Scored, from_extend: Scored, open: i32, extend: i32) -> (Scored, bool) {
    let opened = from_open.score.saturating_sub(open);
    let extended = from_extend.score.saturating_sub(extend);
    if extended > opened {
        (
            Scored {
                score: extended.max(NEG_INF),
                origin: from_extend.origin,
            },
            true,
        )
    } else {
        (
            Scored {
                score: opened.max(NEG_INF),
                origin: from_open.origin,
            },
            false,
        )
    }
}

/// Work done by one fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    pub cups: u64,
    pub rows: u64,
    pub skipped_rows: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FillOutcome {
    pub best: Option<EndCell>,
    pub second_best: Option<EndCell>,
    pub stats: FillStats,
}

pub struct FillParams<'a> {
    pub mode: AlignmentMode,
    pub row_skip: bool,
    pub second_best: bool,
    pub bound: &'a dyn ScoreBound,
}

/// Scratch matrix reused across sequential problems on one thread.
#[derive(Debug, Default)]
pub struct DpMatrix {
    rows: usize,
    cols: usize,
    filled_rows: usize,
    tags: Vec<CellTag>,
    prev: Vec<Cell>,
    cur: Vec<Cell>,
    ends: EndCandidates,
}

impl DpMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(read_len + 1, ref_len + 1)` of the last fill.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Rows written by the last fill, counting row 0.
    pub fn filled_rows(&self) -> usize {
        self.filled_rows
    }

    pub fn tag(&self, i: usize, j: usize) -> CellTag {
        assert!(
            i < self.filled_rows && j < self.cols,
            "cell ({}, {}) outside filled matrix {}x{}",
            i,
            j,
            self.filled_rows,
            self.cols
        );
        self.tags[i * self.cols + j]
    }

    /// Fill the matrices for `read` (codes and qualities) against `refm`
    /// (reference masks) and collect the best end cells.
    pub fn fill(
        &mut self,
        read: &[u8],
        quals: &[u8],
        refm: &[u8],
        scoring: &ScoringScheme,
        params: &FillParams<'_>,
    ) -> FillOutcome {
        assert_eq!(read.len(), quals.len(), "read and qualities differ in length");
        let n = read.len();
        let m = refm.len();
        let local = params.mode.is_local();
        self.rows = n + 1;
        self.cols = m + 1;
        self.tags.clear();
        self.tags.resize(self.rows * self.cols, CellTag::default());
        self.prev.clear();
        self.prev.extend((0..self.cols).map(Cell::start));
        self.cur.clear();
        self.cur.resize(
            self.cols,
            Cell {
                oall: UNREACHED,
                rdgap: UNREACHED,
                rfgap: UNREACHED,
            },
        );
        self.ends.reset();
        self.filled_rows = 1;

        let mut stats = FillStats::default();
        let mut prev_best = 0;

        for i in 1..=n {
            if params.row_skip {
                let bound = params
                    .bound
                    .row_bound(i, n, prev_best, scoring, params.mode);
                if bound < scoring.min_score as i64 {
                    stats.skipped_rows += (n + 1 - i) as u64;
                    log::trace!(
                        "Skipping rows {}..={}: bound {} below minimum {}",
                        i,
                        n,
                        bound,
                        scoring.min_score
                    );
                    break;
                }
            }

            let code = read[i - 1];
            let qual = quals[i - 1];
            let row = i * self.cols;

            // Column 0: local alignments restart, end-to-end ones must insert
            let (rd0, rd0_ext) = gap_step(
                self.prev[0].oall,
                self.prev[0].rdgap,
                scoring.read_gap_open,
                scoring.read_gap_extend,
            );
            if local {
                self.cur[0] = Cell::start(0);
                self.tags[row] = CellTag::new(OallSource::Start, false, false);
            } else {
                self.cur[0] = Cell {
                    oall: rd0,
                    rdgap: rd0,
                    rfgap: UNREACHED,
                };
                self.tags[row] = CellTag::new(OallSource::ReadGap, rd0_ext, false);
            }
            let mut row_best = self.cur[0].best();

            for j in 1..=m {
                let (rdgap, rd_ext) = gap_step(
                    self.prev[j].oall,
                    self.prev[j].rdgap,
                    scoring.read_gap_open,
                    scoring.read_gap_extend,
                );
                let (rfgap, rf_ext) = gap_step(
                    self.cur[j - 1].oall,
                    self.cur[j - 1].rfgap,
                    scoring.ref_gap_open,
                    scoring.ref_gap_extend,
                );
                let diag_from = self.prev[j - 1].oall;
                let diag = Scored {
                    score: diag_from
                        .score
                        .saturating_add(scoring.sub_score(code, qual, refm[j - 1]))
                        .max(NEG_INF),
                    origin: diag_from.origin,
                };

                let (mut oall, mut source) = (diag, OallSource::Diagonal);
                if rdgap.score > oall.score {
                    oall = rdgap;
                    source = OallSource::ReadGap;
                }
                if rfgap.score > oall.score {
                    oall = rfgap;
                    source = OallSource::RefGap;
                }
                if local && oall.score <= 0 {
                    oall = Scored {
                        score: 0,
                        origin: j,
                    };
                    source = OallSource::Start;
                }

                self.cur[j] = Cell { oall, rdgap, rfgap };
                self.tags[row + j] = CellTag::new(source, rd_ext, rf_ext);
                row_best = row_best.max(self.cur[j].best());

                let is_end = if local {
                    source == OallSource::Diagonal
                } else {
                    i == n
                };
                if is_end && scoring.is_valid_score(oall.score, params.mode) {
                    self.ends.offer(EndCell {
                        score: oall.score,
                        pos: Position { i, j },
                        origin: oall.origin,
                    });
                }
            }

            // A fully inserted read ends in column 0
            if !local && i == n && scoring.is_valid_score(self.cur[0].oall.score, params.mode) {
                self.ends.offer(EndCell {
                    score: self.cur[0].oall.score,
                    pos: Position { i, j: 0 },
                    origin: 0,
                });
            }

            stats.cups += m as u64;
            stats.rows += 1;
            self.filled_rows = i + 1;
            prev_best = row_best;
            std::mem::swap(&mut self.prev, &mut self.cur);
        }

        let best = self.ends.best();
        let second_best = match best {
            Some(ref b) if params.second_best => self.ends.second_best(b),
            _ => None,
        };
        FillOutcome {
            best,
            second_best,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::MatchBonusBound;
    use crate::sequence::{Read, RefWindow};

    fn fill(read: &[u8], refs: &[u8], mode: AlignmentMode) -> (DpMatrix, FillOutcome) {
        let scoring = ScoringScheme::new(2, 1, 3, 1).unwrap().with_min_score(-100);
        let read = Read::new("r", read, None).unwrap();
        let window = RefWindow::new(refs, 0).unwrap();
        let mut matrix = DpMatrix::new();
        let params = FillParams {
            mode,
            row_skip: true,
            second_best: true,
            bound: &MatchBonusBound,
        };
        let out = matrix.fill(read.codes(), read.quals(), window.masks(), &scoring, &params);
        (matrix, out)
    }

    #[test]
    fn test_tag_packing() {
        let tag = CellTag::new(OallSource::RefGap, true, false);
        assert_eq!(tag.source(), OallSource::RefGap);
        assert!(tag.rdgap_extended());
        assert!(!tag.rfgap_extended());
        assert_eq!(CellTag::default().source(), OallSource::Start);
    }

    #[test]
    fn test_exact_match_local() {
        let (matrix, out) = fill(b"ACGT", b"ACGT", AlignmentMode::Local);
        let best = out.best.unwrap();
        assert_eq!(best.score, 8);
        assert_eq!(best.pos, Position { i: 4, j: 4 });
        assert_eq!(best.origin, 0);
        assert_eq!(out.stats.cups, 16);
        assert_eq!(out.stats.rows, 4);
        assert_eq!(matrix.tag(4, 4).source(), OallSource::Diagonal);
    }

    #[test]
    fn test_end_to_end_mismatch() {
        let (_, out) = fill(b"ACGA", b"ACGT", AlignmentMode::EndToEnd);
        assert_eq!(out.best.unwrap().score, 5);
    }

    #[test]
    fn test_end_to_end_prefers_diagonal_on_tie() {
        // Oall(3,2) ties between the diagonal and an open read gap
        let (matrix, out) = fill(b"ACCGT", b"ACGT", AlignmentMode::EndToEnd);
        assert_eq!(out.best.unwrap().score, 5);
        assert_eq!(matrix.tag(3, 2).source(), OallSource::Diagonal);
        assert_eq!(matrix.tag(2, 1).source(), OallSource::ReadGap);
        assert!(!matrix.tag(2, 1).rdgap_extended());
    }

    #[test]
    fn test_second_best_does_not_overlap() {
        let (_, out) = fill(b"ACGT", b"ACGTTTTTACGT", AlignmentMode::Local);
        let best = out.best.unwrap();
        let second = out.second_best.unwrap();
        assert_eq!(best.score, 8);
        assert_eq!(best.pos.j, 4);
        assert_eq!(second.score, 8);
        assert_eq!(second.pos.j, 12);
        assert!(!best.overlaps(&second));
    }

    #[test]
    fn test_second_best_below_overlapping_cell() {
        // Column 12's top cell (16) overlaps the best; the 8 under it does not
        let (_, out) = fill(b"ACGTACGT", b"ACGTACGTACGT", AlignmentMode::Local);
        let best = out.best.unwrap();
        assert_eq!(best.score, 16);
        assert_eq!(best.ref_span(), 0..8);
        let second = out.second_best.unwrap();
        assert_eq!(second.score, 8);
        assert_eq!(second.pos, Position { i: 4, j: 12 });
        assert_eq!(second.ref_span(), 8..12);
    }

    #[test]
    fn test_extreme_gap_open_saturates() {
        let scoring = ScoringScheme::new(2, 1, 1_200_000_000, 1)
            .unwrap()
            .with_min_score(i32::MIN);
        let read = Read::new("r", b"ACGTACGT", None).unwrap();
        let window = RefWindow::new(b"ACGTACGT", 0).unwrap();
        let params = FillParams {
            mode: AlignmentMode::EndToEnd,
            row_skip: false,
            second_best: true,
            bound: &MatchBonusBound,
        };
        let mut matrix = DpMatrix::new();
        let out = matrix.fill(read.codes(), read.quals(), window.masks(), &scoring, &params);
        assert_eq!(out.best.unwrap().score, 16);
        assert_eq!(out.stats.rows, 8);
    }
}
