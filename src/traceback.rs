//! Backtrace state machine.
//!
//! The walk sits in one of three cell types and steps to an earlier cell
//! along one of nine transitions, chosen from the tag the fill recorded.

use crate::edit::Edit;
use crate::matrix::{CellTag, DpMatrix, EndCell, OallSource};
use crate::scoring::Position;
use crate::sequence::{
    base_char, color_char, first_base, iupac_char, is_ambiguous, mask_contains, Read,
    SequenceKind, MASK_N,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BtCell {
    Oall,
    Rdgap,
    Rfgap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BtTransition {
    OallDiag,
    OallRefOpen,
    OallRefExtend,
    OallReadOpen,
    OallReadExtend,
    RdgapOpen,
    RdgapExtend,
    RfgapOpen,
    RfgapExtend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionInfo {
    pub from: BtCell,
    pub to: BtCell,
    pub read: usize,
    pub reference: usize,
}

const fn info(from: BtCell, to: BtCell, read: usize, reference: usize) -> TransitionInfo {
    TransitionInfo {
        from,
        to,
        read,
        reference,
    }
}

// Indexed by BtTransition discriminant
const TRANSITIONS: [TransitionInfo; 9] = [
    info(BtCell::Oall, BtCell::Oall, 1, 1),
    info(BtCell::Oall, BtCell::Oall, 0, 1),
    info(BtCell::Oall, BtCell::Rfgap, 0, 1),
    info(BtCell::Oall, BtCell::Oall, 1, 0),
    info(BtCell::Oall, BtCell::Rdgap, 1, 0),
    info(BtCell::Rdgap, BtCell::Oall, 1, 0),
    info(BtCell::Rdgap, BtCell::Rdgap, 1, 0),
    info(BtCell::Rfgap, BtCell::Oall, 0, 1),
    info(BtCell::Rfgap, BtCell::Rfgap, 0, 1),
];

impl BtTransition {
    pub const ALL: [BtTransition; 9] = [
        BtTransition::OallDiag,
        BtTransition::OallRefOpen,
        BtTransition::OallRefExtend,
        BtTransition::OallReadOpen,
        BtTransition::OallReadExtend,
        BtTransition::RdgapOpen,
        BtTransition::RdgapExtend,
        BtTransition::RfgapOpen,
        BtTransition::RfgapExtend,
    ];

    pub fn info(self) -> &'static TransitionInfo {
        &TRANSITIONS[self as usize]
    }

    pub fn is_diagonal(self) -> bool {
        self == BtTransition::OallDiag
    }

    /// Consumes a read position but no reference position.
    pub fn is_read_gap(self) -> bool {
        let t = self.info();
        t.read == 1 && t.reference == 0
    }

    /// Consumes a reference position but no read position.
    pub fn is_ref_gap(self) -> bool {
        let t = self.info();
        t.read == 0 && t.reference == 1
    }

    /// Transition taken out of `loc` given the cell's recorded tag, or
    /// `None` when the cell starts the alignment.
    fn select(loc: BtCell, tag: CellTag) -> Option<BtTransition> {
        let t = match loc {
            BtCell::Oall => match tag.source() {
                OallSource::Start => return None,
                OallSource::Diagonal => BtTransition::OallDiag,
                OallSource::ReadGap if tag.rdgap_extended() => BtTransition::OallReadExtend,
                OallSource::ReadGap => BtTransition::OallReadOpen,
                OallSource::RefGap if tag.rfgap_extended() => BtTransition::OallRefExtend,
                OallSource::RefGap => BtTransition::OallRefOpen,
            },
            BtCell::Rdgap if tag.rdgap_extended() => BtTransition::RdgapExtend,
            BtCell::Rdgap => BtTransition::RdgapOpen,
            BtCell::Rfgap if tag.rfgap_extended() => BtTransition::RfgapExtend,
            BtCell::Rfgap => BtTransition::RfgapOpen,
        };
        Some(t)
    }
}

/// One walk from an end cell back to its start cell.
///
/// `path`, `ned` and `aed` are in walk order, right to left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtWalk {
    pub start: Position,
    pub end: Position,
    pub path: Vec<BtTransition>,
    /// Nucleotide edits; gaps only for colorspace reads.
    pub ned: Vec<Edit>,
    /// Ambiguous reference resolutions.
    pub aed: Vec<Edit>,
}

impl BtWalk {
    pub fn steps(&self) -> u64 {
        self.path.len() as u64
    }
}

/// Walks the tags of a filled matrix.
pub struct Traceback<'a> {
    matrix: &'a DpMatrix,
    read: &'a Read,
    /// Masks the matrix was filled against.
    refm: &'a [u8],
}

impl<'a> Traceback<'a> {
    pub fn new(matrix: &'a DpMatrix, read: &'a Read, refm: &'a [u8]) -> Self {
        Self { matrix, read, refm }
    }

    fn ref_char(&self, j: usize) -> u8 {
        let mask = self.refm[j];
        match self.read.kind() {
            SequenceKind::Nucleotide => iupac_char(mask),
            SequenceKind::Color if mask.count_ones() == 1 => color_char(first_base(mask)),
            SequenceKind::Color => b'.',
        }
    }

    pub fn walk(&self, end: &EndCell) -> BtWalk {
        let (mut i, mut j) = (end.pos.i, end.pos.j);
        let mut loc = BtCell::Oall;
        let mut path = Vec::new();
        let mut ned = Vec::new();
        let mut aed = Vec::new();
        let nucleotide = self.read.kind() == SequenceKind::Nucleotide;

        while let Some(t) = BtTransition::select(loc, self.matrix.tag(i, j)) {
            let step = t.info();
            debug_assert_eq!(step.from, loc);
            assert!(
                i >= step.read && j >= step.reference,
                "backtrace left the matrix at ({}, {})",
                i,
                j
            );
            if t.is_diagonal() {
                if nucleotide {
                    self.diagonal_edits(i - 1, j - 1, &mut ned, &mut aed);
                }
            } else if t.is_read_gap() {
                ned.push(Edit::read_gap(i - 1, j, self.read.char_at(i - 1)));
            } else {
                ned.push(Edit::ref_gap(i, j - 1, self.ref_char(j - 1)));
            }
            path.push(t);
            i -= step.read;
            j -= step.reference;
            loc = step.to;
        }
        debug_assert_eq!(loc, BtCell::Oall);
        log::trace!(
            "Backtrace {:?} -> ({}, {}) in {} steps",
            end.pos,
            i,
            j,
            path.len()
        );

        BtWalk {
            start: Position { i, j },
            end: end.pos,
            path,
            ned,
            aed,
        }
    }

    fn diagonal_edits(&self, ri: usize, rj: usize, ned: &mut Vec<Edit>, aed: &mut Vec<Edit>) {
        let code = self.read.codes()[ri];
        let mask = self.refm[rj];
        let chr = iupac_char(mask);
        let qchr = self.read.char_at(ri);
        if mask != MASK_N && mask_contains(mask, code) {
            if is_ambiguous(mask) {
                aed.push(Edit::resolution(ri, rj, chr, qchr));
            }
            return;
        }
        ned.push(Edit::mismatch(ri, rj, chr, qchr));
        if is_ambiguous(mask) {
            aed.push(Edit::resolution(
                ri,
                rj,
                chr,
                base_char(first_base(mask)),
            ));
        }
    }
}
