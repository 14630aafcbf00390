//! Nucleotide decoding for colorspace alignments.
//!
//! The matrix aligns read colors against reference colors. Afterwards the
//! read's nucleotides are decoded with a four-state Viterbi pass that
//! weighs disagreeing with the reference (a SNP) against disagreeing with
//! an observed color (a miscall). A true SNP changes two adjacent colors,
//! so it decodes cleanly, whereas an isolated color mismatch decodes as a
//! miscall.

use crate::edit::{sort_edits, Edit};
use crate::scoring::ScoringScheme;
use crate::sequence::{
    base_char, color_char, color_of, first_base, iupac_char, is_ambiguous, mask_contains, Read,
    COLOR_UNKNOWN, MASK_N,
};
use crate::traceback::BtWalk;
use crate::MAX_SCALED_QUALITY;

/// Decoded nucleotides and the edits they imply, in left-to-right order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorDecoding {
    /// `read.len() + 1` decoded nucleotide codes.
    pub nucs: Vec<u8>,
    pub nup: u8,
    pub ndn: u8,
    pub ned: Vec<Edit>,
    pub aed: Vec<Edit>,
    pub ced: Vec<Edit>,
    pub cmiss: Vec<Edit>,
}

impl ColorDecoding {
    /// Reverse every edit list into walk (right-to-left) order.
    pub fn into_walk_order(mut self) -> Self {
        self.ned.reverse();
        self.aed.reverse();
        self.ced.reverse();
        self.cmiss.reverse();
        self
    }
}

/// Reference constraint on one decoded nucleotide.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    mask: u8,
    ref_pos: usize,
}

/// Decode `read` (colors) given the walk over `color_masks`, the color
/// masks derived from the nucleotide masks `refm`.
pub fn decode(
    read: &Read,
    refm: &[u8],
    color_masks: &[u8],
    walk: &BtWalk,
    scoring: &ScoringScheme,
) -> ColorDecoding {
    debug_assert!(read.is_color());
    let colors = read.codes();
    let quals = read.quals();

    let mut anchors: Vec<Option<Anchor>> = vec![None; colors.len() + 1];
    let mut diagonals = Vec::new();
    let (mut i, mut j) = (walk.start.i, walk.start.j);
    for t in walk.path.iter().rev() {
        if t.is_diagonal() {
            diagonals.push((i, j));
            // Across a reference gap the left column's anchor is kept
            for (p, r) in [(i, j), (i + 1, j + 1)] {
                if anchors[p].is_none() {
                    anchors[p] = Some(Anchor {
                        mask: refm[r],
                        ref_pos: r,
                    });
                }
            }
        }
        let step = t.info();
        i += step.read;
        j += step.reference;
    }

    let nucs = viterbi(colors, quals, &anchors, scoring);
    let mut out = ColorDecoding {
        nup: nucs[walk.start.i],
        ndn: nucs[walk.end.i],
        ..ColorDecoding::default()
    };

    for (p, anchor) in anchors.iter().enumerate() {
        let Some(a) = anchor else { continue };
        let b = nucs[p];
        let chr = iupac_char(a.mask);
        if a.mask != MASK_N && mask_contains(a.mask, b) {
            if is_ambiguous(a.mask) {
                out.aed.push(Edit::resolution(p, a.ref_pos, chr, base_char(b)));
            }
            continue;
        }
        out.ned.push(Edit::mismatch(p, a.ref_pos, chr, base_char(b)));
        if is_ambiguous(a.mask) {
            out.aed.push(Edit::resolution(
                p,
                a.ref_pos,
                chr,
                base_char(first_base(a.mask)),
            ));
        }
    }

    for &(k, r) in &diagonals {
        let c = colors[k];
        let cm = color_masks[r];
        let decoded = color_of(nucs[k], nucs[k + 1]);
        let miscall = c != COLOR_UNKNOWN && c != decoded;
        let matches_ref = c != COLOR_UNKNOWN && cm != MASK_N && mask_contains(cm, c);
        if miscall || !matches_ref {
            let ref_chr = if cm.count_ones() == 1 {
                color_char(first_base(cm))
            } else {
                b'.'
            };
            out.ced.push(Edit::mismatch(k, r, ref_chr, color_char(c)));
        }
        if miscall {
            out.cmiss
                .push(Edit::mismatch(k, r, color_char(decoded), color_char(c)));
        }
    }

    // Gaps are in color coordinates; merge them with the decoded mismatches
    out.ned.extend(walk.ned.iter().filter(|e| e.is_gap()).copied());
    sort_edits(&mut out.ned);
    out.nucs = nucs;
    out
}

/// Cheapest nucleotide string; a miscall costs the color's Phred quality.
fn viterbi(
    colors: &[u8],
    quals: &[u8],
    anchors: &[Option<Anchor>],
    scoring: &ScoringScheme,
) -> Vec<u8> {
    let len = colors.len() + 1;
    let nuc_cost = |p: usize, b: u8| -> i64 {
        match anchors[p] {
            Some(a) if !mask_contains(a.mask, b) => scoring.snp_penalty as i64,
            _ => 0,
        }
    };

    let mut cost = vec![[0i64; 4]; len];
    let mut back = vec![[0u8; 4]; len];
    for b in 0..4u8 {
        cost[0][b as usize] = nuc_cost(0, b);
    }
    for p in 1..len {
        let c = colors[p - 1];
        let miscall = quals[p - 1].min(MAX_SCALED_QUALITY) as i64;
        for b in 0..4u8 {
            let mut best = i64::MAX;
            let mut arg = 0u8;
            for a in 0..4u8 {
                let t = if c == COLOR_UNKNOWN || color_of(a, b) == c {
                    0
                } else {
                    miscall
                };
                let v = cost[p - 1][a as usize] + t;
                if v < best {
                    best = v;
                    arg = a;
                }
            }
            cost[p][b as usize] = best + nuc_cost(p, b);
            back[p][b as usize] = arg;
        }
    }

    let mut last = 0u8;
    for b in 1..4u8 {
        if cost[len - 1][b as usize] < cost[len - 1][last as usize] {
            last = b;
        }
    }
    let mut nucs = vec![0u8; len];
    nucs[len - 1] = last;
    for p in (1..len).rev() {
        nucs[p - 1] = back[p][nucs[p] as usize];
    }
    nucs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Position;
    use crate::sequence::{encode_iupac, RefWindow};
    use crate::traceback::BtTransition;

    fn diagonal_walk(len: usize) -> BtWalk {
        BtWalk {
            start: Position { i: 0, j: 0 },
            end: Position { i: len, j: len },
            path: vec![BtTransition::OallDiag; len],
            ned: Vec::new(),
            aed: Vec::new(),
        }
    }

    fn encode_colors(nucs: &[u8]) -> Vec<u8> {
        let codes: Vec<u8> = nucs
            .iter()
            .map(|&c| encode_iupac(c).unwrap().trailing_zeros() as u8)
            .collect();
        codes.windows(2).map(|w| b'0' + color_of(w[0], w[1])).collect()
    }

    #[test]
    fn test_perfect_decoding() {
        let window = RefWindow::new(b"ACGTTGCA", 0).unwrap();
        let read = Read::from_colors("r", &encode_colors(b"ACGTTGCA"), None).unwrap();
        let walk = diagonal_walk(read.len());
        let out = decode(
            &read,
            window.masks(),
            &window.color_masks(),
            &walk,
            &ScoringScheme::default(),
        );
        assert_eq!(out.nucs, vec![0, 1, 2, 3, 3, 2, 1, 0]);
        assert_eq!(out.nup, 0);
        assert_eq!(out.ndn, 0);
        assert!(out.ned.is_empty());
        assert!(out.ced.is_empty());
        assert!(out.cmiss.is_empty());
    }

    #[test]
    fn test_snp_is_two_color_edits_without_miscalls() {
        let window = RefWindow::new(b"ACGTTGCA", 0).unwrap();
        // T at offset 3 replaced by A
        let read = Read::from_colors("r", &encode_colors(b"ACGATGCA"), None).unwrap();
        let walk = diagonal_walk(read.len());
        let out = decode(
            &read,
            window.masks(),
            &window.color_masks(),
            &walk,
            &ScoringScheme::default(),
        );
        assert_eq!(out.nucs[3], 0);
        assert_eq!(out.ned.len(), 1);
        assert_eq!(out.ned[0].pos, 3);
        assert_eq!(out.ced.len(), 2);
        assert!(out.cmiss.is_empty());
    }

    #[test]
    fn test_isolated_color_error_is_miscall() {
        let window = RefWindow::new(b"ACGTTGCA", 0).unwrap();
        let mut colors = encode_colors(b"ACGTTGCA");
        colors[4] = if colors[4] == b'0' { b'1' } else { b'0' };
        let read = Read::from_colors("r", &colors, None).unwrap();
        let walk = diagonal_walk(read.len());
        let out = decode(
            &read,
            window.masks(),
            &window.color_masks(),
            &walk,
            &ScoringScheme::default(),
        );
        assert!(out.ned.is_empty());
        assert_eq!(out.ced.len(), 1);
        assert_eq!(out.cmiss.len(), 1);
        assert_eq!(out.cmiss[0].pos, 4);
        assert_eq!(out.nucs, vec![0, 1, 2, 3, 3, 2, 1, 0]);
    }
}
