//! Read and reference-window encodings.
//!
//! Read bases are codes `A=0, C=1, G=2, T=3, N=4`. Reference positions are
//! 4-bit IUPAC masks (`A=1, C=2, G=4, T=8`) so ambiguity codes can be
//! matched against any of their bases. Colorspace reads carry SOLiD colors
//! `0..=3` with `4` for an unknown call (`.`).

use crate::{Result, SwAlignerError, DEFAULT_QUALITY};

pub const BASE_N: u8 = 4;
pub const COLOR_UNKNOWN: u8 = 4;
pub const MASK_N: u8 = 0b1111;

const NUC_CHARS: &[u8; 5] = b"ACGTN";
const COLOR_CHARS: &[u8; 5] = b"0123.";
// Indexed by mask
const IUPAC_CHARS: &[u8; 16] = b"-ACMGRSVTWYHKDBN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Nucleotide,
    Color,
}

pub fn encode_base(c: u8) -> Option<u8> {
    match c.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' | b'U' => Some(3),
        b'N' | b'.' => Some(BASE_N),
        _ => None,
    }
}

pub fn encode_color(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'3' => Some(c - b'0'),
        b'.' | b'N' | b'n' | b'4' => Some(COLOR_UNKNOWN),
        _ => None,
    }
}

pub fn encode_iupac(c: u8) -> Option<u8> {
    let mask = match c.to_ascii_uppercase() {
        b'A' => 0b0001,
        b'C' => 0b0010,
        b'G' => 0b0100,
        b'T' | b'U' => 0b1000,
        b'M' => 0b0011,
        b'R' => 0b0101,
        b'W' => 0b1001,
        b'S' => 0b0110,
        b'Y' => 0b1010,
        b'K' => 0b1100,
        b'V' => 0b0111,
        b'H' => 0b1011,
        b'D' => 0b1101,
        b'B' => 0b1110,
        b'N' => MASK_N,
        _ => return None,
    };
    Some(mask)
}

pub fn base_char(code: u8) -> u8 {
    NUC_CHARS[code.min(BASE_N) as usize]
}

pub fn color_char(code: u8) -> u8 {
    COLOR_CHARS[code.min(COLOR_UNKNOWN) as usize]
}

pub fn iupac_char(mask: u8) -> u8 {
    IUPAC_CHARS[(mask & MASK_N) as usize]
}

pub fn mask_contains(mask: u8, code: u8) -> bool {
    code < BASE_N && mask & (1 << code) != 0
}

pub fn is_ambiguous(mask: u8) -> bool {
    mask.count_ones() > 1
}

/// Lowest base code allowed by `mask`.
pub fn first_base(mask: u8) -> u8 {
    debug_assert!(mask != 0);
    mask.trailing_zeros() as u8
}

/// SOLiD color of the dinucleotide `(a, b)`.
pub fn color_of(a: u8, b: u8) -> u8 {
    debug_assert!(a < BASE_N && b < BASE_N);
    a ^ b
}

/// Set of colors produced by any pair drawn from two reference masks.
pub fn color_mask(left: u8, right: u8) -> u8 {
    let mut out = 0u8;
    for a in 0..4u8 {
        if left & (1 << a) == 0 {
            continue;
        }
        for b in 0..4u8 {
            if right & (1 << b) != 0 {
                out |= 1 << color_of(a, b);
            }
        }
    }
    out
}

/// A query sequence: nucleotides or colors, with Phred qualities.
#[derive(Debug, Clone)]
pub struct Read {
    pub name: String,
    kind: SequenceKind,
    seq: Vec<u8>,
    qual: Vec<u8>,
}

impl Read {
    /// Nucleotide read from ASCII bases and optional Phred+33 qualities.
    pub fn new(name: &str, seq: &[u8], qual: Option<&[u8]>) -> Result<Self> {
        let codes = encode_all(seq, encode_base)?;
        Self::from_codes(name, SequenceKind::Nucleotide, codes, qual)
    }

    /// Colorspace read from ASCII colors (`0123.`) and optional qualities.
    pub fn from_colors(name: &str, colors: &[u8], qual: Option<&[u8]>) -> Result<Self> {
        let codes = encode_all(colors, encode_color)?;
        Self::from_codes(name, SequenceKind::Color, codes, qual)
    }

    fn from_codes(
        name: &str,
        kind: SequenceKind,
        seq: Vec<u8>,
        qual: Option<&[u8]>,
    ) -> Result<Self> {
        if seq.is_empty() {
            return Err(SwAlignerError::EmptySequence(format!("read {}", name)));
        }
        let qual = match qual {
            Some(q) if q.len() != seq.len() => {
                return Err(SwAlignerError::QualityLengthMismatch {
                    seq_len: seq.len(),
                    qual_len: q.len(),
                })
            }
            Some(q) => q.iter().map(|&c| c.saturating_sub(33)).collect(),
            None => vec![DEFAULT_QUALITY; seq.len()],
        };
        Ok(Self {
            name: name.to_string(),
            kind,
            seq,
            qual,
        })
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn is_color(&self) -> bool {
        self.kind == SequenceKind::Color
    }

    /// Encoded bases or colors.
    pub fn codes(&self) -> &[u8] {
        &self.seq
    }

    pub fn quals(&self) -> &[u8] {
        &self.qual
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Printable character for position `i`.
    pub fn char_at(&self, i: usize) -> u8 {
        match self.kind {
            SequenceKind::Nucleotide => base_char(self.seq[i]),
            SequenceKind::Color => color_char(self.seq[i]),
        }
    }
}

/// A slice of the reference handed to the engine by the seed driver.
#[derive(Debug, Clone)]
pub struct RefWindow {
    masks: Vec<u8>,
    /// Offset of the window's first base within the full reference.
    pub offset: usize,
}

impl RefWindow {
    pub fn new(seq: &[u8], offset: usize) -> Result<Self> {
        let masks = encode_all(seq, encode_iupac)?;
        if masks.is_empty() {
            return Err(SwAlignerError::EmptySequence("reference window".to_string()));
        }
        Ok(Self { masks, offset })
    }

    pub fn masks(&self) -> &[u8] {
        &self.masks
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Color masks between consecutive positions (`len() - 1` entries).
    pub fn color_masks(&self) -> Vec<u8> {
        self.masks
            .windows(2)
            .map(|w| color_mask(w[0], w[1]))
            .collect()
    }
}

fn encode_all(seq: &[u8], encode: fn(u8) -> Option<u8>) -> Result<Vec<u8>> {
    seq.iter()
        .enumerate()
        .map(|(pos, &c)| {
            encode(c).ok_or(SwAlignerError::InvalidBase {
                ch: c as char,
                pos,
            })
        })
        .collect()
}
