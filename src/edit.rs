use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Read and reference disagree (or the read has an `N`).
    Mismatch,
    /// Read position aligned to a gap in the reference (insertion).
    ReadGap,
    /// Reference position aligned to a gap in the read (deletion).
    RefGap,
    /// Ambiguous reference position resolved to one base.
    Resolution,
}

/// One edit between read and reference window.
///
/// `pos` is the read offset and `ref_pos` the window offset. For a read
/// gap `ref_pos` is the reference position the inserted base precedes; for
/// a reference gap `pos` is the read position the deleted base precedes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    pub pos: usize,
    pub ref_pos: usize,
    /// Reference character, `-` for a read gap.
    pub chr: u8,
    /// Read character, `-` for a reference gap.
    pub qchr: u8,
    pub kind: EditKind,
}

impl Edit {
    pub fn mismatch(pos: usize, ref_pos: usize, chr: u8, qchr: u8) -> Self {
        Self {
            pos,
            ref_pos,
            chr,
            qchr,
            kind: EditKind::Mismatch,
        }
    }

    pub fn read_gap(pos: usize, ref_pos: usize, qchr: u8) -> Self {
        Self {
            pos,
            ref_pos,
            chr: b'-',
            qchr,
            kind: EditKind::ReadGap,
        }
    }

    pub fn ref_gap(pos: usize, ref_pos: usize, chr: u8) -> Self {
        Self {
            pos,
            ref_pos,
            chr,
            qchr: b'-',
            kind: EditKind::RefGap,
        }
    }

    /// `chr` is the ambiguity code, `qchr` the base it resolved to.
    pub fn resolution(pos: usize, ref_pos: usize, chr: u8, qchr: u8) -> Self {
        Self {
            pos,
            ref_pos,
            chr,
            qchr,
            kind: EditKind::Resolution,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self.kind, EditKind::ReadGap | EditKind::RefGap)
    }

    fn key(&self) -> (usize, usize) {
        (self.pos, self.ref_pos)
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}>{}",
            self.pos, self.chr as char, self.qchr as char
        )
    }
}

/// True when `edits` run left to right by read then reference offset.
pub fn edits_ordered(edits: &[Edit]) -> bool {
    edits.windows(2).all(|w| w[0].key() <= w[1].key())
}

/// Sort left to right.
pub fn sort_edits(edits: &mut [Edit]) {
    edits.sort_by_key(Edit::key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Edit::mismatch(3, 3, b'T', b'A').to_string(), "3:T>A");
        assert_eq!(Edit::read_gap(1, 1, b'C').to_string(), "1:->C");
        assert_eq!(Edit::ref_gap(2, 2, b'G').to_string(), "2:G>-");
    }

    #[test]
    fn test_ordering() {
        let mut edits = vec![
            Edit::ref_gap(4, 6, b'A'),
            Edit::mismatch(1, 1, b'C', b'A'),
            Edit::ref_gap(4, 5, b'A'),
        ];
        assert!(!edits_ordered(&edits));
        sort_edits(&mut edits);
        assert!(edits_ordered(&edits));
        assert_eq!(edits[1].ref_pos, 5);
    }
}
