#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentMode {
    /// Smith-Waterman: the alignment may start and end anywhere.
    #[default]
    Local,
    /// Every read position is aligned; reference ends are free.
    EndToEnd,
}

impl AlignmentMode {
    pub fn is_local(self) -> bool {
        matches!(self, AlignmentMode::Local)
    }
}

impl std::fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentMode::Local => write!(f, "local"),
            AlignmentMode::EndToEnd => write!(f, "end-to-end"),
        }
    }
}
