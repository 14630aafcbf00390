use sw_aligner::sequence::color_of;
use sw_aligner::{AlignOutcome, Read, RefWindow, ScoringScheme, SwAligner, SwConfig, SwResult};

fn colors_of(nucs: &[u8]) -> Vec<u8> {
    let code = |c: u8| match c {
        b'A' => 0,
        b'C' => 1,
        b'G' => 2,
        _ => 3,
    };
    nucs.windows(2)
        .map(|w| b'0' + color_of(code(w[0]), code(w[1])))
        .collect()
}

fn align_colors(colors: &[u8], refs: &[u8]) -> (AlignOutcome, SwResult) {
    let scoring = ScoringScheme::new(2, 1, 3, 1).unwrap();
    let mut aligner = SwAligner::new(scoring, SwConfig::default()).unwrap();
    let read = Read::from_colors("cs", colors, None).unwrap();
    let window = RefWindow::new(refs, 0).unwrap();
    let mut res = SwResult::new();
    let outcome = aligner.align(&read, &window, &mut res).unwrap();
    (outcome, res)
}

#[test]
fn test_perfect_color_read() {
    let (outcome, res) = align_colors(&colors_of(b"ACGTTGCA"), b"ACGTTGCA");
    assert_eq!(outcome, AlignOutcome::Aligned);
    assert_eq!(res.score(), Some(14));
    assert_eq!(res.nup, Some(0));
    assert_eq!(res.ndn, Some(0));
    assert!(res.alres.ned.is_empty());
    assert!(res.alres.ced.is_empty());
    assert!(res.alres.cmiss.is_empty());
    assert_eq!(res.alres.read_span, 0..7);
}

#[test]
fn test_snp_decodes_to_one_nucleotide_edit() {
    let (outcome, res) = align_colors(&colors_of(b"ACGATGCA"), b"ACGTTGCA");
    assert_eq!(outcome, AlignOutcome::Aligned);
    assert_eq!(res.score(), Some(8));
    assert_eq!(res.alres.ned.len(), 1);
    let snp = res.alres.ned[0];
    assert_eq!((snp.pos, snp.chr, snp.qchr), (3, b'T', b'A'));
    assert_eq!(res.alres.ced.len(), 2);
    assert!(res.alres.ced[0].pos < res.alres.ced[1].pos);
    assert!(res.alres.cmiss.is_empty());
    assert!(res.rep_ok());
}

#[test]
fn test_nucleotide_read_has_no_color_edits() {
    let scoring = ScoringScheme::new(2, 1, 3, 1).unwrap();
    let mut aligner = SwAligner::new(scoring, SwConfig::default()).unwrap();
    let read = Read::new("nt", b"ACGATGCA", None).unwrap();
    let window = RefWindow::new(b"ACGTTGCA", 0).unwrap();
    let mut res = SwResult::new();
    aligner.align(&read, &window, &mut res).unwrap();
    assert!(res.alres.ced.is_empty());
    assert_eq!(res.nup, None);
    assert_eq!(res.alres.ned.len(), 1);
}
