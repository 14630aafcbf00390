use std::io;
use std::sync::Arc;

use sw_aligner::{
    AlignmentMode, Read, RefWindow, ScoringScheme, StreamTabActionReporter,
    StreamTabCounterReporter, SwActionSink, SwAligner, SwConfig, SwCounterSink, SwMetrics,
    SwResult, SwWorkerPool,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = SwConfig::new()
        .with_mode(AlignmentMode::EndToEnd)
        .with_env_overrides();
    let scoring = ScoringScheme::new(2, 1, 3, 1)?.with_min_score(-10);

    let counters = Arc::new(SwCounterSink::new(StreamTabCounterReporter::new(
        io::stdout(),
    )));
    let actions = Arc::new(SwActionSink::new(StreamTabActionReporter::new(
        io::stdout(),
    )));
    let mut aligner = SwAligner::new(scoring, config.clone())?
        .with_counter_sink(Arc::clone(&counters))
        .with_action_sink(Arc::clone(&actions));

    let window = RefWindow::new(b"ACGT", 0)?;
    let mut res = SwResult::new();
    let mut metrics = SwMetrics::new();
    for (name, seq) in [("exact", &b"ACGT"[..]), ("subst", &b"ACGA"[..]), ("ins", &b"ACCGT"[..])] {
        let read = Read::new(name, seq, None)?;
        let outcome = aligner.align(&read, &window, &mut res)?;
        metrics.update(&res);
        let edits: Vec<String> = res.alres.ned.iter().map(|e| e.to_string()).collect();
        println!("{}: {} score={:?} edits=[{}]", name, outcome, res.score(), edits.join(","));
    }
    counters.flush()?;
    actions.flush()?;

    let pool = SwWorkerPool::new(scoring, config)?;
    let batch = (0..16)
        .map(|k| -> sw_aligner::Result<_> {
            let read = Read::new(&format!("read{}", k), b"GATTACA", None)?;
            Ok((read, RefWindow::new(b"CCGATTTACAGG", k * 100)?))
        })
        .collect::<sw_aligner::Result<Vec<_>>>()?;
    let results = pool.align_batch(batch)?;
    let aligned = results.iter().filter(|r| !r.result.is_empty()).count();
    metrics.merge(&pool.shutdown()?);

    println!("Pool aligned {}/{} reads", aligned, results.len());
    println!("Totals: {:?}", metrics);

    Ok(())
}
