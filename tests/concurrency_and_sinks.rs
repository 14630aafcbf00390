use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use sw_aligner::{
    AlignOutcome, Read, RefWindow, ScoringScheme, SharedSwMetrics, StreamTabActionReporter,
    StreamTabCounterReporter, SwActionSink, SwAligner, SwConfig, SwCounterSink, SwMetrics,
    SwResult, SwWorkerPool,
};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn scoring() -> ScoringScheme {
    ScoringScheme::new(2, 1, 3, 1).unwrap().with_min_score(6)
}

fn batch(count: usize) -> Vec<(Read, RefWindow)> {
    (0..count)
        .map(|k| {
            let seq: &[u8] = match k % 3 {
                0 => b"ACGTAC",
                1 => b"GGGGGG",
                _ => b"TTACGTAC",
            };
            (
                Read::new(&format!("read{}", k), seq, None).unwrap(),
                RefWindow::new(b"CCACGTACTT", k).unwrap(),
            )
        })
        .collect()
}

#[test]
fn test_aligner_reports_to_sinks() {
    let counter_buf = SharedBuf::default();
    let action_buf = SharedBuf::default();
    let counters = Arc::new(SwCounterSink::new(StreamTabCounterReporter::new(
        counter_buf.clone(),
    )));
    let actions = Arc::new(SwActionSink::new(StreamTabActionReporter::new(
        action_buf.clone(),
    )));
    let mut aligner = SwAligner::new(scoring(), SwConfig::default())
        .unwrap()
        .with_counter_sink(counters)
        .with_action_sink(actions);

    let window = RefWindow::new(b"ACGT", 7).unwrap();
    let mut res = SwResult::new();
    for seq in [&b"ACGT"[..], b"GGGG", b"AC"] {
        let read = Read::new("q", seq, None).unwrap();
        aligner.align(&read, &window, &mut res).unwrap();
    }

    assert_eq!(
        counter_buf.lines(),
        vec![
            "1\t16\t4\t0\t0\t1\t0\t4",
            "1\t12\t3\t1\t0\t0\t1\t0",
            "0\t0\t0\t0\t1\t0\t0\t0",
        ]
    );
    assert_eq!(
        action_buf.lines(),
        vec![
            "q\taligned\t4\t7\t4\t8",
            "q\tfailed\t4\t7\t4\t*",
            "q\tskipped\t2\t7\t4\t*",
        ]
    );
}

#[test]
fn test_thread_local_metrics_merge() {
    let shared = Arc::new(SharedSwMetrics::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let mut aligner = SwAligner::new(scoring(), SwConfig::default()).unwrap();
                let mut local = SwMetrics::new();
                let mut res = SwResult::new();
                for (read, window) in batch(30) {
                    aligner.align(&read, &window, &mut res).unwrap();
                    local.update(&res);
                }
                shared.merge(&local);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mut expected = SwMetrics::new();
    let mut aligner = SwAligner::new(scoring(), SwConfig::default()).unwrap();
    let mut res = SwResult::new();
    for (read, window) in batch(30) {
        aligner.align(&read, &window, &mut res).unwrap();
        expected.update(&res);
    }
    let mut four = SwMetrics::new();
    for _ in 0..4 {
        four.merge(&expected);
    }
    assert_eq!(shared.snapshot(), four);
}

#[test]
fn test_pool_matches_sequential() {
    let config = SwConfig::new().with_workers(4).with_channel_capacity(3);
    let pool = SwWorkerPool::new(scoring(), config.clone()).unwrap();
    assert_eq!(pool.workers(), 4);
    let first = pool.align_batch(batch(25)).unwrap();
    let second = pool.align_batch(batch(25)).unwrap();
    let totals = pool.shutdown().unwrap();

    let mut aligner = SwAligner::new(scoring(), config).unwrap();
    let mut expected = SwMetrics::new();
    for (k, (read, window)) in batch(25).into_iter().enumerate() {
        let mut res = SwResult::new();
        let outcome = aligner.align(&read, &window, &mut res).unwrap();
        expected.update(&res);
        expected.update(&res);
        for run in [&first, &second] {
            assert_eq!(run[k].id, k);
            assert_eq!(run[k].outcome, outcome);
            assert_eq!(run[k].result, res);
        }
    }
    assert_eq!(totals, expected);
    assert!(first.iter().any(|r| r.outcome == AlignOutcome::Aligned));
    assert!(first.iter().any(|r| r.outcome != AlignOutcome::Aligned));
}

#[test]
fn test_pool_workers_share_sinks() {
    let buf = SharedBuf::default();
    let sink = Arc::new(SwActionSink::new(StreamTabActionReporter::new(buf.clone())));
    let config = SwConfig::new().with_workers(3);
    let pool = SwWorkerPool::with_factory(&config, || {
        Ok(SwAligner::new(scoring(), config.clone())?.with_action_sink(Arc::clone(&sink)))
    })
    .unwrap();
    pool.align_batch(batch(12)).unwrap();
    pool.shutdown().unwrap();

    let lines = buf.lines();
    assert_eq!(lines.len(), 12);
    assert!(lines.iter().all(|l| l.split('\t').count() == 6));
}
