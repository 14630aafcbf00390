//! Batch alignment across worker threads.
//!
//! Every worker owns an `SwAligner` and a thread-local `SwMetrics`. Jobs
//! and results travel over bounded channels; a worker folds its local
//! metrics into the pool's shared totals whenever it runs out of queued
//! work and once more when it exits.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::aligner::{AlignOutcome, SwAligner};
use crate::config::SwConfig;
use crate::metrics::{SharedSwMetrics, SwMetrics};
use crate::result::SwResult;
use crate::scoring::ScoringScheme;
use crate::sequence::{Read, RefWindow};
use crate::{Result, SwAlignerError};

#[derive(Debug, Clone)]
pub struct SwJob {
    pub id: usize,
    pub read: Read,
    pub window: RefWindow,
}

#[derive(Debug, Clone)]
pub struct SwJobResult {
    pub id: usize,
    pub outcome: AlignOutcome,
    pub result: SwResult,
}

pub struct SwWorkerPool {
    job_tx: Option<Sender<SwJob>>,
    result_rx: Receiver<Result<SwJobResult>>,
    workers: Vec<thread::JoinHandle<()>>,
    metrics: Arc<SharedSwMetrics>,
}

impl SwWorkerPool {
    /// One aligner per worker, all with the same scoring and config.
    pub fn new(scoring: ScoringScheme, config: SwConfig) -> Result<Self> {
        let per_worker = config.clone();
        Self::with_factory(&config, || SwAligner::new(scoring, per_worker.clone()))
    }

    /// Build each worker's aligner with `factory`, e.g. to attach sinks.
    pub fn with_factory<F>(config: &SwConfig, mut factory: F) -> Result<Self>
    where
        F: FnMut() -> Result<SwAligner>,
    {
        let workers_wanted = config.workers.max(1);
        let (job_tx, job_rx) = bounded::<SwJob>(config.channel_capacity.max(1));
        let (result_tx, result_rx) = bounded(config.channel_capacity.max(1));
        let metrics = Arc::new(SharedSwMetrics::new());

        let mut workers = Vec::with_capacity(workers_wanted);
        for worker_id in 0..workers_wanted {
            let aligner = factory()?;
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let metrics = Arc::clone(&metrics);
            let handle = thread::Builder::new()
                .name(format!("sw-worker-{}", worker_id))
                .spawn(move || Self::worker(worker_id, aligner, job_rx, result_tx, metrics))
                .map_err(|e| SwAlignerError::WorkerPool(e.to_string()))?;
            workers.push(handle);
        }
        log::info!("Started {} alignment workers", workers.len());

        Ok(Self {
            job_tx: Some(job_tx),
            result_rx,
            workers,
            metrics,
        })
    }

    fn worker(
        worker_id: usize,
        mut aligner: SwAligner,
        job_rx: Receiver<SwJob>,
        result_tx: Sender<Result<SwJobResult>>,
        shared: Arc<SharedSwMetrics>,
    ) {
        let mut local = SwMetrics::new();
        loop {
            let job = match job_rx.try_recv() {
                Ok(job) => job,
                Err(TryRecvError::Empty) => {
                    // Idle: publish what we have before blocking
                    if !local.is_zero() {
                        shared.merge(&local);
                        local.reset();
                    }
                    match job_rx.recv() {
                        Ok(job) => job,
                        Err(_) => break,
                    }
                }
                Err(TryRecvError::Disconnected) => break,
            };

            let mut res = SwResult::new();
            let aligned = panic::catch_unwind(AssertUnwindSafe(|| {
                aligner.align(&job.read, &job.window, &mut res)
            }));
            let reply = match aligned {
                Ok(Ok(outcome)) => {
                    local.update(&res);
                    Ok(SwJobResult {
                        id: job.id,
                        outcome,
                        result: res,
                    })
                }
                Ok(Err(e)) => Err(e),
                Err(_) => {
                    log::warn!(
                        "Worker {} panicked aligning job {} ({})",
                        worker_id,
                        job.id,
                        job.read.name
                    );
                    Err(SwAlignerError::WorkerPool(format!(
                        "worker {} panicked on job {}",
                        worker_id, job.id
                    )))
                }
            };
            if result_tx.send(reply).is_err() {
                break;
            }
        }
        shared.merge(&local);
        log::debug!("Worker {} exiting", worker_id);
    }

    /// Align every pair and return the results in submission order.
    ///
    /// The first failing job's error is returned once the whole batch has
    /// drained, so no stale results are left for the next batch.
    pub fn align_batch(&self, pairs: Vec<(Read, RefWindow)>) -> Result<Vec<SwJobResult>> {
        let job_tx = self
            .job_tx
            .as_ref()
            .ok_or_else(|| SwAlignerError::WorkerPool("pool is shut down".to_string()))?;
        let total = pairs.len();
        let mut jobs = pairs
            .into_iter()
            .enumerate()
            .map(|(id, (read, window))| SwJob { id, read, window });
        let mut held: Option<SwJob> = None;
        let mut received = 0;
        let mut results = Vec::with_capacity(total);
        let mut first_err = None;

        while received < total {
            // Queue as much as fits, then wait for one result
            while let Some(job) = held.take().or_else(|| jobs.next()) {
                match job_tx.try_send(job) {
                    Ok(()) => {}
                    Err(TrySendError::Full(job)) => {
                        held = Some(job);
                        break;
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        return Err(SwAlignerError::WorkerPool(
                            "all workers have exited".to_string(),
                        ))
                    }
                }
            }
            let reply = self
                .result_rx
                .recv()
                .map_err(|e| SwAlignerError::WorkerPool(e.to_string()))?;
            received += 1;
            match reply {
                Ok(r) => results.push(r),
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_err {
            return Err(e);
        }
        results.sort_by_key(|r| r.id);
        Ok(results)
    }

    /// Shared totals; may trail results of jobs that are still in flight.
    pub fn metrics(&self) -> Arc<SharedSwMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Stop the workers and return the exact totals.
    pub fn shutdown(mut self) -> Result<SwMetrics> {
        let panicked = self.stop();
        if panicked > 0 {
            return Err(SwAlignerError::WorkerPool(format!(
                "{} workers panicked",
                panicked
            )));
        }
        Ok(self.metrics.snapshot())
    }

    fn stop(&mut self) -> usize {
        // Closing the job channel ends each worker's loop
        self.job_tx.take();
        let mut panicked = 0;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            log::warn!("{} alignment workers panicked", panicked);
        }
        panicked
    }
}

impl Drop for SwWorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}
