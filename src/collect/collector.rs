// src/collect/collector.rs
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::engine::{Game, Observation, DEFAULT_QUEUE_PREVIEW, MAX_QUEUE_PREVIEW};
use crate::error::CollectError;
use crate::policy::Policy;

use super::batch::EpisodeBatch;
use super::messages::{EpisodeJob, EpisodeOutcome};
use super::worker::{worker_loop, SharedState, WorkerBuffers};

#[derive(Clone, Copy, Debug)]
pub struct CollectorConfig {
    /// Worker thread count; each worker owns one simulator.
    pub num_workers: usize,
    /// Per-episode step cap.
    pub max_steps: u32,
    /// Upcoming-piece preview length per simulator.
    pub queue_size: usize,
    /// Worker `w` is seeded with `seed_base + w`.
    pub seed_base: u64,
}

impl CollectorConfig {
    pub fn new(num_workers: usize, max_steps: u32) -> Self {
        Self {
            num_workers,
            max_steps,
            queue_size: DEFAULT_QUEUE_PREVIEW,
            seed_base: 0,
        }
    }

    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    pub fn with_seed_base(mut self, seed_base: u64) -> Self {
        self.seed_base = seed_base;
        self
    }
}

/// Batched rollout driver over a pool of long-lived worker threads.
///
/// Each worker exclusively owns one simulator and its scratch buffers; the
/// driver talks to the pool through a job channel and a result channel only.
/// Reproducibility is per (worker, episode-within-worker): two collectors
/// with the same `seed_base`, worker count, and deterministic policy produce
/// the same episodes, though multi-worker result order may differ.
pub struct Collector {
    shared: Arc<SharedState>,
    /// None once closed; dropping the sender is the worker shutdown signal.
    job_tx: Option<Sender<EpisodeJob>>,
    result_rx: Receiver<EpisodeOutcome>,
    workers: Vec<JoinHandle<()>>,
    next_job_id: u64,
    max_steps: u32,
    obs_dim: usize,
}

impl Collector {
    pub fn new(cfg: CollectorConfig) -> Result<Self, CollectError> {
        if cfg.num_workers == 0 {
            return Err(CollectError::InvalidArgument(
                "num_workers must be positive".into(),
            ));
        }
        if cfg.max_steps == 0 {
            return Err(CollectError::InvalidArgument(
                "max_steps must be positive".into(),
            ));
        }
        if cfg.queue_size == 0 || cfg.queue_size > MAX_QUEUE_PREVIEW {
            return Err(CollectError::InvalidArgument(format!(
                "queue_size must be in 1..={MAX_QUEUE_PREVIEW}, got {}",
                cfg.queue_size
            )));
        }

        let obs_dim = Observation::new(cfg.queue_size).dim();
        let shared = Arc::new(SharedState {
            policy: Mutex::new(None),
        });
        let (job_tx, job_rx) = crossbeam_channel::unbounded();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let mut workers = Vec::with_capacity(cfg.num_workers);
        for w in 0..cfg.num_workers {
            let game = Game::new(cfg.queue_size, cfg.seed_base.wrapping_add(w as u64));
            let buf = WorkerBuffers::new(cfg.max_steps, obs_dim);
            let shared = Arc::clone(&shared);
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("tetris-worker-{w}"))
                .spawn(move || worker_loop(w, game, buf, obs_dim, shared, jobs, results))
                .expect("spawn rollout worker thread");
            workers.push(handle);
        }

        info!(
            num_workers = cfg.num_workers,
            max_steps = cfg.max_steps,
            obs_dim,
            "collector up"
        );

        Ok(Self {
            shared,
            job_tx: Some(job_tx),
            result_rx,
            workers,
            next_job_id: 0,
            max_steps: cfg.max_steps,
            obs_dim,
        })
    }

    /// Flat observation length; invariant for the collector's lifetime.
    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Run `num_episodes` episodes across the pool and assemble the batch.
    ///
    /// The policy is installed for the duration of the request and every
    /// `decide` call happens under one mutex, so calls are serialized, never
    /// concurrent; that is part of the contract with policy authors.
    ///
    /// Exactly `num_episodes` outcomes are drained even when some fail, so
    /// stale results cannot leak into a later request; the first failure is
    /// then surfaced.
    pub fn request_episodes(
        &mut self,
        num_episodes: usize,
        policy: Box<dyn Policy>,
    ) -> Result<EpisodeBatch, CollectError> {
        // Cheap handle clone so job pushes don't hold a borrow of self.
        let Some(job_tx) = self.job_tx.clone() else {
            return Err(CollectError::Closed);
        };
        if num_episodes == 0 {
            return Err(CollectError::InvalidArgument(
                "num_episodes must be positive".into(),
            ));
        }

        debug!(num_episodes, "episode request");
        *self.shared.policy.lock() = Some(policy);

        for _ in 0..num_episodes {
            let job = EpisodeJob {
                job_id: self.next_job_id,
                max_steps: self.max_steps,
            };
            self.next_job_id += 1;
            if job_tx.send(job).is_err() {
                *self.shared.policy.lock() = None;
                return Err(CollectError::Closed);
            }
        }

        let mut finished = Vec::with_capacity(num_episodes);
        let mut first_failure = None;
        for _ in 0..num_episodes {
            match self.result_rx.recv() {
                Ok(EpisodeOutcome::Finished(result)) => {
                    debug!(job_id = result.job_id, length = result.length, "episode collected");
                    finished.push(result);
                }
                Ok(EpisodeOutcome::Failed { job_id, error }) => {
                    warn!(job_id, %error, "episode failed");
                    if first_failure.is_none() {
                        first_failure = Some(error);
                    }
                }
                Err(_) => {
                    if first_failure.is_none() {
                        first_failure = Some(CollectError::Closed);
                    }
                    break;
                }
            }
        }

        *self.shared.policy.lock() = None;

        if let Some(error) = first_failure {
            return Err(error);
        }
        Ok(EpisodeBatch::assemble(
            num_episodes,
            self.max_steps,
            self.obs_dim,
            finished,
        ))
    }

    /// Final shutdown: close the job queue and join every worker. Idempotent.
    /// In-flight episodes run to their natural end before the owning worker
    /// observes the closed queue and exits; there is no mid-episode cancel.
    pub fn close(&mut self) {
        if let Some(job_tx) = self.job_tx.take() {
            drop(job_tx);
            for handle in self.workers.drain(..) {
                let _ = handle.join();
            }
            info!("collector closed");
        }
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        self.close();
    }
}
