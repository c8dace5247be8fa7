// src/collect/worker.rs
#![forbid(unsafe_code)]

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::debug;

use crate::engine::{Action, Game, ACTION_DIM};
use crate::error::CollectError;
use crate::policy::Policy;

use super::messages::{EpisodeJob, EpisodeOutcome, EpisodeResult};

/// State the driver shares with every worker. The collector owns the workers
/// and outlives them (close joins), so workers hold non-owning `Arc` handles
/// to exactly this bundle and nothing else of the driver.
pub(crate) struct SharedState {
    /// Active policy for the in-flight request; None between requests.
    /// Locking the slot around each `decide` call serializes the policy.
    pub(crate) policy: Mutex<Option<Box<dyn Policy>>>,
}

/// Per-worker scratch sized for one full episode, reused across episodes.
pub(crate) struct WorkerBuffers {
    observations: Vec<f32>,
    actions: Vec<i32>,
    log_probs: Vec<f32>,
    values: Vec<f32>,
    rewards: Vec<f32>,
    dones: Vec<u8>,
}

impl WorkerBuffers {
    pub(crate) fn new(max_steps: u32, obs_dim: usize) -> Self {
        let t = max_steps as usize;
        Self {
            observations: vec![0.0; t * obs_dim],
            actions: vec![0; t],
            log_probs: vec![0.0; t],
            values: vec![0.0; t],
            rewards: vec![0.0; t],
            dones: vec![0; t],
        }
    }
}

/// Worker body: pop a job, run one episode, push the outcome, repeat.
///
/// The simulator and buffers are moved in, so exclusive ownership by this
/// thread holds by construction. `recv()` failing is the shutdown sentinel
/// (the driver dropped the job sender).
pub(crate) fn worker_loop(
    worker: usize,
    mut game: Game,
    mut buf: WorkerBuffers,
    obs_dim: usize,
    shared: Arc<SharedState>,
    jobs: Receiver<EpisodeJob>,
    results: Sender<EpisodeOutcome>,
) {
    debug!(worker, "rollout worker up");
    while let Ok(job) = jobs.recv() {
        let outcome = run_episode(worker, &mut game, &mut buf, obs_dim, &shared, job);
        if results.send(outcome).is_err() {
            break;
        }
    }
    debug!(worker, "rollout worker down");
}

fn run_episode(
    worker: usize,
    game: &mut Game,
    buf: &mut WorkerBuffers,
    obs_dim: usize,
    shared: &SharedState,
    job: EpisodeJob,
) -> EpisodeOutcome {
    let fail = |error: CollectError| EpisodeOutcome::Failed {
        job_id: job.job_id,
        error,
    };

    game.reset();
    let mut t = 0usize;

    while t < job.max_steps as usize {
        let start = t * obs_dim;
        game.observation()
            .flatten_into(&mut buf.observations[start..start + obs_dim]);

        let decision = {
            let mut slot = shared.policy.lock();
            let Some(policy) = slot.as_mut() else {
                return fail(CollectError::PolicyNotSet { worker });
            };
            let obs_row = &buf.observations[start..start + obs_dim];
            match catch_unwind(AssertUnwindSafe(|| policy.decide(obs_row))) {
                Ok(Ok(decision)) => decision,
                Ok(Err(source)) => return fail(CollectError::PolicyFailure { source }),
                Err(payload) => {
                    return fail(CollectError::PolicyFailure {
                        source: panic_message(payload).into(),
                    })
                }
            }
        };

        let Some(action) = Action::from_index(decision.action) else {
            return fail(CollectError::InvalidArgument(format!(
                "policy returned action {} (expected < {ACTION_DIM})",
                decision.action
            )));
        };

        let step = game.step(action);
        buf.actions[t] = decision.action as i32;
        buf.log_probs[t] = decision.log_prob;
        buf.values[t] = decision.value;
        buf.rewards[t] = step.reward;
        buf.dones[t] = u8::from(step.terminated);

        t += 1;
        if step.terminated {
            break;
        }
    }

    EpisodeOutcome::Finished(EpisodeResult {
        job_id: job.job_id,
        length: t as u32,
        observations: buf.observations[..t * obs_dim].to_vec(),
        actions: buf.actions[..t].to_vec(),
        log_probs: buf.log_probs[..t].to_vec(),
        values: buf.values[..t].to_vec(),
        rewards: buf.rewards[..t].to_vec(),
        dones: buf.dones[..t].to_vec(),
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "policy panicked".to_string()
    }
}
