// src/collect/messages.rs
#![forbid(unsafe_code)]

use crate::error::CollectError;

/// One episode request. Jobs are plain tokens; the active policy travels
/// through the collector's shared slot, not through the queue.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EpisodeJob {
    pub job_id: u64,
    pub max_steps: u32,
}

/// Variable-length episode payload: the used prefix of each worker buffer.
#[derive(Debug)]
pub(crate) struct EpisodeResult {
    pub job_id: u64,
    pub length: u32,
    pub observations: Vec<f32>,
    pub actions: Vec<i32>,
    pub log_probs: Vec<f32>,
    pub values: Vec<f32>,
    pub rewards: Vec<f32>,
    pub dones: Vec<u8>,
}

/// What a worker pushes back: a finished episode, or the failure it caught.
/// Failures ride the result queue so a raising policy can never strand the
/// driver in its collection loop.
#[derive(Debug)]
pub(crate) enum EpisodeOutcome {
    Finished(EpisodeResult),
    Failed { job_id: u64, error: CollectError },
}
