// src/collect/batch.rs
#![forbid(unsafe_code)]

use super::messages::EpisodeResult;

/// Dense batched rollout output.
///
/// Every array is flat row-major over fixed shapes: `observations` is
/// `[num_episodes, max_steps, obs_dim]` f32, the per-step arrays are
/// `[num_episodes, max_steps]`, `lengths` is `[num_episodes]`. Positions at
/// step indices `>= lengths[ep]` are guaranteed bitwise zero; consumers mask
/// by `lengths`. Which episode row received which result is unspecified
/// (first finished, first row).
#[derive(Clone, Debug)]
pub struct EpisodeBatch {
    num_episodes: usize,
    max_steps: usize,
    obs_dim: usize,

    pub observations: Vec<f32>,
    pub actions: Vec<i32>,
    pub log_probs: Vec<f32>,
    pub values: Vec<f32>,
    pub rewards: Vec<f32>,
    pub dones: Vec<u8>,
    pub lengths: Vec<u32>,
}

impl EpisodeBatch {
    pub(crate) fn assemble(
        num_episodes: usize,
        max_steps: u32,
        obs_dim: usize,
        results: Vec<EpisodeResult>,
    ) -> Self {
        let t = max_steps as usize;
        let mut batch = Self {
            num_episodes,
            max_steps: t,
            obs_dim,
            observations: vec![0.0; num_episodes * t * obs_dim],
            actions: vec![0; num_episodes * t],
            log_probs: vec![0.0; num_episodes * t],
            values: vec![0.0; num_episodes * t],
            rewards: vec![0.0; num_episodes * t],
            dones: vec![0; num_episodes * t],
            lengths: vec![0; num_episodes],
        };

        for (ep, r) in results.iter().enumerate() {
            let len = r.length as usize;
            batch.lengths[ep] = r.length;
            batch.observations[ep * t * obs_dim..][..len * obs_dim]
                .copy_from_slice(&r.observations);
            batch.actions[ep * t..][..len].copy_from_slice(&r.actions);
            batch.log_probs[ep * t..][..len].copy_from_slice(&r.log_probs);
            batch.values[ep * t..][..len].copy_from_slice(&r.values);
            batch.rewards[ep * t..][..len].copy_from_slice(&r.rewards);
            batch.dones[ep * t..][..len].copy_from_slice(&r.dones);
        }

        batch
    }

    pub fn num_episodes(&self) -> usize {
        self.num_episodes
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    /// Valid step count of episode row `ep`.
    pub fn episode_len(&self, ep: usize) -> usize {
        self.lengths[ep] as usize
    }

    /// Flattened observation at `[ep, t]`.
    pub fn observation(&self, ep: usize, t: usize) -> &[f32] {
        let start = (ep * self.max_steps + t) * self.obs_dim;
        &self.observations[start..start + self.obs_dim]
    }

    pub fn actions_row(&self, ep: usize) -> &[i32] {
        &self.actions[ep * self.max_steps..(ep + 1) * self.max_steps]
    }

    pub fn rewards_row(&self, ep: usize) -> &[f32] {
        &self.rewards[ep * self.max_steps..(ep + 1) * self.max_steps]
    }

    pub fn dones_row(&self, ep: usize) -> &[u8] {
        &self.dones[ep * self.max_steps..(ep + 1) * self.max_steps]
    }
}
