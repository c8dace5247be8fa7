// src/policy/base.rs
#![forbid(unsafe_code)]

use std::error::Error;

/// Boxed cause a policy reports failures with.
pub type PolicyError = Box<dyn Error + Send + Sync>;

pub type PolicyResult = Result<Decision, PolicyError>;

/// What a policy returns per step.
#[derive(Clone, Copy, Debug)]
pub struct Decision {
    /// Action index in `[0, ACTION_DIM)`.
    pub action: usize,
    pub log_prob: f32,
    pub value: f32,
}

/// Policy chooses an action for a flattened observation.
///
/// Object-safe so it can be used as `Box<dyn Policy>`. `Send` because the
/// collector moves the installed policy into a mutex shared with the worker
/// threads; the mutex serializes `decide` calls, so implementations backed
/// by a single-threaded runtime are safe without further synchronization.
pub trait Policy: Send {
    fn decide(&mut self, observation: &[f32]) -> PolicyResult;
}

/// Adapter so plain closures can act as policies.
pub struct FnPolicy<F>(F);

impl<F> FnPolicy<F>
where
    F: FnMut(&[f32]) -> PolicyResult + Send,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Policy for FnPolicy<F>
where
    F: FnMut(&[f32]) -> PolicyResult + Send,
{
    fn decide(&mut self, observation: &[f32]) -> PolicyResult {
        (self.0)(observation)
    }
}
