// src/collect/mod.rs
#![forbid(unsafe_code)]

mod batch;
mod collector;
mod messages;
mod worker;

pub use batch::EpisodeBatch;
pub use collector::{Collector, CollectorConfig};
