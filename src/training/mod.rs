//! Training infrastructure: self-play episodes, evaluation against a random
//! opponent, metrics collection, and the trainer loop.

pub mod episode;
pub mod metrics;
pub mod trainer;
