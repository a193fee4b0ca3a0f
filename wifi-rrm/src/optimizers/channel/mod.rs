//! Channel assignment algorithms.

mod random;

pub use random::RandomChannelInitializer;
