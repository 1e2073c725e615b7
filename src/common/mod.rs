//! Common, shared types.

pub mod error;
pub mod groups;
pub mod rng;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
