//! Setup data and helpers shared by every plugin.

pub mod error;
pub mod layers;
pub mod rng;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
