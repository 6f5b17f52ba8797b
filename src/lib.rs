//! Horde combat: a fixed-tick, top-down arena simulation.
//!
//! Status effects, the damage pipeline, projectile and hazard lifecycles and
//! boss abilities live under `plugins`; `game` wires them into an `App`.

pub mod common;
pub mod game;
pub mod plugins;
