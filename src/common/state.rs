//! Run state.

use bevy::prelude::*;

/// A run starts in `InGame`; the fixed-tick sets only run there.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
    /// Entered once the player dies; everything scoped to `InGame` is despawned.
    GameOver,
}
