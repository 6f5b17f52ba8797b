//! Damage: the mitigation pipeline every hit goes through, and the death hooks
//! that run once per death at the end of the tick.

use bevy::prelude::*;

pub mod deaths;
pub mod pipeline;

pub use deaths::KillTally;
pub use pipeline::{
    strike, ActorDied, CombatLog, CombatOutput, DamageCategory, DamageOutcome, DamageSource, Hit,
    StrikeOutcome,
};

use crate::common::state::GameState;
use crate::plugins::core::SimSet;

pub fn plugin(app: &mut App) {
    app.add_message::<ActorDied>()
        .init_resource::<KillTally>()
        .add_systems(OnEnter(GameState::InGame), deaths::reset_tally)
        .add_systems(
            FixedUpdate,
            (
                deaths::credit_kills,
                deaths::drop_loot,
                deaths::split_on_death,
                deaths::explode_on_death,
                deaths::reward_bosses,
                deaths::end_run_on_player_death,
            )
                .in_set(SimSet::Deaths),
        );
}
