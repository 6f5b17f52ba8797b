//! Player plugin.
//!
//! Pipeline:
//! - Update: sample input, write PlayerInput resource
//! - FixedUpdate: apply velocity, pick up orbs and rewards, spawn summoned spirits
//!
//! The player is an ordinary allied [`Combatant`] with an [`Arsenal`]. Stun,
//! freeze and traps stop it the same way they stop anything else.

use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::allied_layers;
use crate::common::rng::SimRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::actors::{Combatant, ContactAttack, Ephemeral};
use crate::plugins::core::SimSet;
use crate::plugins::weapons::{Arsenal, OwnerStats, SpawnSpiritRequest, WeaponKind};

const STARTING_WEAPON: WeaponKind = WeaponKind::MagicWand;
/// Health of a summoned spirit.
const SPIRIT_HEALTH: f32 = 30.0;
const SPIRIT_CONTACT_INTERVAL: f32 = 0.5;

#[derive(Component)]
pub struct Player;

/// Explicit aim direction, if any. Written by the camera's cursor system.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Aim(pub Option<Vec2>);

#[derive(Resource, Default, Debug)]
pub struct PlayerInput {
    pub move_axis: Vec2,
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Experience {
    pub level: u32,
    pub current: u32,
    pub next: u32,
}

impl Default for Experience {
    fn default() -> Self {
        Self {
            level: 1,
            current: 0,
            next: Self::threshold(1),
        }
    }
}

impl Experience {
    /// Experience needed to leave `level`.
    pub fn threshold(level: u32) -> u32 {
        5 + (level.saturating_sub(1)) * 5
    }

    /// Add experience; returns how many levels were gained.
    pub fn gain(&mut self, amount: u32) -> u32 {
        self.current += amount;
        let mut gained = 0;
        while self.current >= self.next {
            self.current -= self.next;
            self.level += 1;
            self.next = Self::threshold(self.level);
            gained += 1;
        }
        gained
    }
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExperienceOrb {
    pub value: u32,
}

/// Chest left by a defeated boss.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BossReward;

/// Summoned ally; `owner` is the player that called it.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spirit {
    pub owner: Entity,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerLeveledUp {
    pub level: u32,
    /// What the level granted, if anything was left to grant.
    pub granted: Option<WeaponKind>,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .add_message::<PlayerLeveledUp>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, gather_input.run_if(in_state(GameState::InGame)))
        .add_systems(
            FixedUpdate,
            (
                apply_movement.in_set(SimSet::Locomotion),
                (collect_orbs, collect_rewards).in_set(SimSet::Firing),
                spawn_spirits.in_set(SimSet::Allocation),
            ),
        );
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    let arsenal = Arsenal::with([STARTING_WEAPON]).unwrap_or_default();

    commands.spawn((
        Name::new("Player"),
        Player,
        Combatant::player(tunables.player_health, tunables.player_speed),
        arsenal,
        OwnerStats::default(),
        Aim::default(),
        Experience::default(),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(26.0)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 1.0),
        RigidBody::Kinematic,
        Collider::circle(13.0),
        allied_layers(false),
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::InGame),
    ));
}

fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    let Some(keys) = keys else {
        return;
    };
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
}

fn apply_movement(
    input: Res<PlayerInput>,
    mut q_player: Query<(&mut Combatant, &mut LinearVelocity), With<Player>>,
) {
    let Ok((mut actor, mut vel)) = q_player.single_mut() else {
        return;
    };
    if !actor.can_move() {
        vel.0 = Vec2::ZERO;
        return;
    }
    vel.0 = input.move_axis * actor.stats.speed;
    if input.move_axis != Vec2::ZERO {
        actor.movement.last_direction = input.move_axis;
    }
}

pub fn spawn_orb(commands: &mut Commands, position: Vec2, value: u32) -> Entity {
    commands
        .spawn((
            Name::new("ExperienceOrb"),
            ExperienceOrb { value },
            Sprite {
                color: Color::srgb(0.4, 0.9, 1.0),
                custom_size: Some(Vec2::splat(8.0)),
                ..default()
            },
            Transform::from_translation(position.extend(0.5)),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

pub fn spawn_boss_reward(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            Name::new("BossReward"),
            BossReward,
            Sprite {
                color: Color::srgb(1.0, 0.8, 0.2),
                custom_size: Some(Vec2::splat(20.0)),
                ..default()
            },
            Transform::from_translation(position.extend(0.5)),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

/// Pick one upgrade at random and apply it.
fn grant_random(arsenal: &mut Arsenal, rng: &mut SimRng) -> Option<WeaponKind> {
    let options = arsenal.upgrade_options();
    let kind = *options.get(rng.index(options.len()))?;
    arsenal.grant(kind).ok().map(|_| kind)
}

fn collect_orbs(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut rng: ResMut<SimRng>,
    mut q_player: Query<(&Combatant, &Transform, &mut Experience, &mut Arsenal), With<Player>>,
    orbs: Query<(Entity, &ExperienceOrb, &Transform)>,
    mut leveled: MessageWriter<PlayerLeveledUp>,
) {
    let Ok((actor, tf, mut xp, mut arsenal)) = q_player.single_mut() else {
        return;
    };
    if !actor.is_targetable() {
        return;
    }
    let pos = tf.translation.truncate();
    let reach_sq = tunables.pickup_radius * tunables.pickup_radius;

    for (orb, value, orb_tf) in &orbs {
        if pos.distance_squared(orb_tf.translation.truncate()) > reach_sq {
            continue;
        }
        commands.entity(orb).despawn();
        for _ in 0..xp.gain(value.value) {
            let granted = grant_random(&mut arsenal, &mut rng);
            info!("level {} reached; granted {granted:?}", xp.level);
            leveled.write(PlayerLeveledUp {
                level: xp.level,
                granted,
            });
        }
    }
}

/// A boss chest levels every owned weapon once.
fn collect_rewards(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut q_player: Query<(&Combatant, &Transform, &mut Arsenal), With<Player>>,
    rewards: Query<(Entity, &Transform), With<BossReward>>,
) {
    let Ok((actor, tf, mut arsenal)) = q_player.single_mut() else {
        return;
    };
    if !actor.is_targetable() {
        return;
    }
    let pos = tf.translation.truncate();
    let reach_sq = tunables.pickup_radius * tunables.pickup_radius;

    for (reward, reward_tf) in &rewards {
        if pos.distance_squared(reward_tf.translation.truncate()) > reach_sq {
            continue;
        }
        commands.entity(reward).despawn();
        let upgraded = arsenal
            .weapons_mut()
            .iter_mut()
            .filter_map(|w| w.level_up().ok())
            .count();
        info!("boss reward opened; {upgraded} weapon(s) upgraded");
    }
}

fn spawn_spirits(mut commands: Commands, mut requests: MessageReader<SpawnSpiritRequest>) {
    for req in requests.read() {
        commands.spawn((
            Name::new("Spirit"),
            Spirit { owner: req.owner },
            Combatant::spirit(SPIRIT_HEALTH, req.speed, req.damage),
            ContactAttack::new(req.damage, SPIRIT_CONTACT_INTERVAL),
            Ephemeral {
                remaining: req.lifetime,
            },
            Sprite {
                color: Color::srgba(0.7, 0.85, 1.0, 0.8),
                custom_size: Some(Vec2::splat(18.0)),
                ..default()
            },
            Transform::from_translation(req.position.extend(1.0)),
            RigidBody::Kinematic,
            Collider::circle(9.0),
            allied_layers(true),
            LinearVelocity::ZERO,
            DespawnOnExit(GameState::InGame),
        ));
    }
}
