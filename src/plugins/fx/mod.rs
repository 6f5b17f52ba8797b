//! Fire-and-forget visual cues.
//!
//! The combat engine writes [`VisualCue`] messages and never reads them back.
//! Render-side plugins (lighting, particles) are free to ignore any of them;
//! headless builds simply let the buffers roll over.

use bevy::prelude::*;

pub fn plugin(app: &mut App) {
    app.add_message::<VisualCue>();
}

/// Colour family of a cue; the renderer maps it to a palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CueTint {
    Neutral,
    Fire,
    Frost,
    Poison,
    Lightning,
    Holy,
    Boss,
}

/// One area a telegraph warns about.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CueArea {
    Circle { center: Vec2, radius: f32 },
    Ray { origin: Vec2, dir: Vec2, length: f32 },
}

#[derive(Message, Clone, Debug, PartialEq)]
pub enum VisualCue {
    /// Floating number over a damaged actor.
    DamageNumber { position: Vec2, text: String },
    /// Warning outline shown while a boss telegraphs.
    Telegraph {
        boss: Entity,
        areas: Vec<CueArea>,
        duration: f32,
    },
    /// Short flash at a point (impacts, bursts, pulses).
    Impact {
        position: Vec2,
        radius: f32,
        tint: CueTint,
    },
    /// Arc between two points (chain hops).
    Link { from: Vec2, to: Vec2, tint: CueTint },
}

impl VisualCue {
    pub fn impact(position: Vec2, radius: f32, tint: CueTint) -> Self {
        Self::Impact {
            position,
            radius,
            tint,
        }
    }
}
