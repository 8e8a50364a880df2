// Gameplay: arena spawning, controller drivers, the paddle hit model, rally systems and session
// controls. Physics setup lives in tt_physics, visuals in tt_rendering.

use bevy::prelude::*;
use tt_core::{ControllerSet, PostPhysicsAdjustSet, PrePhysicsSet};

pub mod arena;
pub mod controllers;
pub mod hits;
pub mod rally;
pub mod session;

pub use arena::{arena_layout, paddle_rotation, spawn_arena, FixtureSpec};
pub use controllers::{BotRng, BotState};
pub use hits::{blade_distance, hit_response, swept_touch, touches_blade};
pub use session::AutoCloseTimer;

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (
                arena::spawn_arena,
                controllers::init_bot_rng,
                session::setup_autoclose,
            ),
        )
        .add_systems(
            Update,
            (
                session::reset_on_key,
                (controllers::drive_controllers, controllers::update_paddle_motion).chain(),
            )
                .in_set(ControllerSet),
        )
        .add_systems(Update, hits::detect_paddle_hits.in_set(PrePhysicsSet))
        .add_systems(
            Update,
            (
                rally::detect_dead_ball,
                rally::apply_rally_events,
                rally::advance_point_pause,
                session::apply_match_reset,
            )
                .chain()
                .in_set(PostPhysicsAdjustSet),
        )
        .add_systems(Update, session::check_autoclose);
    }
}
