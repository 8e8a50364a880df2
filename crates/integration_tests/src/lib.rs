// Integration tests: compose every plugin headless (no window, no render assets) with real Rapier
// stepping, and drive whole rallies frame by frame.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde::Serialize;
use tt_config::GameConfig;
use tt_core::{CorePlugin, GameConfigRes, Rally, RallyPhase, RngSeed, Score};
use tt_gameplay::GameplayPlugin;
use tt_physics::PhysicsPlugin;
use tt_rendering::RenderingPlugin;

/// Frame time used by headless runs; matches the default physics step.
pub const FRAME: Duration = Duration::from_nanos(16_666_667);

pub fn build_headless_app(cfg: GameConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    // TransformPlugin -> GlobalTransform propagation for Rapier
    // AssetPlugin / InputPlugin -> resources the rendering and controller systems look for
    app.add_plugins((
        TransformPlugin,
        bevy::asset::AssetPlugin::default(),
        bevy::input::InputPlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.insert_resource(RngSeed(cfg.seed));
    app.insert_resource(GameConfigRes(cfg));
    app.add_plugins((CorePlugin, PhysicsPlugin, RenderingPlugin, GameplayPlugin));
    app
}

/// Serializable view of match state for snapshot assertions.
#[derive(Debug, Serialize, PartialEq)]
pub struct MatchSnapshot {
    pub near: u32,
    pub far: u32,
    pub server: &'static str,
    pub phase: &'static str,
}

pub fn snapshot(world: &World) -> MatchSnapshot {
    let score = world.resource::<Score>();
    let rally = world.resource::<Rally>();
    MatchSnapshot {
        near: score.near,
        far: score.far,
        server: rally.server.label(),
        phase: match rally.phase {
            RallyPhase::AwaitingServe => "AwaitingServe",
            RallyPhase::InPlay => "InPlay",
            RallyPhase::PointOver { .. } => "PointOver",
            RallyPhase::GameOver { .. } => "GameOver",
        },
    }
}
