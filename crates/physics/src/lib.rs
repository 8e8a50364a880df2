//! tt_physics: Rapier3D integration for the arena.
//!
//! * Installs Rapier with a fixed step (one step per frame, matching the configured timestep).
//! * Keeps gravity / timestep in sync with `GameConfigRes` (hot reload friendly).
//! * Classifies ball contacts into `BallContact` events (`ContactSet`).
//! * Maps `BallMotion` onto body types and caps live ball speed after gameplay adjustments.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use tt_core::{ContactSet, GameConfigRes, PostPhysicsAdjustSet};

pub mod bodies;
pub mod contacts;

pub use bodies::{ball_body, body_for, fixed_box, freeze_ball_at, wake_ball};
pub use contacts::{classify_pair, outside_room};

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        let physics = app
            .world()
            .get_resource::<GameConfigRes>()
            .map(|c| c.0.physics.clone())
            .unwrap_or_default();

        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
            .insert_resource(TimestepMode::Fixed {
                dt: physics.timestep,
                substeps: physics.substeps.max(1),
            })
            .add_systems(Update, (sync_gravity, sync_timestep))
            .add_systems(
                Update,
                (contacts::classify_contacts, contacts::detect_out_of_bounds).in_set(ContactSet),
            )
            .add_systems(
                Update,
                (bodies::apply_ball_motion, bodies::clamp_ball_speed)
                    .chain()
                    .after(PostPhysicsAdjustSet),
            );
    }
}

fn sync_gravity(cfg: Option<Res<GameConfigRes>>, mut rapier: Query<&mut RapierConfiguration>) {
    let Some(cfg) = cfg else { return; };
    let g = Vec3::new(0.0, cfg.0.physics.gravity_y, 0.0);
    for mut rc in &mut rapier {
        if rc.gravity != g {
            rc.gravity = g;
        }
    }
}

fn sync_timestep(cfg: Option<Res<GameConfigRes>>, mode: Option<ResMut<TimestepMode>>) {
    let (Some(cfg), Some(mut mode)) = (cfg, mode) else { return; };
    if !cfg.is_changed() {
        return;
    }
    let p = &cfg.0.physics;
    *mode = TimestepMode::Fixed {
        dt: p.timestep,
        substeps: p.substeps.max(1),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_core::CorePlugin;

    fn physics_app(cfg: GameConfigRes) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(TransformPlugin)
            .add_plugins(CorePlugin)
            .insert_resource(cfg)
            .add_plugins(PhysicsPlugin);
        app
    }

    #[test]
    fn plugin_initializes() {
        let mut app = physics_app(GameConfigRes::default());
        app.update();
        assert!(app.world().get_resource::<TimestepMode>().is_some());
    }

    #[test]
    fn gravity_follows_config() {
        let mut cfg = GameConfigRes::default();
        cfg.0.physics.gravity_y = -5.0;
        let mut app = physics_app(cfg);
        app.update();
        app.update();
        let mut q = app.world_mut().query::<&RapierConfiguration>();
        let rc = q.single(app.world()).expect("default rapier context");
        assert_eq!(rc.gravity, Vec3::new(0.0, -5.0, 0.0));
    }

    #[test]
    fn timestep_follows_config() {
        let mut cfg = GameConfigRes::default();
        cfg.0.physics.timestep = 1.0 / 120.0;
        cfg.0.physics.substeps = 2;
        let mut app = physics_app(cfg);
        app.update();
        match *app.world().resource::<TimestepMode>() {
            TimestepMode::Fixed { dt, substeps } => {
                assert!((dt - 1.0 / 120.0).abs() < 1e-6);
                assert_eq!(substeps, 2);
            }
            ref other => panic!("unexpected timestep mode {other:?}"),
        }
    }
}
