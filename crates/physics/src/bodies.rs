//! Rigid-body recipes for the arena and the ball's frozen/live transitions.
//!
//! The ball is kinematic while frozen (it hangs at the serve spot and ignores gravity) and dynamic
//! once a paddle has touched it. `BallMotion` is the source of truth; `apply_ball_motion` keeps the
//! Rapier body type in agreement with it.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use tt_config::GameConfig;
use tt_core::{Ball, BallMotion, GameConfigRes};

/// Static slab collider; `size` is the full extent.
pub fn fixed_box(size: Vec3, restitution: f32, friction: f32) -> impl Bundle {
    (
        RigidBody::Fixed,
        Collider::cuboid(size.x * 0.5, size.y * 0.5, size.z * 0.5),
        Restitution::coefficient(restitution),
        Friction::coefficient(friction),
    )
}

/// Physics components for a freshly spawned (frozen) ball.
pub fn ball_body(cfg: &GameConfig) -> impl Bundle {
    let b = &cfg.ball;
    (
        body_for(BallMotion::Frozen),
        Collider::ball(b.radius),
        Velocity::zero(),
        Restitution::coefficient(b.restitution),
        Friction::coefficient(b.friction),
        Damping {
            linear_damping: b.linear_damping,
            angular_damping: 0.2,
        },
        Ccd::enabled(),
        ActiveEvents::COLLISION_EVENTS,
        Sleeping::disabled(),
    )
}

pub fn body_for(motion: BallMotion) -> RigidBody {
    match motion {
        BallMotion::Frozen => RigidBody::KinematicPositionBased,
        BallMotion::Live => RigidBody::Dynamic,
    }
}

/// Release a ball into the simulation with the given launch velocity.
pub fn wake_ball(motion: &mut BallMotion, velocity: &mut Velocity, launch: Vec3) {
    *motion = BallMotion::Live;
    velocity.linvel = launch;
    velocity.angvel = Vec3::ZERO;
}

/// Pin a ball at `at` with no motion until the next touch.
pub fn freeze_ball_at(
    motion: &mut BallMotion,
    transform: &mut Transform,
    velocity: &mut Velocity,
    at: Vec3,
) {
    *motion = BallMotion::Frozen;
    transform.translation = at;
    transform.rotation = Quat::IDENTITY;
    *velocity = Velocity::zero();
}

pub(crate) fn apply_ball_motion(
    mut q: Query<(&BallMotion, &mut RigidBody), (With<Ball>, Changed<BallMotion>)>,
) {
    for (motion, mut body) in &mut q {
        let wanted = body_for(*motion);
        if *body != wanted {
            debug!(?motion, "ball body type -> {:?}", wanted);
            *body = wanted;
        }
    }
}

pub(crate) fn clamp_ball_speed(
    cfg: Option<Res<GameConfigRes>>,
    mut q: Query<(&BallMotion, &mut Velocity), With<Ball>>,
) {
    let Some(cfg) = cfg else { return; };
    let max = cfg.0.ball.max_speed;
    if max <= 0.0 {
        return;
    }
    for (motion, mut vel) in &mut q {
        if *motion != BallMotion::Live {
            continue;
        }
        let speed = vel.linvel.length();
        if speed > max {
            vel.linvel *= max / speed;
        }
    }
}
