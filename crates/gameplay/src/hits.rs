//! Paddle/ball hit model.
//!
//! Paddles carry no colliders: a hit is a geometric test of the ball against the blade box in
//! paddle-local space (local +Z is the blade normal), followed by an explicit velocity response.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;
use tt_config::{GameConfig, PaddleConfig};
use tt_core::{
    Ball, BallMotion, BallRadius, GameConfigRes, Paddle, PaddleHit, PaddleMotion, Rally, Side,
};

/// Distance from `ball_center` to the blade box (half extents `(r, r, thickness / 2)`).
/// Zero when the center is inside the box.
pub fn blade_distance(ball_center: Vec3, paddle: &Transform, cfg: &PaddleConfig) -> f32 {
    let local = paddle.rotation.inverse() * (ball_center - paddle.translation);
    let half = Vec3::new(cfg.blade_radius, cfg.blade_radius, cfg.blade_thickness * 0.5);
    (local.abs() - half).max(Vec3::ZERO).length()
}

/// Box distance within reach, and the point projected on the blade plane lies on the disc.
pub fn touches_blade(
    ball_center: Vec3,
    paddle: &Transform,
    cfg: &PaddleConfig,
    ball_radius: f32,
    margin: f32,
) -> bool {
    if blade_distance(ball_center, paddle, cfg) > ball_radius + margin {
        return false;
    }
    let local = paddle.rotation.inverse() * (ball_center - paddle.translation);
    local.truncate().length() <= cfg.blade_radius + ball_radius
}

/// Sweep the blade from `from` to its current pose and return the first pose that touches the
/// ball. A lunge can move the paddle further than its reach in one frame.
pub fn swept_touch(
    ball_center: Vec3,
    from: Vec3,
    paddle: &Transform,
    cfg: &PaddleConfig,
    ball_radius: f32,
    margin: f32,
) -> Option<Vec3> {
    let to = paddle.translation;
    let step = (ball_radius + margin).max(cfg.blade_thickness).max(1e-3);
    let samples = ((to - from).length() / step).ceil().clamp(1.0, 64.0) as usize;
    (0..=samples)
        .map(|i| from.lerp(to, i as f32 / samples as f32))
        .find(|&at| {
            let pose = Transform::from_translation(at).with_rotation(paddle.rotation);
            touches_blade(ball_center, &pose, cfg, ball_radius, margin)
        })
}

/// Outgoing ball velocity after a hit by `side`'s paddle.
pub fn hit_response(
    ball_v: Vec3,
    paddle_v: Vec3,
    normal: Vec3,
    side: Side,
    cfg: &GameConfig,
) -> Vec3 {
    let h = &cfg.hit;
    let toward = -side.sign();
    let n = normal.try_normalize().unwrap_or(Vec3::Z * toward);

    let rel = ball_v - paddle_v;
    let vn = rel.dot(n);
    let reflected = if vn < 0.0 {
        rel - (1.0 + h.restitution) * vn * n
    } else {
        rel
    };
    let mut out = reflected + paddle_v * h.paddle_velocity_transfer;

    if out.z * toward < h.min_return_speed {
        out.z = toward * h.min_return_speed;
    }
    if out.y < h.min_lift {
        out.y = h.min_lift;
    }
    let max = cfg.ball.max_speed;
    if max > 0.0 && out.length() > max {
        out = out.normalize() * max;
    }
    out
}

pub(crate) fn detect_paddle_hits(
    cfg: Option<Res<GameConfigRes>>,
    rally: Res<Rally>,
    mut balls: Query<
        (&Transform, &BallRadius, &mut BallMotion, &mut Velocity),
        (With<Ball>, Without<Paddle>),
    >,
    mut paddles: Query<(&Paddle, &Transform, &mut PaddleMotion), Without<Ball>>,
    mut hits: EventWriter<PaddleHit>,
) {
    let Some(cfg) = cfg else { return; };
    let gc = &cfg.0;
    for (ball_tf, radius, mut motion, mut vel) in &mut balls {
        for (paddle, paddle_tf, mut pm) in &mut paddles {
            if pm.cooldown > 0.0 || !rally.can_hit(paddle.side) {
                continue;
            }
            let from = pm.previous_position.unwrap_or(paddle_tf.translation);
            let touched = swept_touch(
                ball_tf.translation,
                from,
                paddle_tf,
                &gc.paddle,
                radius.0,
                gc.hit.margin,
            );
            if touched.is_none() {
                continue;
            }
            let incoming = match *motion {
                BallMotion::Frozen => Vec3::ZERO,
                BallMotion::Live => vel.linvel,
            };
            let normal = paddle_tf.rotation * Vec3::Z;
            let out = hit_response(incoming, pm.velocity, normal, paddle.side, gc);
            tt_physics::wake_ball(&mut motion, &mut vel, out);
            pm.cooldown = gc.hit.cooldown;
            let speed = out.length();
            debug!(side = paddle.side.label(), speed, "paddle hit");
            hits.write(PaddleHit {
                side: paddle.side,
                speed,
            });
            // One paddle per ball per frame.
            break;
        }
    }
}
