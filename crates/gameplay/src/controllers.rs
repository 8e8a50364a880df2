//! Controller drivers: the poses the paddles follow.
//!
//! Each paddle is mounted directly on its controller entity. A driver (from
//! `controllers.near` / `controllers.far`) produces a target position every frame; the result is
//! clamped to the player's half of the room and written to the controller `Transform`.
//! `update_paddle_motion` then derives the paddle velocity used by the hit model.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_rapier3d::prelude::Velocity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tt_config::{ControllerDriver, GameConfig};
use tt_core::{
    Ball, BallMotion, GameConfigRes, Paddle, PaddleMotion, Rally, RallyPhase, RngSeed, Side,
};

use crate::arena::paddle_rotation;

/// Deterministic RNG for bot aim jitter.
#[derive(Resource)]
pub struct BotRng(pub StdRng);

/// Per-controller bot memory (harmless on non-bot controllers).
#[derive(Component, Debug, Clone, Default)]
pub struct BotState {
    /// Seconds spent waiting with the ball frozen on our serve.
    pub serve_wait: f32,
    /// Aim offset (x, y) re-rolled after every hit in the rally.
    pub aim: Vec2,
    seen_hits: u32,
}

/// What the drivers need to know about the ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallView {
    pub position: Vec3,
    pub velocity: Vec3,
    pub frozen: bool,
}

pub fn driver_for(cfg: &GameConfig, side: Side) -> ControllerDriver {
    match side {
        Side::Near => cfg.controllers.near,
        Side::Far => cfg.controllers.far,
    }
}

/// Keep a paddle inside the room and on its own side of the net.
pub fn clamp_to_room(p: Vec3, side: Side, cfg: &GameConfig) -> Vec3 {
    let r = cfg.paddle.blade_radius;
    let half_w = (cfg.room.width * 0.5 - r).max(0.0);
    let net_gap = cfg.net.thickness * 0.5 + cfg.paddle.blade_thickness;
    let half_d = (cfg.room.depth * 0.5 - r).max(net_gap);
    let top = (cfg.room.height - r).max(r);
    // Distance from the net measured into our own half.
    let depth = (p.z * side.sign()).clamp(net_gap, half_d);
    Vec3::new(p.x.clamp(-half_w, half_w), p.y.clamp(r, top), depth * side.sign())
}

/// Offset that pushes a paddle `amount` toward the net.
pub fn lunge_offset(side: Side, amount: f32) -> Vec3 {
    Vec3::Z * (-side.sign() * amount)
}

/// Move from `current` toward `target` by at most `max_step`.
pub fn step_toward(current: Vec3, target: Vec3, max_step: f32) -> Vec3 {
    let delta = target - current;
    let len = delta.length();
    if len <= max_step || len <= f32::EPSILON {
        target
    } else {
        current + delta * (max_step / len)
    }
}

/// Cursor ray projected onto the paddle's home plane (z = home.z).
pub fn mouse_target(ray: Option<Ray3d>, home: Vec3, side: Side, lunge: bool, cfg: &GameConfig) -> Vec3 {
    let hit = ray.and_then(|ray| {
        let plane = InfinitePlane3d { normal: Dir3::Z };
        let dist = ray.intersect_plane(home, plane)?;
        Some(ray.get_point(dist))
    });
    let base = hit.unwrap_or(home);
    let mut target = Vec3::new(base.x, base.y, home.z);
    if lunge {
        target += lunge_offset(side, cfg.controllers.lunge_distance);
    }
    target
}

/// Near side: arrows + Space. Far side: WASD + left Shift. Left/right are from the player's view.
pub fn keyboard_target(
    keys: &ButtonInput<KeyCode>,
    side: Side,
    current: Vec3,
    home: Vec3,
    dt: f32,
    cfg: &GameConfig,
) -> Vec3 {
    let (left, right, up, down, lunge) = match side {
        Side::Near => (
            KeyCode::ArrowLeft,
            KeyCode::ArrowRight,
            KeyCode::ArrowUp,
            KeyCode::ArrowDown,
            KeyCode::Space,
        ),
        Side::Far => (KeyCode::KeyA, KeyCode::KeyD, KeyCode::KeyW, KeyCode::KeyS, KeyCode::ShiftLeft),
    };
    let axis = |neg: KeyCode, pos: KeyCode| {
        (keys.pressed(pos) as i32 - keys.pressed(neg) as i32) as f32
    };
    // A player looking toward +Z (near side) has screen-right along -X.
    let dx = axis(left, right) * side.sign();
    let dy = axis(down, up);
    let step = cfg.controllers.move_speed * dt;
    let mut target = Vec3::new(current.x + dx * step, current.y + dy * step, home.z);
    if keys.pressed(lunge) {
        target += lunge_offset(side, cfg.controllers.lunge_distance);
    }
    target
}

/// Where a bot-driven paddle wants to be this frame (before the speed cap).
pub fn bot_target(
    side: Side,
    home: Vec3,
    ball: Option<BallView>,
    rally: &Rally,
    state: &mut BotState,
    dt: f32,
    cfg: &GameConfig,
) -> Vec3 {
    let cc = &cfg.controllers;
    let Some(ball) = ball else {
        state.serve_wait = 0.0;
        return home;
    };
    match rally.phase {
        RallyPhase::AwaitingServe if rally.server == side && ball.frozen => {
            state.serve_wait += dt;
            if state.serve_wait >= cc.bot_serve_delay {
                // Swing through the ball toward the net.
                ball.position + lunge_offset(side, cfg.ball.radius * 2.0)
            } else {
                Vec3::new(ball.position.x, ball.position.y, home.z)
            }
        }
        RallyPhase::InPlay => {
            state.serve_wait = 0.0;
            let floor_y = cfg.table.top_height + cfg.paddle.blade_radius * 0.5;
            let mut target = Vec3::new(
                ball.position.x + state.aim.x,
                ball.position.y.max(floor_y) + state.aim.y,
                home.z,
            );
            let approaching = ball.velocity.z * side.sign() > 0.0;
            if approaching && (ball.position.z - home.z).abs() <= cc.bot_reach {
                target.z = ball.position.z;
            }
            target
        }
        _ => {
            state.serve_wait = 0.0;
            home
        }
    }
}

pub(crate) fn init_bot_rng(
    mut commands: Commands,
    cfg: Option<Res<GameConfigRes>>,
    seed: Option<Res<RngSeed>>,
    existing: Option<Res<BotRng>>,
) {
    if existing.is_some() {
        return;
    }
    let seed = seed
        .map(|s| s.0)
        .or_else(|| cfg.map(|c| c.0.seed))
        .unwrap_or_default();
    commands.insert_resource(BotRng(StdRng::seed_from_u64(seed ^ 0xB07_5EED)));
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn drive_controllers(
    time: Res<Time>,
    cfg: Option<Res<GameConfigRes>>,
    rally: Res<Rally>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut rng: Option<ResMut<BotRng>>,
    balls: Query<(&Transform, Option<&Velocity>, &BallMotion), (With<Ball>, Without<Paddle>)>,
    mut paddles: Query<(&Paddle, &mut Transform, &mut BotState), Without<Ball>>,
) {
    let Some(cfg) = cfg else { return; };
    let gc = &cfg.0;
    let dt = time.delta_secs();

    let ball = balls.iter().next().map(|(tf, vel, motion)| BallView {
        position: tf.translation,
        velocity: vel.map(|v| v.linvel).unwrap_or(Vec3::ZERO),
        frozen: *motion == BallMotion::Frozen,
    });
    let cursor_ray = windows
        .single()
        .ok()
        .and_then(|w| w.cursor_position())
        .and_then(|pos| {
            let (camera, cam_tf) = cameras.iter().find(|(c, _)| c.is_active)?;
            camera.viewport_to_world(cam_tf, pos).ok()
        });
    let lunge = buttons.is_some_and(|b| b.pressed(MouseButton::Left));

    for (paddle, mut tf, mut bot) in &mut paddles {
        let side = paddle.side;
        let home = cfg.paddle_home(side);
        let current = tf.translation;
        let target = match driver_for(gc, side) {
            ControllerDriver::Mouse => mouse_target(cursor_ray, home, side, lunge, gc),
            ControllerDriver::Keyboard => match keys.as_deref() {
                Some(keys) => keyboard_target(keys, side, current, home, dt, gc),
                None => current,
            },
            ControllerDriver::Bot => {
                if bot.seen_hits != rally.hits {
                    bot.seen_hits = rally.hits;
                    let j = gc.controllers.bot_jitter.max(0.0);
                    if let (Some(rng), true) = (rng.as_mut(), j > 0.0) {
                        bot.aim = Vec2::new(rng.0.gen_range(-j..=j), rng.0.gen_range(-j..=j));
                    }
                }
                let want = bot_target(side, home, ball, &rally, &mut *bot, dt, gc);
                step_toward(current, want, gc.controllers.bot_speed * dt)
            }
            ControllerDriver::Idle => home,
        };
        tf.translation = clamp_to_room(target, side, gc);
        tf.rotation = paddle_rotation(side, gc.paddle.tilt_deg);
    }
}

/// Finite-difference paddle velocity and hit cooldown countdown.
pub(crate) fn update_paddle_motion(
    time: Res<Time>,
    mut q: Query<(&Transform, &mut PaddleMotion), With<Paddle>>,
) {
    let dt = time.delta_secs();
    for (tf, mut motion) in &mut q {
        let pos = tf.translation;
        motion.velocity = match motion.last_position {
            Some(prev) if dt > 0.0 => (pos - prev) / dt,
            _ => Vec3::ZERO,
        };
        motion.previous_position = motion.last_position;
        motion.last_position = Some(pos);
        motion.cooldown = (motion.cooldown - dt).max(0.0);
    }
}
