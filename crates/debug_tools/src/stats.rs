use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;
use tt_core::{Ball, GameConfigRes, PaddleHit, PointScored, Rally, Score};

#[derive(Resource, Debug, Clone)]
pub struct DebugState {
    pub log_enabled: bool,
    /// Seconds between SIM lines; refreshed from `debug.log_interval`.
    pub log_interval: f32,
    pub time_accum: f32,
    pub frame_counter: u64,
}

impl Default for DebugState {
    fn default() -> Self {
        Self {
            log_enabled: true,
            log_interval: 1.0,
            time_accum: 0.0,
            frame_counter: 0,
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct DebugStats {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub ball_position: Vec3,
    pub ball_speed: f32,
    pub hits: u64,
    pub points: u64,
}

/// Exponential moving average seeded by the first sample.
fn smooth(prev: f32, sample: f32) -> f32 {
    if prev == 0.0 {
        sample
    } else {
        prev * 0.9 + sample * 0.1
    }
}

pub fn debug_stats_collect_system(
    time: Res<Time>,
    mut state: ResMut<DebugState>,
    mut stats: ResMut<DebugStats>,
    q_ball: Query<(&Transform, Option<&Velocity>), With<Ball>>,
    mut hits: EventReader<PaddleHit>,
    mut points: EventReader<PointScored>,
) {
    state.frame_counter += 1;
    let dt = time.delta_secs().max(1e-6);
    stats.fps = smooth(stats.fps, 1.0 / dt);
    stats.frame_time_ms = smooth(stats.frame_time_ms, dt * 1000.0);
    if let Some((tf, vel)) = q_ball.iter().next() {
        stats.ball_position = tf.translation;
        stats.ball_speed = vel.map(|v| v.linvel.length()).unwrap_or(0.0);
    }
    stats.hits += hits.read().count() as u64;
    stats.points += points.read().count() as u64;
}

pub fn debug_logging_system(
    time: Res<Time>,
    cfg: Option<Res<GameConfigRes>>,
    mut state: ResMut<DebugState>,
    stats: Res<DebugStats>,
    rally: Option<Res<Rally>>,
    score: Option<Res<Score>>,
) {
    if let Some(cfg) = cfg {
        state.log_interval = cfg.0.debug.log_interval;
    }
    if !state.log_enabled || state.log_interval <= 0.0 {
        return;
    }
    state.time_accum += time.delta_secs();
    if state.time_accum < state.log_interval {
        return;
    }
    state.time_accum = 0.0;
    let phase = rally.map(|r| r.status()).unwrap_or_default();
    let score = score.map(|s| s.display()).unwrap_or_default();
    let p = stats.ball_position;
    info!(
        "SIM frame={} t={:.3}s fps={:.1} ft_ms={:.1} ball=({:.2},{:.2},{:.2}) speed={:.2} hits={} phase=\"{}\" score={}",
        state.frame_counter,
        time.elapsed_secs(),
        stats.fps,
        stats.frame_time_ms,
        p.x,
        p.y,
        p.z,
        stats.ball_speed,
        stats.hits,
        phase,
        score
    );
}
