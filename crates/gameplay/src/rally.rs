//! Rally systems: feed classified contacts and hits into the `Rally` state machine, award points,
//! and re-serve after the pause.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;
use tt_core::{
    Ball, BallContact, BallMotion, Bounce, Fixture, GameConfigRes, PaddleHit, PointReason,
    PointScored, Rally, RallyPhase, RallyRules, Score, Side,
};

/// Below this speed a live ball counts as stalled.
pub const STALL_SPEED: f32 = 0.2;
/// Seconds a stalled ball may sit before the rally is called dead.
pub const STALL_SECONDS: f32 = 1.5;

/// How the rules see a fixture contact. Decorations never touch the ball.
pub fn bounce_of(contact: &BallContact) -> Option<Bounce> {
    match contact.fixture {
        Fixture::Table => Some(Bounce::Table(Side::of_z(contact.position.z))),
        Fixture::Net => Some(Bounce::Net),
        f if f.is_out_of_play() => Some(Bounce::Out),
        _ => None,
    }
}

pub(crate) fn detect_dead_ball(
    time: Res<Time>,
    rally: Res<Rally>,
    balls: Query<(&Transform, &Velocity, &BallMotion), With<Ball>>,
    mut stalled_for: Local<f32>,
    mut out: EventWriter<BallContact>,
) {
    let Some((tf, vel, motion)) = balls.iter().next() else { return; };
    if !rally.in_play() || *motion != BallMotion::Live || vel.linvel.length() >= STALL_SPEED {
        *stalled_for = 0.0;
        return;
    }
    *stalled_for += time.delta_secs();
    if *stalled_for >= STALL_SECONDS {
        *stalled_for = 0.0;
        debug!("ball stalled at {:?}", tf.translation);
        out.write(BallContact {
            fixture: Fixture::Floor,
            position: tf.translation,
        });
    }
}

// Contacts come from the previous physics step, so they are applied before this frame's hits.
pub(crate) fn apply_rally_events(
    cfg: Option<Res<GameConfigRes>>,
    mut rally: ResMut<Rally>,
    mut score: ResMut<Score>,
    mut contacts: EventReader<BallContact>,
    mut hits: EventReader<PaddleHit>,
    mut scored: EventWriter<PointScored>,
) {
    let rules = cfg.map(|c| c.rules()).unwrap_or_default();
    let outcome = contacts
        .read()
        .filter_map(bounce_of)
        .find_map(|b| rally.on_bounce(b))
        .or_else(|| hits.read().find_map(|h| rally.on_hit(h.side, &rules)));
    // Whatever is left belongs to a rally that just ended.
    contacts.clear();
    hits.clear();

    let Some((winner, reason)) = outcome else { return; };
    award(&mut rally, &mut score, winner, reason, &rules);
    scored.write(PointScored { winner, reason });
}

fn award(
    rally: &mut Rally,
    score: &mut Score,
    winner: Side,
    reason: PointReason,
    rules: &RallyRules,
) {
    rally.award_point(score, winner, rules);
    info!(
        winner = winner.label(),
        reason = reason.label(),
        score = %score.display(),
        "point"
    );
    if let RallyPhase::GameOver { winner } = rally.phase {
        info!(winner = winner.label(), score = %score.display(), "match over");
    }
}

pub(crate) fn advance_point_pause(
    time: Res<Time>,
    cfg: Option<Res<GameConfigRes>>,
    mut rally: ResMut<Rally>,
    mut balls: Query<(&mut BallMotion, &mut Transform, &mut Velocity), With<Ball>>,
) {
    if !rally.tick(time.delta_secs()) {
        return;
    }
    let Some(cfg) = cfg else { return; };
    let at = cfg.serve_position(rally.server);
    for (mut motion, mut tf, mut vel) in &mut balls {
        tt_physics::freeze_ball_at(&mut motion, &mut tf, &mut vel, at);
    }
    debug!(server = rally.server.label(), "ball reset for serve");
}
