// Match session controls: R resets the match, and the optional auto-close timer
// (`window.autoClose` seconds, 0.0 = disabled) ends the app.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;
use tt_core::{
    Ball, BallMotion, GameConfigRes, MatchReset, PaddleMotion, Rally, Score,
};

use crate::controllers::BotState;

#[derive(Resource, Deref, DerefMut)]
pub struct AutoCloseTimer(pub Timer);

pub(crate) fn reset_on_key(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut reset: EventWriter<MatchReset>,
) {
    if keys.is_some_and(|k| k.just_pressed(KeyCode::KeyR)) {
        reset.write(MatchReset);
    }
}

pub(crate) fn apply_match_reset(
    mut events: EventReader<MatchReset>,
    cfg: Option<Res<GameConfigRes>>,
    mut score: ResMut<Score>,
    mut rally: ResMut<Rally>,
    mut balls: Query<(&mut BallMotion, &mut Transform, &mut Velocity), With<Ball>>,
    mut paddles: Query<(&mut PaddleMotion, &mut BotState)>,
) {
    if events.read().count() == 0 {
        return;
    }
    *score = Score::default();
    *rally = Rally::default();
    if let Some(cfg) = cfg {
        let at = cfg.serve_position(rally.server);
        for (mut motion, mut tf, mut vel) in &mut balls {
            tt_physics::freeze_ball_at(&mut motion, &mut tf, &mut vel, at);
        }
    }
    for (mut motion, mut bot) in &mut paddles {
        motion.cooldown = 0.0;
        *bot = BotState::default();
    }
    info!(server = rally.server.label(), "match reset");
}

pub(crate) fn setup_autoclose(mut commands: Commands, cfg: Option<Res<GameConfigRes>>) {
    let secs = cfg.map(|c| c.0.window.auto_close).unwrap_or(0.0);
    if secs > 0.0 {
        info!(seconds = secs, "AutoClose: will exit after {secs} seconds");
        commands.insert_resource(AutoCloseTimer(Timer::from_seconds(secs, TimerMode::Once)));
    }
}

pub(crate) fn check_autoclose(
    time: Res<Time>,
    timer: Option<ResMut<AutoCloseTimer>>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(mut t) = timer else { return; };
    t.tick(time.delta());
    if t.just_finished() {
        info!("AutoClose: timer finished, requesting app exit");
        exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use bevy::time::TimeUpdateStrategy;
    use tt_core::{CorePlugin, RallyPhase, Side};

    #[test]
    fn reset_restores_score_rally_and_ball() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(CorePlugin)
            .insert_resource(GameConfigRes::default())
            .add_systems(Update, apply_match_reset);
        app.insert_resource(Score { near: 10, far: 7 });
        app.insert_resource(Rally {
            phase: RallyPhase::GameOver { winner: Side::Near },
            server: Side::Far,
            ..Rally::default()
        });
        let ball = app
            .world_mut()
            .spawn((
                Ball,
                BallMotion::Live,
                Velocity::linear(Vec3::X),
                Transform::from_xyz(3.0, 0.2, 3.0),
            ))
            .id();
        app.world_mut().send_event(MatchReset);
        app.update();

        assert_eq!(*app.world().resource::<Score>(), Score::default());
        assert_eq!(*app.world().resource::<Rally>(), Rally::default());
        assert_eq!(*app.world().get::<BallMotion>(ball).unwrap(), BallMotion::Frozen);
        let expected = GameConfigRes::default().serve_position(Side::Near);
        assert_eq!(app.world().get::<Transform>(ball).unwrap().translation, expected);
    }

    #[test]
    fn r_key_emits_match_reset() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(CorePlugin)
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, reset_on_key);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyR);
        app.update();
        assert_eq!(app.world().resource::<Events<MatchReset>>().len(), 1);
    }

    #[test]
    fn autoclose_fires_after_configured_time() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
        let mut cfg = GameConfigRes::default();
        cfg.0.window.auto_close = 0.25;
        app.insert_resource(cfg)
            .add_systems(Startup, setup_autoclose)
            .add_systems(Update, check_autoclose);
        for _ in 0..5 {
            app.update();
        }
        assert!(app.world().resource::<Events<AppExit>>().len() >= 1);
    }

    #[test]
    fn autoclose_disabled_by_default() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(GameConfigRes::default())
            .add_systems(Startup, setup_autoclose);
        app.update();
        assert!(app.world().get_resource::<AutoCloseTimer>().is_none());
    }
}
