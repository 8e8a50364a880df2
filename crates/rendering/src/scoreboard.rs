//! Scoreboard overlay: score line plus a status line under it.
//!
//! The 3D scoreboard box on the back wall is spawned by gameplay as a plain fixture; the readable
//! numbers live in this UI node so they stay legible from any camera position.

use bevy::prelude::*;
use tt_core::{PointScored, Rally, RallyPhase, Score};

use crate::palette::Palette;

#[derive(Component)]
pub struct ScoreboardUi;
#[derive(Component)]
pub struct ScoreText;
#[derive(Component)]
pub struct StatusText;

/// Last point, shown while the rally is paused.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct LastPoint(pub Option<PointScored>);

pub fn status_line(rally: &Rally, last: Option<PointScored>) -> String {
    match (rally.phase, last) {
        (RallyPhase::PointOver { .. }, Some(p)) => format!(
            "Point {} ({}). {}",
            p.winner.label(),
            p.reason.label(),
            rally.status()
        ),
        _ => rally.status(),
    }
}

pub(crate) fn spawn_scoreboard_ui(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                ..default()
            },
            ScoreboardUi,
        ))
        .with_children(|p| {
            p.spawn((
                Text::new(Score::default().display()),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Palette::SCORE_TEXT),
                ScoreText,
            ));
            p.spawn((
                Text::new(Rally::default().status()),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Palette::SCORE_TEXT),
                StatusText,
            ));
        });
}

pub(crate) fn track_last_point(mut last: ResMut<LastPoint>, mut ev: EventReader<PointScored>) {
    if let Some(p) = ev.read().last() {
        last.0 = Some(*p);
    }
}

pub(crate) fn update_scoreboard(
    score: Res<Score>,
    rally: Res<Rally>,
    last: Res<LastPoint>,
    mut texts: ParamSet<(
        Query<&mut Text, With<ScoreText>>,
        Query<&mut Text, With<StatusText>>,
    )>,
) {
    if !score.is_changed() && !rally.is_changed() && !last.is_changed() {
        return;
    }
    for mut t in texts.p0().iter_mut() {
        t.0 = score.display();
    }
    let status = status_line(&rally, last.0);
    for mut t in texts.p1().iter_mut() {
        t.0.clone_from(&status);
    }
}
