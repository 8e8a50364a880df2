//! Turns raw Rapier collision events into `BallContact` gameplay events.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use bevy_rapier3d::rapier::geometry::CollisionEventFlags;
use tt_config::GameConfig;
use tt_core::{Ball, BallContact, BallMotion, Fixture, GameConfigRes};

/// Which fixture (if any) the ball touched in a collision between `a` and `b`.
///
/// Order of the pair is irrelevant; pairs that do not involve `ball` or whose other side is not a
/// fixture yield `None`.
pub fn classify_pair(
    a: Entity,
    b: Entity,
    ball: Entity,
    fixture_of: impl Fn(Entity) -> Option<Fixture>,
) -> Option<Fixture> {
    let other = if a == ball {
        b
    } else if b == ball {
        a
    } else {
        return None;
    };
    fixture_of(other)
}

/// Ball escaped the room volume (plus margin); treated as a floor contact.
pub fn outside_room(p: Vec3, cfg: &GameConfig) -> bool {
    let m = cfg.rules.out_of_bounds_margin.max(0.0);
    let half_w = cfg.room.width * 0.5 + m;
    let half_d = cfg.room.depth * 0.5 + m;
    p.x.abs() > half_w || p.z.abs() > half_d || p.y < -m || p.y > cfg.room.height + m
}

pub(crate) fn classify_contacts(
    mut collisions: EventReader<CollisionEvent>,
    balls: Query<(Entity, &Transform), With<Ball>>,
    fixtures: Query<&Fixture>,
    mut out: EventWriter<BallContact>,
) {
    for ev in collisions.read() {
        let CollisionEvent::Started(e1, e2, flags) = ev else {
            continue;
        };
        if flags.contains(CollisionEventFlags::SENSOR) {
            continue;
        }
        for (ball, tf) in &balls {
            let Some(fixture) = classify_pair(*e1, *e2, ball, |e| fixtures.get(e).ok().copied())
            else {
                continue;
            };
            trace!(?fixture, "ball contact at {:?}", tf.translation);
            out.write(BallContact {
                fixture,
                position: tf.translation,
            });
        }
    }
}

// Latched so one escape reports once; re-armed when the ball is frozen for the next serve.
pub(crate) fn detect_out_of_bounds(
    cfg: Option<Res<GameConfigRes>>,
    balls: Query<(&Transform, &BallMotion), With<Ball>>,
    mut reported: Local<bool>,
    mut out: EventWriter<BallContact>,
) {
    let Some(cfg) = cfg else { return; };
    for (tf, motion) in &balls {
        if *motion == BallMotion::Frozen {
            *reported = false;
            continue;
        }
        if !*reported && outside_room(tf.translation, &cfg.0) {
            *reported = true;
            debug!("ball left the room at {:?}", tf.translation);
            out.write(BallContact {
                fixture: Fixture::Floor,
                position: tf.translation,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_core::CorePlugin;

    #[derive(Resource, Default)]
    struct Seen(Vec<BallContact>);

    fn collect(mut seen: ResMut<Seen>, mut ev: EventReader<BallContact>) {
        seen.0.extend(ev.read().copied());
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(CorePlugin)
            .add_event::<CollisionEvent>()
            .init_resource::<Seen>()
            .insert_resource(GameConfigRes::default())
            .add_systems(
                Update,
                ((classify_contacts, detect_out_of_bounds), collect).chain(),
            );
        app
    }

    #[test]
    fn classify_pair_is_order_independent() {
        let mut world = World::new();
        let ball = world.spawn_empty().id();
        let table = world.spawn_empty().id();
        let stranger = world.spawn_empty().id();
        let lookup = |e: Entity| (e == table).then_some(Fixture::Table);
        assert_eq!(classify_pair(ball, table, ball, lookup), Some(Fixture::Table));
        assert_eq!(classify_pair(table, ball, ball, lookup), Some(Fixture::Table));
        assert_eq!(classify_pair(table, stranger, ball, lookup), None);
        assert_eq!(classify_pair(ball, stranger, ball, lookup), None);
    }

    #[test]
    fn collision_with_table_becomes_ball_contact() {
        let mut app = test_app();
        let ball = app
            .world_mut()
            .spawn((Ball, BallMotion::Live, Transform::from_xyz(0.3, 0.9, -1.0)))
            .id();
        let table = app.world_mut().spawn(Fixture::Table).id();
        app.world_mut().send_event(CollisionEvent::Started(
            table,
            ball,
            CollisionEventFlags::empty(),
        ));
        app.update();
        let seen = &app.world().resource::<Seen>().0;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].fixture, Fixture::Table);
        assert_eq!(seen[0].position, Vec3::new(0.3, 0.9, -1.0));
    }

    #[test]
    fn sensor_and_stopped_events_ignored() {
        let mut app = test_app();
        let ball = app
            .world_mut()
            .spawn((Ball, BallMotion::Live, Transform::from_xyz(0.0, 1.0, 0.0)))
            .id();
        let net = app.world_mut().spawn(Fixture::Net).id();
        app.world_mut().send_event(CollisionEvent::Started(
            ball,
            net,
            CollisionEventFlags::SENSOR,
        ));
        app.world_mut().send_event(CollisionEvent::Stopped(
            ball,
            net,
            CollisionEventFlags::empty(),
        ));
        app.update();
        assert!(app.world().resource::<Seen>().0.is_empty());
    }

    #[test]
    fn escaping_ball_reports_floor_once() {
        let mut app = test_app();
        let ball = app
            .world_mut()
            .spawn((Ball, BallMotion::Live, Transform::from_xyz(0.0, 1.0, 50.0)))
            .id();
        app.update();
        app.update();
        assert_eq!(app.world().resource::<Seen>().0.len(), 1);
        assert_eq!(app.world().resource::<Seen>().0[0].fixture, Fixture::Floor);

        // Freezing re-arms the latch.
        *app.world_mut().get_mut::<BallMotion>(ball).unwrap() = BallMotion::Frozen;
        app.update();
        *app.world_mut().get_mut::<BallMotion>(ball).unwrap() = BallMotion::Live;
        app.update();
        assert_eq!(app.world().resource::<Seen>().0.len(), 2);
    }

    #[test]
    fn room_bounds_include_margin() {
        let cfg = GameConfig::default();
        let edge = cfg.room.depth * 0.5 + cfg.rules.out_of_bounds_margin * 0.5;
        assert!(!outside_room(Vec3::new(0.0, 1.0, edge), &cfg));
        assert!(outside_room(Vec3::new(0.0, 1.0, edge + cfg.rules.out_of_bounds_margin), &cfg));
        assert!(outside_room(Vec3::new(0.0, -5.0, 0.0), &cfg));
    }
}
