//! Arena construction: room shell, table, net, back-wall decorations, the ball and both paddles.
//!
//! Layout is computed by `arena_layout` (pure, testable) and spawned once at startup. Rendering
//! attaches meshes later by reacting to `SceneShape`; physics comes from the colliders added here.

use std::f32::consts::PI;

use bevy::prelude::*;
use tt_config::GameConfig;
use tt_core::{
    Ball, BallMotion, BallRadius, Fixture, GameConfigRes, Paddle, PaddleMotion, Rally,
    SceneShape, Side, TrackedController,
};

use crate::controllers::BotState;

/// One static piece of the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSpec {
    pub name: &'static str,
    pub fixture: Fixture,
    pub shape: SceneShape,
    pub translation: Vec3,
    pub rotation: Quat,
    /// Restitution / friction when the piece has a collider.
    pub collider: Option<(f32, f32)>,
}

const SHELL_RESTITUTION: f32 = 0.6;
const SHELL_FRICTION: f32 = 0.5;
/// Back-wall scoreboard box (width, height, depth).
pub const SCOREBOARD_SIZE: Vec3 = Vec3::new(1.5, 0.75, 0.1);
/// Back-wall banner plane (width, height).
pub const BANNER_SIZE: Vec2 = Vec2::new(4.0, 1.5);

pub fn arena_layout(cfg: &GameConfig) -> Vec<FixtureSpec> {
    let room = &cfg.room;
    let (w, h, d, t) = (room.width, room.height, room.depth, room.wall_thickness);
    let shell = Some((SHELL_RESTITUTION, SHELL_FRICTION));
    let slab = |name, fixture, size: Vec3, at: Vec3| FixtureSpec {
        name,
        fixture,
        shape: SceneShape::Cuboid(size),
        translation: at,
        rotation: Quat::IDENTITY,
        collider: shell,
    };

    let table = &cfg.table;
    let net = &cfg.net;
    let mut out = vec![
        slab("Floor", Fixture::Floor, Vec3::new(w, t, d), Vec3::new(0.0, -t * 0.5, 0.0)),
        slab("Ceiling", Fixture::Ceiling, Vec3::new(w, t, d), Vec3::new(0.0, h + t * 0.5, 0.0)),
        slab("Left wall", Fixture::Wall, Vec3::new(t, h, d), Vec3::new(-(w + t) * 0.5, h * 0.5, 0.0)),
        slab("Right wall", Fixture::Wall, Vec3::new(t, h, d), Vec3::new((w + t) * 0.5, h * 0.5, 0.0)),
        slab("Front wall", Fixture::Wall, Vec3::new(w, h, t), Vec3::new(0.0, h * 0.5, -(d + t) * 0.5)),
        slab("Back wall", Fixture::Wall, Vec3::new(w, h, t), Vec3::new(0.0, h * 0.5, (d + t) * 0.5)),
        FixtureSpec {
            name: "Table",
            fixture: Fixture::Table,
            shape: SceneShape::Cuboid(Vec3::new(table.width, table.thickness, table.length)),
            translation: Vec3::new(0.0, table.center_y(), 0.0),
            rotation: Quat::IDENTITY,
            collider: Some((table.restitution, table.friction)),
        },
        FixtureSpec {
            name: "Net",
            fixture: Fixture::Net,
            shape: SceneShape::Cuboid(Vec3::new(
                table.width + net.overhang * 2.0,
                net.height,
                net.thickness,
            )),
            translation: Vec3::new(0.0, table.top_height + net.height * 0.5, 0.0),
            rotation: Quat::IDENTITY,
            collider: Some((net.restitution, SHELL_FRICTION)),
        },
    ];

    // Decorations hang on the inside of the far (back) wall, facing the default camera.
    let wall_z = d * 0.5;
    out.push(FixtureSpec {
        name: "Scoreboard",
        fixture: Fixture::Scoreboard,
        shape: SceneShape::Cuboid(SCOREBOARD_SIZE),
        translation: Vec3::new(0.0, h * 0.4, wall_z - SCOREBOARD_SIZE.z * 0.5),
        rotation: Quat::IDENTITY,
        collider: None,
    });
    out.push(FixtureSpec {
        name: "Banner",
        fixture: Fixture::Banner,
        shape: SceneShape::Plane(BANNER_SIZE),
        translation: Vec3::new(0.0, h * 0.7, wall_z - 0.01),
        rotation: Quat::from_rotation_y(PI),
        collider: None,
    });
    out
}

/// Paddle orientation: local +Z is the blade normal, facing the opponent and tilted up.
pub fn paddle_rotation(side: Side, tilt_deg: f32) -> Quat {
    let tilt = Quat::from_rotation_x(-tilt_deg.to_radians());
    match side {
        Side::Near => tilt,
        Side::Far => Quat::from_rotation_y(PI) * tilt,
    }
}

pub fn spawn_arena(
    mut commands: Commands,
    cfg: Option<Res<GameConfigRes>>,
    rally: Option<Res<Rally>>,
) {
    let cfg = cfg.as_deref().cloned().unwrap_or_default();
    let gc = &cfg.0;

    let layout = arena_layout(gc);
    for spec in &layout {
        let mut e = commands.spawn((
            Name::new(spec.name),
            spec.fixture,
            spec.shape,
            Transform::from_translation(spec.translation).with_rotation(spec.rotation),
        ));
        if let (Some((restitution, friction)), SceneShape::Cuboid(size)) = (spec.collider, spec.shape)
        {
            e.insert(tt_physics::fixed_box(size, restitution, friction));
        }
    }

    let server = rally.map(|r| r.server).unwrap_or_default();
    let serve_at = cfg.serve_position(server);
    commands.spawn((
        Name::new("Ball"),
        Ball,
        BallRadius(gc.ball.radius),
        BallMotion::Frozen,
        SceneShape::Sphere(gc.ball.radius),
        Transform::from_translation(serve_at),
        tt_physics::ball_body(gc),
    ));

    for side in Side::BOTH {
        commands.spawn((
            Name::new(format!("{} paddle", side.label())),
            TrackedController { index: side.index() },
            Paddle { side },
            PaddleMotion::default(),
            BotState::default(),
            Transform::from_translation(cfg.paddle_home(side))
                .with_rotation(paddle_rotation(side, gc.paddle.tilt_deg)),
            Visibility::default(),
        ));
    }

    info!(
        fixtures = layout.len(),
        server = server.label(),
        "arena spawned"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_every_fixture_kind() {
        let layout = arena_layout(&GameConfig::default());
        for kind in [
            Fixture::Floor,
            Fixture::Ceiling,
            Fixture::Wall,
            Fixture::Table,
            Fixture::Net,
            Fixture::Scoreboard,
            Fixture::Banner,
        ] {
            assert!(layout.iter().any(|s| s.fixture == kind), "missing {kind:?}");
        }
        assert_eq!(layout.iter().filter(|s| s.fixture == Fixture::Wall).count(), 4);
    }

    #[test]
    fn table_top_and_net_sit_at_configured_heights() {
        let cfg = GameConfig::default();
        let layout = arena_layout(&cfg);
        let table = layout.iter().find(|s| s.fixture == Fixture::Table).unwrap();
        let SceneShape::Cuboid(size) = table.shape else { panic!("table is a slab") };
        assert!((table.translation.y + size.y * 0.5 - cfg.table.top_height).abs() < 1e-5);

        let net = layout.iter().find(|s| s.fixture == Fixture::Net).unwrap();
        let SceneShape::Cuboid(net_size) = net.shape else { panic!("net is a slab") };
        assert_eq!(net.translation.z, 0.0);
        assert!((net.translation.y - net_size.y * 0.5 - cfg.table.top_height).abs() < 1e-5);
    }

    #[test]
    fn decorations_have_no_colliders() {
        let layout = arena_layout(&GameConfig::default());
        for s in layout
            .iter()
            .filter(|s| matches!(s.fixture, Fixture::Scoreboard | Fixture::Banner))
        {
            assert!(s.collider.is_none(), "{} should be visual only", s.name);
        }
    }

    #[test]
    fn decorations_fit_on_the_back_wall() {
        let cfg = GameConfig::default();
        let layout = arena_layout(&cfg);
        let board = layout.iter().find(|s| s.fixture == Fixture::Scoreboard).unwrap();
        assert_eq!(board.shape, SceneShape::Cuboid(Vec3::new(1.5, 0.75, 0.1)));
        let banner = layout.iter().find(|s| s.fixture == Fixture::Banner).unwrap();
        assert_eq!(banner.shape, SceneShape::Plane(Vec2::new(4.0, 1.5)));
        assert!(banner.translation.y + BANNER_SIZE.y * 0.5 < cfg.room.height);
        assert!(board.translation.y + SCOREBOARD_SIZE.y * 0.5 < banner.translation.y - BANNER_SIZE.y * 0.5);
    }

    #[test]
    fn paddle_blades_face_the_opponent_and_tilt_up() {
        for side in Side::BOTH {
            let n = paddle_rotation(side, 12.0) * Vec3::Z;
            assert!(n.z * side.sign() < 0.0, "{side:?} normal should point toward the net");
            assert!(n.y > 0.0, "{side:?} blade should tilt upward");
        }
    }

    #[test]
    fn spawn_places_ball_at_server_spot() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfigRes::default());
        app.insert_resource(Rally::new(Side::Far));
        app.add_systems(Startup, spawn_arena);
        app.update();

        let world = app.world_mut();
        let mut balls = world.query_filtered::<(&Transform, &BallMotion), With<Ball>>();
        let (tf, motion) = balls.single(world).expect("one ball");
        assert_eq!(*motion, BallMotion::Frozen);
        assert!(tf.translation.z > 0.0);

        let mut paddles = world.query::<(&Paddle, &TrackedController)>();
        let mut sides: Vec<_> = paddles.iter(world).map(|(p, c)| (p.side.index(), c.index)).collect();
        sides.sort();
        assert_eq!(sides, vec![(0, 0), (1, 1)]);
    }
}
