// Core crate: ECS components, markers, events, system set labels and the match state shared by
// every other crate. No systems with game logic live here.

use bevy::prelude::*;

pub mod rally;
pub use rally::{Bounce, PointReason, Rally, RallyPhase, RallyRules, Score};

/// One end of the table. `Near` is controller 0 (red paddle, z < 0), `Far` is controller 1
/// (blue paddle, z > 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Near,
    Far,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Near, Side::Far];

    pub fn opponent(self) -> Side {
        match self {
            Side::Near => Side::Far,
            Side::Far => Side::Near,
        }
    }

    /// Controller index driving this side's paddle.
    pub fn index(self) -> usize {
        match self {
            Side::Near => 0,
            Side::Far => 1,
        }
    }

    /// Sign of this side's half along Z.
    pub fn sign(self) -> f32 {
        match self {
            Side::Near => -1.0,
            Side::Far => 1.0,
        }
    }

    /// Half of the table a Z coordinate belongs to (the net line counts as Far).
    pub fn of_z(z: f32) -> Side {
        if z < 0.0 {
            Side::Near
        } else {
            Side::Far
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Near => "Red",
            Side::Far => "Blue",
        }
    }
}

#[derive(Component, Debug)]
pub struct Ball;

/// Logical radius used both for collider and rendering scale.
#[derive(Component, Debug, Deref, DerefMut, Copy, Clone)]
pub struct BallRadius(pub f32);

/// A frozen ball hangs kinematically at its serve position until a paddle touches it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BallMotion {
    #[default]
    Frozen,
    Live,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Paddle {
    pub side: Side,
}

/// Pose source slot (0 or 1); the paddle is mounted on the controller entity itself.
#[derive(Component, Debug, Clone, Copy)]
pub struct TrackedController {
    pub index: usize,
}

/// Per-frame paddle kinematics derived from controller poses.
#[derive(Component, Debug, Clone, Default)]
pub struct PaddleMotion {
    pub velocity: Vec3,
    pub last_position: Option<Vec3>,
    /// Pose one frame earlier; hits are swept from here to the current pose.
    pub previous_position: Option<Vec3>,
    /// Seconds until this paddle may hit again.
    pub cooldown: f32,
}

/// Identity of a static scene element; contact handling and palette lookups key on it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixture {
    Wall,
    Ceiling,
    Floor,
    Table,
    Net,
    Scoreboard,
    Banner,
}

impl Fixture {
    /// Contacts with these end the rally unless the ball already bounced on the receiver's half.
    pub fn is_out_of_play(self) -> bool {
        matches!(self, Fixture::Wall | Fixture::Ceiling | Fixture::Floor)
    }
}

/// Visual geometry of an entity, in world units (full extents).
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum SceneShape {
    Cuboid(Vec3),
    /// Flat rectangle facing +Z (back wall decorations).
    Plane(Vec2),
    Sphere(f32),
}

/// Deterministic RNG seed resource (set once at startup / tests for reproducible bot behavior).
#[derive(Resource, Debug, Copy, Clone, Default)]
pub struct RngSeed(pub u64);

// Wrapper Bevy resource for the pure-data GameConfig (keeps tt_config free of bevy dependency).
#[derive(Resource, Debug, Clone, Default)]
pub struct GameConfigRes(pub tt_config::GameConfig);

impl GameConfigRes {
    pub fn rules(&self) -> RallyRules {
        RallyRules::from(&self.0.rules)
    }

    pub fn serve_position(&self, side: Side) -> Vec3 {
        Vec3::from_array(self.0.serve_position(side.sign()))
    }

    pub fn paddle_home(&self, side: Side) -> Vec3 {
        Vec3::from_array(self.0.paddle_home(side.sign()))
    }
}

/// Ball touched a static fixture (classified from a physics contact or the out-of-bounds check).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BallContact {
    pub fixture: Fixture,
    pub position: Vec3,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PaddleHit {
    pub side: Side,
    pub speed: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointScored {
    pub winner: Side,
    pub reason: PointReason,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct MatchReset;

// System set labels, run in this order in Update. Rapier itself steps in PostUpdate.
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct ControllerSet; // controller poses and paddle kinematics
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct PrePhysicsSet; // paddle hits and velocity edits before the simulation step
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct ContactSet; // physics contacts from the last step -> BallContact events
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct PostPhysicsAdjustSet; // rally rules, resets and body-state corrections

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                ControllerSet.before(PrePhysicsSet),
                PrePhysicsSet.before(ContactSet),
                ContactSet.before(PostPhysicsAdjustSet),
            ),
        )
        .init_resource::<Score>()
        .init_resource::<Rally>()
        .add_event::<BallContact>()
        .add_event::<PaddleHit>()
        .add_event::<PointScored>()
        .add_event::<MatchReset>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_adds_sets_and_resources() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(CorePlugin);
        fn dummy() {}
        app.add_systems(Update, dummy.in_set(ControllerSet));
        app.add_systems(Update, dummy.in_set(PrePhysicsSet));
        app.add_systems(Update, dummy.in_set(ContactSet));
        app.add_systems(Update, dummy.in_set(PostPhysicsAdjustSet));
        app.update();
        assert!(app.world().get_resource::<Score>().is_some());
        assert!(app.world().get_resource::<Rally>().is_some());
        assert!(app.world().get_resource::<Events<BallContact>>().is_some());
    }

    #[test]
    fn side_helpers() {
        assert_eq!(Side::Near.opponent(), Side::Far);
        assert_eq!(Side::of_z(-0.5), Side::Near);
        assert_eq!(Side::of_z(0.5), Side::Far);
        assert_eq!(Side::Far.sign(), 1.0);
        assert_eq!(Side::Far.index(), 1);
    }

    #[test]
    fn config_wrapper_positions_follow_side() {
        let cfg = GameConfigRes::default();
        let near = cfg.serve_position(Side::Near);
        let far = cfg.serve_position(Side::Far);
        assert!(near.z < 0.0 && far.z > 0.0);
        assert_eq!(near.y, far.y);
        assert!(cfg.paddle_home(Side::Near).z < near.z, "paddle rests behind the serve spot");
    }

    #[test]
    fn out_of_play_fixtures() {
        assert!(Fixture::Floor.is_out_of_play());
        assert!(Fixture::Wall.is_out_of_play());
        assert!(!Fixture::Table.is_out_of_play());
        assert!(!Fixture::Net.is_out_of_play());
    }
}
