// Rendering: camera, lights, meshes/materials for arena entities, gizmo outlines and the
// scoreboard overlay. Everything reads GameConfigRes; gameplay never touches render assets.

use bevy::prelude::*;
use tt_config::GameConfig;
use tt_core::GameConfigRes;

mod palette;
pub use palette::{color_for_fixture, paddle_color, Palette};

pub mod outlines;
pub mod scene;
pub mod scoreboard;
pub use scene::PaddleVisual;
pub use scoreboard::{LastPoint, ScoreText, StatusText};

pub struct RenderingPlugin;

#[derive(Component)]
pub struct GameCamera;

fn srgb(c: [f32; 3]) -> Color {
    Color::srgb(c[0], c[1], c[2])
}

pub fn camera_transform(cfg: &GameConfig) -> Transform {
    Transform::from_translation(Vec3::from_array(cfg.camera.position))
        .looking_at(Vec3::from_array(cfg.camera.look_at), Vec3::Y)
}

fn setup_camera(mut commands: Commands, cfg: Option<Res<GameConfigRes>>) {
    let cfg = cfg.map(|c| c.0.clone()).unwrap_or_default();
    let cam = &cfg.camera;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: cam.fov_deg.to_radians(),
            near: cam.near,
            far: cam.far,
            ..default()
        }),
        camera_transform(&cfg),
        GameCamera,
    ));
}

fn setup_lights(mut commands: Commands, cfg: Option<Res<GameConfigRes>>) {
    let cfg = cfg.map(|c| c.0.lighting.clone()).unwrap_or_default();
    commands.insert_resource(ClearColor(srgb(cfg.background)));
    commands.insert_resource(AmbientLight {
        brightness: cfg.ambient_brightness,
        ..default()
    });
    commands.spawn((
        DirectionalLight {
            illuminance: cfg.directional_illuminance,
            shadows_enabled: cfg.shadows,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(cfg.directional_position))
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

// Hot-reload friendly: re-apply clear color / ambient / camera pose when the config changes.
fn sync_view_config(
    cfg: Option<Res<GameConfigRes>>,
    mut clear: Option<ResMut<ClearColor>>,
    mut ambient: Option<ResMut<AmbientLight>>,
    mut cameras: Query<&mut Transform, With<GameCamera>>,
) {
    let Some(cfg) = cfg else { return; };
    if !cfg.is_changed() || cfg.is_added() {
        return;
    }
    let gc = &cfg.0;
    if let Some(clear) = clear.as_mut() {
        clear.0 = srgb(gc.lighting.background);
    }
    if let Some(ambient) = ambient.as_mut() {
        ambient.brightness = gc.lighting.ambient_brightness;
    }
    for mut tf in &mut cameras {
        *tf = camera_transform(gc);
    }
}

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LastPoint>()
            .add_systems(
                Startup,
                (setup_camera, setup_lights, scoreboard::spawn_scoreboard_ui),
            )
            .add_systems(
                Update,
                (
                    scene::attach_scene_meshes,
                    scene::attach_paddle_meshes,
                    sync_view_config,
                    (scoreboard::track_last_point, scoreboard::update_scoreboard).chain(),
                ),
            )
            .add_systems(
                Update,
                outlines::draw_outlines
                    .run_if(resource_exists::<bevy::gizmos::config::GizmoConfigStore>),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_core::CorePlugin;

    #[test]
    fn plugin_spawns_camera_light_and_scoreboard() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(CorePlugin);
        app.insert_resource(GameConfigRes::default());
        app.add_plugins(RenderingPlugin);
        app.update();

        let world = app.world_mut();
        let mut q_cam = world.query::<&GameCamera>();
        assert_eq!(q_cam.iter(world).count(), 1, "expected exactly one GameCamera");
        let mut q_light = world.query::<&DirectionalLight>();
        assert_eq!(q_light.iter(world).count(), 1);
        let mut q_score = world.query::<&ScoreText>();
        assert_eq!(q_score.iter(world).count(), 1);
        assert_eq!(
            world.resource::<ClearColor>().0,
            srgb(GameConfig::default().lighting.background)
        );
    }

    #[test]
    fn camera_looks_at_the_table() {
        let cfg = GameConfig::default();
        let tf = camera_transform(&cfg);
        let forward = tf.forward();
        let to_target = (Vec3::from_array(cfg.camera.look_at) - tf.translation).normalize();
        assert!(forward.dot(to_target) > 0.999);
    }

    #[test]
    fn config_change_updates_clear_color() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(CorePlugin);
        app.insert_resource(GameConfigRes::default());
        app.add_plugins(RenderingPlugin);
        app.update();
        app.world_mut().resource_mut::<GameConfigRes>().0.lighting.background = [0.1, 0.2, 0.3];
        app.update();
        assert_eq!(app.world().resource::<ClearColor>().0, Color::srgb(0.1, 0.2, 0.3));
    }
}
