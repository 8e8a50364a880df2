//! Meshes and materials for arena entities.
//!
//! Reacts to `Added<SceneShape>` / `Added<Paddle>` so gameplay never touches render assets. Apps
//! without mesh/material stores (headless tests) skip attachment entirely.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use tt_config::PaddleConfig;
use tt_core::{Ball, Fixture, GameConfigRes, Paddle, SceneShape};

use crate::palette::{color_for_fixture, paddle_color, Palette};

/// Child mesh of a paddle (blade or handle).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleVisual {
    Blade,
    Handle,
}

pub fn mesh_for_shape(shape: SceneShape) -> Mesh {
    match shape {
        SceneShape::Cuboid(size) => Cuboid::new(size.x, size.y, size.z).into(),
        SceneShape::Plane(size) => Rectangle::new(size.x, size.y).into(),
        SceneShape::Sphere(r) => Sphere::new(r).mesh().uv(32, 18),
    }
}

fn material_for(fixture: Option<Fixture>, is_ball: bool) -> StandardMaterial {
    let base_color = match (fixture, is_ball) {
        (_, true) => Palette::BALL,
        (Some(f), _) => color_for_fixture(f),
        (None, false) => Palette::WALL,
    };
    let alpha_mode = if base_color.alpha() < 1.0 {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    };
    StandardMaterial {
        base_color,
        alpha_mode,
        perceptual_roughness: if is_ball { 0.4 } else { 0.8 },
        double_sided: fixture == Some(Fixture::Net),
        ..default()
    }
}

pub(crate) fn attach_scene_meshes(
    mut commands: Commands,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
    q: Query<(Entity, &SceneShape, Option<&Fixture>, Has<Ball>), Added<SceneShape>>,
) {
    let (Some(mut meshes), Some(mut materials)) = (meshes, materials) else { return; };
    for (entity, shape, fixture, is_ball) in &q {
        let mesh = meshes.add(mesh_for_shape(*shape));
        let material = materials.add(material_for(fixture.copied(), is_ball));
        commands
            .entity(entity)
            .insert((Mesh3d(mesh), MeshMaterial3d(material)));
    }
}

/// Blade disc (normal along local +Z) and a handle hanging below it.
pub fn paddle_parts(cfg: &PaddleConfig) -> [(PaddleVisual, Mesh, Transform); 2] {
    let blade = Cylinder::new(cfg.blade_radius, cfg.blade_thickness);
    let handle = Cylinder::new(cfg.handle_radius, cfg.handle_length);
    [
        (
            PaddleVisual::Blade,
            blade.into(),
            Transform::from_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        ),
        (
            PaddleVisual::Handle,
            handle.into(),
            Transform::from_xyz(0.0, -(cfg.blade_radius + cfg.handle_length * 0.5), 0.0),
        ),
    ]
}

pub(crate) fn attach_paddle_meshes(
    mut commands: Commands,
    cfg: Option<Res<GameConfigRes>>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
    q: Query<(Entity, &Paddle), Added<Paddle>>,
) {
    let (Some(mut meshes), Some(mut materials)) = (meshes, materials) else { return; };
    let paddle_cfg = cfg.map(|c| c.0.paddle.clone()).unwrap_or_default();
    for (entity, paddle) in &q {
        let parts = paddle_parts(&paddle_cfg);
        // Blade and handle share the side color.
        let blade_mat = materials.add(StandardMaterial {
            base_color: paddle_color(paddle.side),
            perceptual_roughness: 0.6,
            ..default()
        });
        let handle_mat = materials.add(StandardMaterial {
            base_color: paddle_color(paddle.side),
            perceptual_roughness: 0.9,
            ..default()
        });
        commands.entity(entity).with_children(|p| {
            for (part, mesh, tf) in parts {
                let material = match part {
                    PaddleVisual::Blade => blade_mat.clone(),
                    PaddleVisual::Handle => handle_mat.clone(),
                };
                p.spawn((part, Mesh3d(meshes.add(mesh)), MeshMaterial3d(material), tf));
            }
        });
    }
}
