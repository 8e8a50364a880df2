use bevy::prelude::*;
use bevy_rapier3d::render::DebugRenderContext;

use crate::stats::DebugState;

/// F1 toggles the Rapier wireframe (when the debug render plugin is installed), F3 the SIM log.
pub fn debug_key_input_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut state: ResMut<DebugState>,
    render: Option<ResMut<DebugRenderContext>>,
) {
    let Some(keys) = keys else { return; };
    if keys.just_pressed(KeyCode::F1) {
        if let Some(mut ctx) = render {
            ctx.enabled = !ctx.enabled;
            info!(enabled = ctx.enabled, frame = state.frame_counter, "rapier debug render toggled");
        }
    }
    if keys.just_pressed(KeyCode::F3) {
        state.log_enabled = !state.log_enabled;
        info!(enabled = state.log_enabled, "SIM log toggled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f3_toggles_log() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<DebugState>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, debug_key_input_system);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::F3);
        app.update();
        assert!(!app.world().resource::<DebugState>().log_enabled);
    }

    #[test]
    fn f1_flips_render_context_when_present() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<DebugState>()
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(DebugRenderContext {
                enabled: false,
                ..default()
            })
            .add_systems(Update, debug_key_input_system);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::F1);
        app.update();
        assert!(app.world().resource::<DebugRenderContext>().enabled);
    }
}
