// Debug tools: periodic SIM stats log and runtime toggles (F1 Rapier wireframe, F3 log).
// The binary only installs this plugin with its `debug` feature.

use bevy::prelude::*;

pub mod keys;
pub mod stats;

pub use stats::{DebugState, DebugStats};

pub struct DebugToolsPlugin;

impl Plugin for DebugToolsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>()
            .init_resource::<DebugStats>()
            .add_systems(
                Update,
                (
                    keys::debug_key_input_system,
                    stats::debug_stats_collect_system,
                    stats::debug_logging_system,
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_adds_resources() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(tt_core::CorePlugin);
        app.add_plugins(DebugToolsPlugin);
        app.update();
        assert!(app.world().get_resource::<DebugState>().is_some());
        assert_eq!(app.world().resource::<DebugStats>().hits, 0);
    }
}
