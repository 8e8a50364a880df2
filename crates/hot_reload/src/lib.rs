// Runtime config hot-reload (desktop only).
// Polls the configured RON layers for modification-time changes and, when one moves, re-loads
// the layered config. On success GameConfigRes is replaced (systems read it every frame) and the
// window title follows. Command-line overrides are re-applied on top of every reload. Parse
// problems are logged and the previous config is kept.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use bevy::prelude::*;
use tt_config::{ConfigOverrides, GameConfig};
use tt_core::GameConfigRes;

#[derive(Resource, Debug, Clone)]
pub struct ConfigReloadSettings {
    pub paths: Vec<PathBuf>,
    /// Polling interval seconds.
    pub interval_secs: f32,
    pub overrides: ConfigOverrides,
}

impl Default for ConfigReloadSettings {
    fn default() -> Self {
        Self {
            paths: vec![
                PathBuf::from("assets/config/game.ron"),
                PathBuf::from("assets/config/game.local.ron"),
            ],
            interval_secs: 0.5,
            overrides: ConfigOverrides::default(),
        }
    }
}

#[derive(Resource, Debug)]
pub struct ConfigReloadState {
    last_mod: HashMap<PathBuf, SystemTime>,
    primed: bool,
    timer: Timer,
}

impl Default for ConfigReloadState {
    fn default() -> Self {
        Self {
            last_mod: HashMap::new(),
            primed: false,
            timer: Timer::from_seconds(0.5, TimerMode::Repeating),
        }
    }
}

impl ConfigReloadState {
    /// Record current modification times; true when any file is newer than last seen.
    /// The first scan only primes the table.
    pub fn scan<P: AsRef<Path>>(&mut self, paths: &[P]) -> bool {
        let mut dirty = false;
        for path in paths {
            let path = path.as_ref();
            let Ok(modified) = std::fs::metadata(path).and_then(|m| m.modified()) else {
                continue;
            };
            match self.last_mod.insert(path.to_path_buf(), modified) {
                Some(prev) if modified > prev => dirty = true,
                // A layer that appears after startup counts as a change.
                None if self.primed => dirty = true,
                _ => {}
            }
        }
        self.primed = true;
        dirty
    }
}

/// Layered reload restricted to files that exist (the local layer is optional).
pub fn reload_layers(paths: &[PathBuf]) -> (GameConfig, Vec<String>) {
    let existing: Vec<&PathBuf> = paths.iter().filter(|p| p.exists()).collect();
    let (cfg, _used, errors) = GameConfig::load_layered(existing);
    (cfg, errors)
}

pub struct HotReloadPlugin;

impl Plugin for HotReloadPlugin {
    fn build(&self, app: &mut App) {
        // Only meaningful on native (std::fs) targets.
        #[cfg(not(target_arch = "wasm32"))]
        {
            app.init_resource::<ConfigReloadSettings>()
                .init_resource::<ConfigReloadState>()
                .add_systems(Startup, prime_reload_state)
                .add_systems(Update, poll_and_reload_config);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = app;
    }
}

fn prime_reload_state(settings: Res<ConfigReloadSettings>, mut state: ResMut<ConfigReloadState>) {
    state.scan(&settings.paths);
}

fn poll_and_reload_config(
    time: Res<Time>,
    settings: Res<ConfigReloadSettings>,
    mut state: ResMut<ConfigReloadState>,
    cfg_res: Option<ResMut<GameConfigRes>>,
    mut windows: Query<&mut Window>,
) {
    let interval = settings.interval_secs.max(0.05);
    if (state.timer.duration().as_secs_f32() - interval).abs() > f32::EPSILON {
        state.timer.set_duration(Duration::from_secs_f32(interval));
    }
    if !state.timer.tick(time.delta()).finished() {
        return;
    }
    if !state.scan(&settings.paths) {
        return;
    }
    let Some(mut cfg_res) = cfg_res else { return; };

    let (mut new_cfg, errors) = reload_layers(&settings.paths);
    if !errors.is_empty() {
        for e in errors {
            warn!("CONFIG HOT-RELOAD issue: {e}");
        }
        // Keep the running config rather than falling back to defaults on a typo.
        return;
    }
    settings.overrides.apply(&mut new_cfg);
    for w in new_cfg.validate() {
        warn!("CONFIG HOT-RELOAD warning: {w}");
    }
    if cfg_res.0 == new_cfg {
        return;
    }
    info!("Config hot-reload applied");
    if let Ok(mut window) = windows.single_mut() {
        if window.title != new_cfg.window.title {
            window.title = new_cfg.window.title.clone();
        }
    }
    cfg_res.0 = new_cfg;
}
