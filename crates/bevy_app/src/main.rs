/*!
Table tennis arena binary.

* Config loading (native layered + CLI overrides, wasm embed) using tt_config::GameConfig.
* Validation warnings logged once logging is up.
* Feature-gated optional subsystems (`debug`, `hot-reload`).
* Rapier debug render plugin gating (config / CLI flag or `debug` feature).
*/

use std::path::PathBuf;

use anyhow::Context;
use bevy::prelude::*;
use bevy_rapier3d::prelude::RapierDebugRenderPlugin;
use clap::Parser;
use tt_config::{ConfigOverrides, ControllerDriver, GameConfig};
use tt_core::{CorePlugin, GameConfigRes, RngSeed};
use tt_gameplay::GameplayPlugin;
use tt_physics::PhysicsPlugin;
use tt_rendering::RenderingPlugin;

#[cfg(feature = "debug")]
use tt_debug_tools::DebugToolsPlugin;

#[cfg(feature = "hot-reload")]
use tt_hot_reload::{ConfigReloadSettings, HotReloadPlugin};

#[cfg(not(target_arch = "wasm32"))]
const BASE_CONFIG: &str = "assets/config/game.ron";
#[cfg(not(target_arch = "wasm32"))]
const LOCAL_CONFIG: &str = "assets/config/game.local.ron";

#[derive(Parser, Debug, Default)]
#[command(about = "Table tennis arena", version, author)]
struct Args {
    /// Extra RON layer applied on top of game.ron / game.local.ron.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for bot jitter (overrides `seed` in config).
    #[arg(long)]
    seed: Option<u64>,
    /// Exit after this many seconds (0 = never).
    #[arg(long)]
    auto_close: Option<f32>,
    #[arg(long)]
    rapier_debug: bool,
    /// Driver for the red paddle: mouse, keyboard, bot or idle.
    #[arg(long)]
    near: Option<ControllerDriver>,
    /// Driver for the blue paddle.
    #[arg(long)]
    far: Option<ControllerDriver>,
}

/// Messages gathered before the log plugin exists; replayed at startup.
#[derive(Resource, Debug, Default, Clone)]
struct ConfigReport {
    used: Vec<String>,
    warnings: Vec<String>,
}

// ---------------- Config Loading ----------------

#[cfg(target_arch = "wasm32")]
fn load_config(_args: &Args) -> anyhow::Result<(GameConfig, ConfigReport)> {
    // Embed base config (no layered local override on wasm).
    const RAW: &str = include_str!("../../../assets/config/game.ron");
    let mut report = ConfigReport::default();
    let cfg = ron::from_str(RAW).unwrap_or_else(|e| {
        report.warnings.push(format!("embedded config parse failure: {e}; using defaults"));
        GameConfig::default()
    });
    report.used.push("<embedded game.ron>".into());
    Ok((cfg, report))
}

#[cfg(not(target_arch = "wasm32"))]
fn config_layers(args: &Args) -> Vec<PathBuf> {
    let mut layers = vec![PathBuf::from(BASE_CONFIG)];
    if std::path::Path::new(LOCAL_CONFIG).exists() {
        layers.push(PathBuf::from(LOCAL_CONFIG));
    }
    layers.extend(args.config.clone());
    layers
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(args: &Args) -> anyhow::Result<(GameConfig, ConfigReport)> {
    if let Some(extra) = &args.config {
        anyhow::ensure!(extra.exists(), "config layer {} not found", extra.display());
        // Surface syntax errors in an explicitly requested file instead of silently falling back.
        GameConfig::load_from_file(extra)
            .with_context(|| format!("loading --config {}", extra.display()))?;
    }
    let (cfg, used, errors) = GameConfig::load_layered(config_layers(args));
    Ok((
        cfg,
        ConfigReport {
            used,
            warnings: errors,
        },
    ))
}

/// Every layer hot reload watches: base, local (even if not created yet) and `--config`.
#[cfg(all(feature = "hot-reload", not(target_arch = "wasm32")))]
fn watched_layers(args: &Args) -> Vec<PathBuf> {
    let mut layers = vec![PathBuf::from(BASE_CONFIG), PathBuf::from(LOCAL_CONFIG)];
    layers.extend(args.config.clone());
    layers
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            seed: self.seed,
            auto_close: self.auto_close,
            rapier_debug: self.rapier_debug,
            near: self.near,
            far: self.far,
        }
    }
}

fn log_config_report(report: Res<ConfigReport>, cfg: Res<GameConfigRes>) {
    for w in &report.warnings {
        warn!("CONFIG LOAD ISSUE: {w}");
    }
    if report.used.is_empty() {
        info!("No config layers found; using defaults");
    } else {
        info!(used = ?report.used, "Config layers loaded");
    }
    for w in cfg.0.validate() {
        warn!("CONFIG WARNING: {w}");
    }
    info!(
        near = cfg.0.controllers.near.as_str(),
        far = cfg.0.controllers.far.as_str(),
        points_to_win = cfg.0.rules.points_to_win,
        seed = cfg.0.seed,
        "Runtime summary"
    );
}

// ---------------- Main ----------------

fn main() -> anyhow::Result<()> {
    #[cfg(target_arch = "wasm32")]
    {
        // Better panic messages on wasm
        console_error_panic_hook::set_once();
    }

    #[cfg(not(target_arch = "wasm32"))]
    let args = Args::parse();
    #[cfg(target_arch = "wasm32")]
    let args = Args::default();

    let (mut cfg, report) = load_config(&args)?;
    let overrides = args.overrides();
    overrides.apply(&mut cfg);

    let mut app = App::new();
    app.insert_resource(GameConfigRes(cfg.clone()))
        .insert_resource(RngSeed(cfg.seed))
        .insert_resource(report)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: cfg.window.title.clone(),
                resolution: (cfg.window.width, cfg.window.height).into(),
                resizable: true,
                ..Default::default()
            }),
            ..Default::default()
        }))
        .add_plugins(CorePlugin)
        .add_plugins(PhysicsPlugin)
        .add_plugins(RenderingPlugin)
        .add_plugins(GameplayPlugin)
        .add_systems(Startup, log_config_report);

    #[cfg(feature = "debug")]
    {
        app.add_plugins(DebugToolsPlugin);
    }
    #[cfg(feature = "hot-reload")]
    {
        #[cfg(not(target_arch = "wasm32"))]
        app.insert_resource(ConfigReloadSettings {
            paths: watched_layers(&args),
            overrides,
            ..default()
        });
        app.add_plugins(HotReloadPlugin);
    }

    // Rapier wireframe: always available with `debug` (F1 toggles it), otherwise only on request.
    #[cfg(feature = "debug")]
    {
        app.add_plugins(RapierDebugRenderPlugin {
            enabled: cfg.debug.rapier_debug,
            ..default()
        });
    }
    #[cfg(not(feature = "debug"))]
    {
        if cfg.debug.rapier_debug {
            app.add_plugins(RapierDebugRenderPlugin::default());
        }
    }

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("app exited with error code {code}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_overrides() {
        let args = Args::try_parse_from([
            "table_tennis",
            "--seed",
            "7",
            "--auto-close",
            "3.5",
            "--rapier-debug",
            "--near",
            "keyboard",
            "--far",
            "Idle",
        ])
        .expect("valid args");
        let mut cfg = GameConfig::default();
        args.overrides().apply(&mut cfg);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.window.auto_close, 3.5);
        assert!(cfg.debug.rapier_debug);
        assert_eq!(cfg.controllers.near, ControllerDriver::Keyboard);
        assert_eq!(cfg.controllers.far, ControllerDriver::Idle);
    }

    #[test]
    fn cli_rejects_unknown_driver() {
        assert!(Args::try_parse_from(["table_tennis", "--near", "gamepad"]).is_err());
    }

    #[test]
    fn extra_config_is_the_last_layer() {
        let args = Args {
            config: Some(PathBuf::from("my.ron")),
            ..Default::default()
        };
        let layers = config_layers(&args);
        assert_eq!(layers.first(), Some(&PathBuf::from(BASE_CONFIG)));
        assert_eq!(layers.last(), Some(&PathBuf::from("my.ron")));
    }

    #[cfg(feature = "hot-reload")]
    #[test]
    fn hot_reload_watches_every_layer() {
        let args = Args {
            config: Some(PathBuf::from("my.ron")),
            ..Default::default()
        };
        assert_eq!(
            watched_layers(&args),
            vec![
                PathBuf::from(BASE_CONFIG),
                PathBuf::from(LOCAL_CONFIG),
                PathBuf::from("my.ron"),
            ]
        );
    }

    #[test]
    fn missing_extra_config_is_an_error() {
        let args = Args {
            config: Some(PathBuf::from("definitely/not/here.ron")),
            ..Default::default()
        };
        assert!(load_config(&args).is_err());
    }
}
