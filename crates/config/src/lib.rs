// Pure-data game configuration (no Bevy dependency).
// Provides: data structures, layered loading, validation producing warnings (non-fatal), and tests.
// Units are meters / seconds; +Y is up and the table's long axis is Z (net at z = 0).

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse RON {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    /// Automatically close the app after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Table Tennis Arena".into(),
            auto_close: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity_y: f32,
    /// Fixed step advanced once per rendered frame.
    pub timestep: f32,
    pub substeps: usize,
}
impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_y: -9.82,
            timestep: 1.0 / 60.0,
            substeps: 1,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RoomConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub wall_thickness: f32,
}
impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: 14.0,
            height: 5.0,
            depth: 9.0,
            wall_thickness: 0.1,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    /// Extent along X.
    pub width: f32,
    /// Extent along Z (the playing direction).
    pub length: f32,
    pub thickness: f32,
    /// Height of the playing surface above the floor.
    pub top_height: f32,
    pub restitution: f32,
    pub friction: f32,
}
impl Default for TableConfig {
    fn default() -> Self {
        Self {
            width: 3.0,
            length: 7.0,
            thickness: 0.2,
            top_height: 0.8,
            restitution: 0.9,
            friction: 0.3,
        }
    }
}
impl TableConfig {
    pub fn half_length(&self) -> f32 {
        self.length * 0.5
    }
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }
    /// Center of the table slab (top surface sits at `top_height`).
    pub fn center_y(&self) -> f32 {
        self.top_height - self.thickness * 0.5
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NetConfig {
    /// Height above the table surface.
    pub height: f32,
    pub thickness: f32,
    /// Extra width beyond each table side.
    pub overhang: f32,
    pub restitution: f32,
}
impl Default for NetConfig {
    fn default() -> Self {
        Self {
            height: 0.3,
            thickness: 0.02,
            overhang: 0.0,
            restitution: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    /// Serve height above the table surface.
    pub serve_height: f32,
    /// Serve distance from the net along Z (mirrored per side).
    pub serve_distance: f32,
    pub max_speed: f32,
}
impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: 0.1,
            restitution: 0.85,
            friction: 0.2,
            linear_damping: 0.05,
            serve_height: 0.5,
            serve_distance: 2.6,
            max_speed: 14.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PaddleConfig {
    pub blade_radius: f32,
    pub blade_thickness: f32,
    pub handle_radius: f32,
    pub handle_length: f32,
    /// Upward tilt of the blade normal (degrees).
    pub tilt_deg: f32,
    /// Rest height above the table surface.
    pub home_height: f32,
    /// Rest distance from the net along Z (mirrored per side).
    pub home_distance: f32,
}
impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            blade_radius: 0.3,
            blade_thickness: 0.02,
            handle_radius: 0.05,
            handle_length: 0.3,
            tilt_deg: 12.0,
            home_height: 0.5,
            home_distance: 3.7,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HitConfig {
    /// Extra distance beyond the ball radius that still counts as touching the blade.
    pub margin: f32,
    pub restitution: f32,
    pub paddle_velocity_transfer: f32,
    pub min_return_speed: f32,
    pub min_lift: f32,
    /// Seconds before the same paddle can hit again.
    pub cooldown: f32,
}
impl Default for HitConfig {
    fn default() -> Self {
        Self {
            margin: 0.05,
            restitution: 0.8,
            paddle_velocity_transfer: 0.6,
            min_return_speed: 5.0,
            min_lift: 3.0,
            cooldown: 0.25,
        }
    }
}

/// Source of a controller pose.
///
/// Stored as a quoted string in RON (`near: "Mouse"`): `ron::Value` drops bare enum
/// identifiers, which would break layered merging.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum ControllerDriver {
    Mouse,
    Keyboard,
    Bot,
    Idle,
}

impl ControllerDriver {
    pub fn as_str(self) -> &'static str {
        match self {
            ControllerDriver::Mouse => "Mouse",
            ControllerDriver::Keyboard => "Keyboard",
            ControllerDriver::Bot => "Bot",
            ControllerDriver::Idle => "Idle",
        }
    }
}

impl std::str::FromStr for ControllerDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mouse" => Ok(ControllerDriver::Mouse),
            "keyboard" => Ok(ControllerDriver::Keyboard),
            "bot" => Ok(ControllerDriver::Bot),
            "idle" => Ok(ControllerDriver::Idle),
            other => Err(format!(
                "unknown controller driver '{other}' (expected Mouse, Keyboard, Bot or Idle)"
            )),
        }
    }
}

impl TryFrom<String> for ControllerDriver {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ControllerDriver> for String {
    fn from(value: ControllerDriver) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Driver for controller 0 (Near side, red paddle).
    pub near: ControllerDriver,
    /// Driver for controller 1 (Far side, blue paddle).
    pub far: ControllerDriver,
    pub move_speed: f32,
    pub lunge_distance: f32,
    pub bot_speed: f32,
    pub bot_reach: f32,
    pub bot_serve_delay: f32,
    /// Max aim offset (meters) applied to bot targets.
    pub bot_jitter: f32,
}
impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            near: ControllerDriver::Mouse,
            far: ControllerDriver::Bot,
            move_speed: 3.0,
            lunge_distance: 1.0,
            bot_speed: 3.5,
            bot_reach: 1.2,
            bot_serve_delay: 1.0,
            bot_jitter: 0.08,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub points_to_win: u32,
    pub win_by: u32,
    pub serves_per_turn: u32,
    pub allow_volley: bool,
    /// Seconds between a point and the next serve.
    pub point_pause: f32,
    /// Distance outside the room shell at which a ball is considered out of play.
    pub out_of_bounds_margin: f32,
}
impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            points_to_win: 11,
            win_by: 2,
            serves_per_turn: 2,
            allow_volley: false,
            point_pause: 1.5,
            out_of_bounds_margin: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}
impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, -4.3],
            look_at: [0.0, 0.8, 0.5],
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// sRGB clear color.
    pub background: [f32; 3],
    pub ambient_brightness: f32,
    pub directional_illuminance: f32,
    pub directional_position: [f32; 3],
    pub shadows: bool,
}
impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            background: [0.96, 0.96, 0.96],
            ambient_brightness: 400.0,
            directional_illuminance: 6000.0,
            directional_position: [5.0, 5.0, 5.0],
            shadows: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Seconds between stats log lines. 0.0 disables the periodic log.
    pub log_interval: f32,
    pub rapier_debug: bool,
}
impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_interval: 1.0,
            rapier_debug: false,
        }
    }
}

/// Values set on the command line. Re-applied on top of every (re)loaded config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub auto_close: Option<f32>,
    pub rapier_debug: bool,
    pub near: Option<ControllerDriver>,
    pub far: Option<ControllerDriver>,
}

impl ConfigOverrides {
    pub fn apply(&self, cfg: &mut GameConfig) {
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(secs) = self.auto_close {
            cfg.window.auto_close = secs;
        }
        if self.rapier_debug {
            cfg.debug.rapier_debug = true;
        }
        if let Some(d) = self.near {
            cfg.controllers.near = d;
        }
        if let Some(d) = self.far {
            cfg.controllers.far = d;
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub room: RoomConfig,
    pub table: TableConfig,
    pub net: NetConfig,
    pub ball: BallConfig,
    pub paddle: PaddleConfig,
    pub hit: HitConfig,
    pub controllers: ControllerConfig,
    pub rules: RulesConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub debug: DebugConfig,
    pub seed: u64,
}

impl GameConfig {
    /// Load from a single RON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        ron::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load file; on failure returns default config plus the error.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<ConfigError>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load multiple layers; later overrides earlier (deep merge).
    /// Skips missing files; returns (config, used_paths, errors).
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();

        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let mut pending = Some(v);
                        if let Some((_, existing)) = bm.iter_mut().find(|(ek, _)| **ek == k) {
                            if let Some(v) = pending.take() {
                                merge_value(existing, v);
                            }
                        }
                        if let Some(v) = pending {
                            bm.insert(k, v);
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }

        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.display().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }

        match merged {
            Some(val) => match val.into_rust::<GameConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    (GameConfig::default(), used, errors)
                }
            },
            None => (GameConfig::default(), used, errors),
        }
    }

    /// Ball serve position for the side whose Z sign is `side_sign` (-1 near, +1 far).
    pub fn serve_position(&self, side_sign: f32) -> [f32; 3] {
        [
            0.0,
            self.table.top_height + self.ball.serve_height,
            side_sign.signum() * self.ball.serve_distance,
        ]
    }

    /// Paddle rest position for the side whose Z sign is `side_sign`.
    pub fn paddle_home(&self, side_sign: f32) -> [f32; 3] {
        [
            0.0,
            self.table.top_height + self.paddle.home_height,
            side_sign.signum() * self.paddle.home_distance,
        ]
    }

    /// Produce validation warnings (non-fatal) for suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        } else if self.window.auto_close > 0.0 && self.window.auto_close < 0.01 {
            w.push(format!(
                "window.autoClose {} very small; closes almost immediately",
                self.window.auto_close
            ));
        }

        let ph = &self.physics;
        if ph.gravity_y.abs() < 1e-4 {
            w.push("physics.gravity_y magnitude near zero; ball will float".into());
        }
        if ph.gravity_y > 0.0 {
            w.push(format!(
                "physics.gravity_y is positive ({}); typical configs use negative for downward",
                ph.gravity_y
            ));
        }
        if !(ph.timestep > 0.0 && ph.timestep <= 0.1) {
            w.push(format!("physics.timestep {} outside (0, 0.1]", ph.timestep));
        }
        if ph.substeps == 0 {
            w.push("physics.substeps is 0; simulation will not advance".into());
        }

        let room = &self.room;
        if room.width <= 0.0 || room.height <= 0.0 || room.depth <= 0.0 {
            w.push("room dimensions must be > 0".into());
        }
        let t = &self.table;
        if t.width <= 0.0 || t.length <= 0.0 || t.thickness <= 0.0 {
            w.push("table dimensions must be > 0".into());
        }
        if t.width > room.width || t.length > room.depth {
            w.push(format!(
                "table {}x{} does not fit room {}x{}",
                t.width, t.length, room.width, room.depth
            ));
        }
        if t.top_height < t.thickness {
            w.push(format!(
                "table.top_height {} below table thickness {}; slab intersects the floor",
                t.top_height, t.thickness
            ));
        }
        if t.top_height + self.net.height >= room.height {
            w.push("net top reaches the ceiling".into());
        }
        if self.net.height <= 0.0 {
            w.push("net.height must be > 0".into());
        }

        fn check_restitution(w: &mut Vec<String>, label: &str, value: f32) {
            if !(0.0..=1.5).contains(&value) {
                w.push(format!("{label} {value} outside recommended 0..1.5"));
            }
        }
        check_restitution(&mut w, "table.restitution", t.restitution);
        check_restitution(&mut w, "net.restitution", self.net.restitution);
        check_restitution(&mut w, "ball.restitution", self.ball.restitution);
        check_restitution(&mut w, "hit.restitution", self.hit.restitution);

        let b = &self.ball;
        if b.radius <= 0.0 {
            w.push("ball.radius must be > 0".into());
        }
        if b.serve_distance <= 0.0 || b.serve_distance > t.half_length() {
            w.push(format!(
                "ball.serve_distance {} places the serve off the table (half length {})",
                b.serve_distance,
                t.half_length()
            ));
        }
        if b.max_speed <= 0.0 {
            w.push("ball.max_speed must be > 0".into());
        }

        let p = &self.paddle;
        if p.blade_radius <= b.radius {
            w.push(format!(
                "paddle.blade_radius {} not larger than ball.radius {}",
                p.blade_radius, b.radius
            ));
        }
        if p.home_distance > room.depth * 0.5 {
            w.push(format!(
                "paddle.home_distance {} outside the room (half depth {})",
                p.home_distance,
                room.depth * 0.5
            ));
        }
        if !(-80.0..=80.0).contains(&p.tilt_deg) {
            w.push(format!("paddle.tilt_deg {} outside -80..80", p.tilt_deg));
        }

        let h = &self.hit;
        if h.margin < 0.0 {
            w.push("hit.margin negative".into());
        }
        if h.cooldown < 0.0 {
            w.push("hit.cooldown negative".into());
        }
        if h.min_return_speed > b.max_speed {
            w.push(format!(
                "hit.min_return_speed {} exceeds ball.max_speed {}",
                h.min_return_speed, b.max_speed
            ));
        }

        let c = &self.controllers;
        if c.move_speed <= 0.0 {
            w.push("controllers.move_speed must be > 0".into());
        }
        if c.bot_speed <= 0.0
            && (c.near == ControllerDriver::Bot || c.far == ControllerDriver::Bot)
        {
            w.push("controllers.bot_speed must be > 0 when a bot drives a paddle".into());
        }

        let r = &self.rules;
        if r.points_to_win == 0 {
            w.push("rules.points_to_win is 0; every match ends immediately".into());
        }
        if r.win_by == 0 {
            w.push("rules.win_by is 0; treated as 1".into());
        }
        if r.serves_per_turn == 0 {
            w.push("rules.serves_per_turn is 0; treated as 1".into());
        }
        if r.point_pause < 0.0 {
            w.push("rules.point_pause negative".into());
        }

        if self.camera.fov_deg <= 0.0 || self.camera.fov_deg >= 180.0 {
            w.push(format!("camera.fov_deg {} outside (0, 180)", self.camera.fov_deg));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            w.push("camera near/far planes invalid".into());
        }
        if self.debug.log_interval < 0.0 {
            w.push("debug.log_interval negative -> periodic log disabled".into());
        }
        w
    }
}
