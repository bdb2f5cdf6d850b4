//! Scene configuration
//!
//! Every group deserializes with defaults, so a partial JSON document only
//! overrides the keys it names. The browser reads `window.__net_scene_config`,
//! the CLI reads the file named by `NET_SCENE_CONFIG`.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Slowest packet speed accepted; progress must move forward every frame
pub const MIN_PACKET_SPEED: f32 = 0.001;

/// Top-level configuration for one animated scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Fixed RNG seed; `None` draws from entropy
    pub seed: Option<u64>,
    /// Simulation time added per frame
    pub time_step: f64,
    /// Exponential-squared fog density (fog colour is black)
    pub fog_density: f32,
    pub nodes: NodeConfig,
    pub connections: ConnectionConfig,
    pub packets: PacketConfig,
    pub camera: CameraConfig,
    pub hud: HudConfig,
    pub overlay: OverlayConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: None,
            time_step: 0.01,
            fog_density: 0.005,
            nodes: NodeConfig::default(),
            connections: ConnectionConfig::default(),
            packets: PacketConfig::default(),
            camera: CameraConfig::default(),
            hud: HudConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub count: usize,
    /// Bounding box half extents (x, y, z)
    pub half_extents: [f32; 3],
    /// Per-axis velocity bound
    pub max_speed: f32,
    pub rotation_step: f32,
    pub pulse_amplitude: f32,
    pub pulse_frequency: f32,
    /// Octahedron radius
    pub radius: f32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            count: 50,
            half_extents: [60.0, 30.0, 30.0],
            max_speed: 0.05,
            rotation_step: 0.01,
            pulse_amplitude: 0.2,
            pulse_frequency: 5.0,
            radius: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Pairs strictly closer than this are connected
    pub threshold: f32,
    /// Minimum simulation time between two rebuilds
    pub rebuild_interval: f64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            threshold: 25.0,
            rebuild_interval: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketConfig {
    /// Maximum live packets; spawns beyond it are dropped
    pub cap: usize,
    pub spawn_probability: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub rotation_step: f32,
    /// Cube edge length
    pub size: f32,
    /// Packets spawned during initialisation
    pub initial_count: usize,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            cap: 200,
            spawn_probability: 0.3,
            min_speed: 0.015,
            max_speed: 0.04,
            rotation_step: 0.1,
            size: 0.4,
            initial_count: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub start: [f32; 3],
    /// Orbit amplitude on (x, y)
    pub orbit_amplitude: [f32; 2],
    /// Orbit angular frequency on (x, y)
    pub orbit_frequency: [f32; 2],
    pub orbit_z: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            start: [0.0, 0.0, 80.0],
            orbit_amplitude: [50.0, 20.0],
            orbit_frequency: [0.2, 0.15],
            orbit_z: 80.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub refresh_ms: u32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self { refresh_ms: 100 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub spawn_ms: u32,
    /// Maximum live floating-text elements
    pub cap: usize,
    pub ttl_secs: f64,
    /// Upper bound of the random animation delay
    pub max_delay_secs: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            spawn_ms: 100,
            cap: 50,
            ttl_secs: 5.0,
            max_delay_secs: 5.0,
        }
    }
}

impl SceneConfig {
    /// Parse a (possibly partial) JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp values that would make the simulation misbehave or panic
    pub fn sanitized(mut self) -> Self {
        let defaults = SceneConfig::default();

        if !(self.time_step > 0.0) {
            warn!(time_step = self.time_step, "time_step must be positive, using default");
            self.time_step = defaults.time_step;
        }
        if self.fog_density < 0.0 {
            warn!(fog_density = self.fog_density, "negative fog density, disabling fog");
            self.fog_density = 0.0;
        }

        for extent in &mut self.nodes.half_extents {
            if *extent < 0.0 {
                warn!(extent = *extent, "negative half extent, using its magnitude");
                *extent = extent.abs();
            }
        }
        self.nodes.max_speed = self.nodes.max_speed.abs();

        if !(self.connections.rebuild_interval > 0.0) {
            warn!(
                rebuild_interval = self.connections.rebuild_interval,
                "connections.rebuild_interval must be positive, using default"
            );
            self.connections.rebuild_interval = defaults.connections.rebuild_interval;
        }

        if !(0.0..=1.0).contains(&self.packets.spawn_probability) {
            warn!(
                spawn_probability = self.packets.spawn_probability,
                "spawn probability outside [0, 1], clamping"
            );
            self.packets.spawn_probability = self.packets.spawn_probability.clamp(0.0, 1.0);
        }
        if self.packets.min_speed > self.packets.max_speed {
            warn!(
                min_speed = self.packets.min_speed,
                max_speed = self.packets.max_speed,
                "inverted packet speed range, swapping"
            );
            std::mem::swap(&mut self.packets.min_speed, &mut self.packets.max_speed);
        }
        for speed in [&mut self.packets.min_speed, &mut self.packets.max_speed] {
            if !(*speed >= MIN_PACKET_SPEED) {
                warn!(
                    speed = *speed,
                    floor = MIN_PACKET_SPEED,
                    "packet speed below floor, clamping"
                );
                *speed = MIN_PACKET_SPEED;
            }
        }

        if self.hud.refresh_ms == 0 {
            warn!("hud.refresh_ms is zero, using default");
            self.hud.refresh_ms = defaults.hud.refresh_ms;
        }
        if self.overlay.spawn_ms == 0 {
            warn!("overlay.spawn_ms is zero, using default");
            self.overlay.spawn_ms = defaults.overlay.spawn_ms;
        }
        if self.overlay.max_delay_secs < 0.0 {
            warn!(
                max_delay_secs = self.overlay.max_delay_secs,
                "negative overlay delay, using zero"
            );
            self.overlay.max_delay_secs = 0.0;
        }

        self
    }
}
