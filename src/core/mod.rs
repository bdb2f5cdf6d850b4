//! Platform-agnostic core module - shared between the browser scene and CLI

pub mod animator;
pub mod connections;
pub mod geometry;
pub mod hud;
pub mod nodes;
pub mod overlay;
pub mod packets;
pub mod render;
pub mod resources;
pub mod stage;
pub mod stats;

pub use animator::{Animator, LoopControl, TeardownReport};
pub use hud::{refresh_hud, HudSlot, TextSlots};
pub use overlay::{FloatingText, FloatingTextSet, Spawned, TextId};
pub use render::{FrameSummary, HeadlessRenderer, SceneRenderer, SceneView};
pub use resources::{ResourceId, ResourceKind, ResourceRegistry};
pub use stage::{Stage, Viewport};
pub use stats::{SharedStats, StatsSnapshot};
