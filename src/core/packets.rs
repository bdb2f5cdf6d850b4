//! Packet stream: short-lived markers travelling between nodes
//!
//! A packet refers to its source and target by node index. The nodes are
//! never owned by the packet, so completing a packet only releases the
//! packet's own material.

use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::{debug, trace};

use super::geometry::{Geometry, Material};
use super::nodes::Node;
use super::resources::{ResourceId, ResourceKind, ResourceRegistry};
use crate::config::PacketConfig;

/// One packet in flight
#[derive(Clone, Debug)]
pub struct Packet {
    pub source: usize,
    pub target: usize,
    /// Fraction of the trip completed, in [0, 1) while live
    pub progress: f32,
    pub speed: f32,
    pub position: Vec3,
    pub rotation: Vec2,
    pub material: ResourceId,
}

/// Capped collection of live packets sharing one cube geometry
#[derive(Debug)]
pub struct PacketStream {
    packets: Vec<Packet>,
    cap: usize,
    spawn_probability: f32,
    min_speed: f32,
    max_speed: f32,
    rotation_step: f32,
    geometry: Geometry,
    geometry_id: ResourceId,
    material: Material,
    /// Total packets created
    spawned: u64,
    /// Total packets that reached their target
    completed: u64,
    /// Spawn requests refused by the cap
    dropped: u64,
}

impl PacketStream {
    pub fn new(config: &PacketConfig, resources: &mut ResourceRegistry) -> Self {
        Self {
            packets: Vec::with_capacity(config.cap.min(1024)),
            cap: config.cap,
            spawn_probability: config.spawn_probability,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            rotation_step: config.rotation_step,
            geometry: Geometry::cuboid(config.size),
            geometry_id: resources.allocate(ResourceKind::PacketGeometry),
            material: Material::PACKET,
            spawned: 0,
            completed: 0,
            dropped: 0,
        }
    }

    /// Create one packet between two uniformly chosen nodes.
    /// Source and target may coincide. Returns false when the stream is at
    /// its cap or there are no nodes; the request is dropped silently.
    pub fn spawn<R: Rng>(
        &mut self,
        nodes: &[Node],
        rng: &mut R,
        resources: &mut ResourceRegistry,
    ) -> bool {
        if nodes.is_empty() {
            return false;
        }
        if self.packets.len() >= self.cap {
            self.dropped += 1;
            trace!(live = self.packets.len(), cap = self.cap, "packet spawn dropped");
            return false;
        }

        let source = rng.gen_range(0..nodes.len());
        let target = rng.gen_range(0..nodes.len());
        let speed = rng.gen_range(self.min_speed..=self.max_speed);

        self.packets.push(Packet {
            source,
            target,
            progress: 0.0,
            speed,
            position: nodes[source].position,
            rotation: Vec2::ZERO,
            material: resources.allocate(ResourceKind::PacketMaterial),
        });
        self.spawned += 1;
        trace!(source, target, speed, "packet spawned");
        true
    }

    /// Spawn with the configured per-frame probability
    pub fn maybe_spawn<R: Rng>(
        &mut self,
        nodes: &[Node],
        rng: &mut R,
        resources: &mut ResourceRegistry,
    ) -> bool {
        if rng.gen::<f32>() < self.spawn_probability {
            self.spawn(nodes, rng, resources)
        } else {
            false
        }
    }

    /// Advance every packet one frame. Packets reaching the target are
    /// removed and their material released. Returns how many completed.
    pub fn advance(&mut self, nodes: &[Node], resources: &mut ResourceRegistry) -> usize {
        let rotation_step = self.rotation_step;
        let before = self.packets.len();

        self.packets.retain_mut(|packet| {
            packet.progress += packet.speed;
            if packet.progress >= 1.0 {
                resources.release(packet.material);
                return false;
            }

            // Both endpoints keep moving, so interpolate between current positions
            if let (Some(from), Some(to)) = (nodes.get(packet.source), nodes.get(packet.target)) {
                packet.position = from.position.lerp(to.position, packet.progress);
            }
            packet.rotation += Vec2::splat(rotation_step);
            true
        });

        let completed = before - self.packets.len();
        self.completed += completed as u64;
        completed
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn material(&self) -> Material {
        self.material
    }

    /// Release all packet materials and the shared geometry
    pub fn release(&mut self, resources: &mut ResourceRegistry) -> usize {
        let mut released = 0;
        for packet in self.packets.drain(..) {
            released += resources.release(packet.material) as usize;
        }
        released += resources.release(self.geometry_id) as usize;
        if released > 0 {
            debug!(released, "packet resources released");
        }
        released
    }
}
