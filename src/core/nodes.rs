//! Node field: a fixed population of drifting markers
//!
//! Nodes are created once and never added or removed afterwards. Each one
//! owns its material; the octahedron geometry is shared.

use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::debug;

use super::geometry::{Geometry, Material};
use super::resources::{ResourceId, ResourceKind, ResourceRegistry};
use crate::config::NodeConfig;

/// One drifting marker
#[derive(Clone, Debug)]
pub struct Node {
    /// Fixed index, also the phase offset of the pulse
    pub index: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler rotation around x and y
    pub rotation: Vec2,
    pub scale: f32,
    pub material: ResourceId,
}

/// Fixed-size set of nodes sharing one geometry
#[derive(Debug)]
pub struct NodeField {
    nodes: Vec<Node>,
    half_extents: Vec3,
    rotation_step: f32,
    pulse_amplitude: f32,
    pulse_frequency: f32,
    geometry: Geometry,
    geometry_id: ResourceId,
    material: Material,
}

impl NodeField {
    /// Create `config.count` nodes with uniform random positions and velocities
    pub fn populate<R: Rng>(
        config: &NodeConfig,
        rng: &mut R,
        resources: &mut ResourceRegistry,
    ) -> Self {
        let half_extents = Vec3::from(config.half_extents);
        let geometry_id = resources.allocate(ResourceKind::NodeGeometry);

        let nodes: Vec<Node> = (0..config.count)
            .map(|index| Node {
                index,
                position: random_in_box(rng, half_extents),
                velocity: random_in_box(rng, Vec3::splat(config.max_speed)),
                rotation: Vec2::ZERO,
                scale: 1.0,
                material: resources.allocate(ResourceKind::NodeMaterial),
            })
            .collect();

        debug!(count = nodes.len(), ?half_extents, "node field populated");

        Self {
            nodes,
            half_extents,
            rotation_step: config.rotation_step,
            pulse_amplitude: config.pulse_amplitude,
            pulse_frequency: config.pulse_frequency,
            geometry: Geometry::octahedron(config.radius),
            geometry_id,
            material: Material::NODE,
        }
    }

    /// Advance every node by one frame at accumulated time `time`
    pub fn update(&mut self, time: f64) {
        let bounds = self.half_extents.to_array();
        for node in &mut self.nodes {
            node.position += node.velocity;

            // Reflect each axis independently once it leaves the box
            let position = node.position.to_array();
            let mut velocity = node.velocity.to_array();
            for axis in 0..3 {
                if position[axis].abs() > bounds[axis] {
                    velocity[axis] = -velocity[axis];
                }
            }
            node.velocity = Vec3::from(velocity);

            node.rotation += Vec2::splat(self.rotation_step);
            let phase = time * f64::from(self.pulse_frequency) + node.index as f64;
            node.scale = 1.0 + phase.sin() as f32 * self.pulse_amplitude;
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn material(&self) -> Material {
        self.material
    }

    /// Release every node material and the shared geometry.
    /// Returns how many resources were actually released.
    pub fn release(&mut self, resources: &mut ResourceRegistry) -> usize {
        let mut released = self
            .nodes
            .iter()
            .filter(|node| resources.release(node.material))
            .count();
        if resources.release(self.geometry_id) {
            released += 1;
        }
        released
    }
}

/// Uniform point in the box `[-half, half]` on each axis
fn random_in_box<R: Rng>(rng: &mut R, half: Vec3) -> Vec3 {
    Vec3::new(
        rng.gen_range(-half.x..=half.x),
        rng.gen_range(-half.y..=half.y),
        rng.gen_range(-half.z..=half.z),
    )
}
