//! Connection graph: proximity edges between nodes
//!
//! The edge set is a pure function of node positions and the threshold. It is
//! never patched incrementally; each rebuild releases every segment resource
//! and rescans all pairs.

use glam::Vec3;
use tracing::debug;

use super::geometry::Material;
use super::nodes::Node;
use super::resources::{ResourceId, ResourceKind, ResourceRegistry};
use crate::config::ConnectionConfig;

/// Line segment between two nodes, endpoints frozen at rebuild time
#[derive(Clone, Debug)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub endpoints: [Vec3; 2],
    pub geometry: ResourceId,
    pub material: ResourceId,
}

/// All unordered pairs `(i, j)`, `i < j`, strictly closer than `threshold`
pub fn proximity_pairs(positions: &[Vec3], threshold: f32) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if positions[i].distance(positions[j]) < threshold {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Throttled, wholesale-rebuilt set of connections
#[derive(Debug)]
pub struct ConnectionGraph {
    connections: Vec<Connection>,
    threshold: f32,
    rebuild_interval: f64,
    /// Simulation time of the last rebuild
    last_rebuild: Option<f64>,
    rebuilds: u64,
    material: Material,
}

impl ConnectionGraph {
    pub fn new(config: &ConnectionConfig) -> Self {
        Self {
            connections: Vec::new(),
            threshold: config.threshold,
            rebuild_interval: config.rebuild_interval,
            last_rebuild: None,
            rebuilds: 0,
            material: Material::CONNECTION,
        }
    }

    /// Release all current segments and rebuild from the node positions
    pub fn rebuild(&mut self, time: f64, nodes: &[Node], resources: &mut ResourceRegistry) {
        self.release_segments(resources);

        let positions: Vec<Vec3> = nodes.iter().map(|n| n.position).collect();
        self.connections = proximity_pairs(&positions, self.threshold)
            .into_iter()
            .map(|(a, b)| Connection {
                a,
                b,
                endpoints: [positions[a], positions[b]],
                geometry: resources.allocate(ResourceKind::ConnectionGeometry),
                material: resources.allocate(ResourceKind::ConnectionMaterial),
            })
            .collect();

        self.last_rebuild = Some(time);
        self.rebuilds += 1;
        debug!(
            time,
            edges = self.connections.len(),
            rebuilds = self.rebuilds,
            "connections rebuilt"
        );
    }

    /// Whether enough simulation time has passed for another rebuild
    pub fn is_due(&self, time: f64) -> bool {
        match self.last_rebuild {
            None => true,
            Some(last) => time - last >= self.rebuild_interval,
        }
    }

    /// Rebuild if the throttle interval has elapsed. Returns true if it did.
    pub fn maybe_rebuild(
        &mut self,
        time: f64,
        nodes: &[Node],
        resources: &mut ResourceRegistry,
    ) -> bool {
        if !self.is_due(time) {
            return false;
        }
        self.rebuild(time, nodes, resources);
        true
    }

    fn release_segments(&mut self, resources: &mut ResourceRegistry) -> usize {
        let mut released = 0;
        for connection in self.connections.drain(..) {
            released += resources.release(connection.geometry) as usize;
            released += resources.release(connection.material) as usize;
        }
        released
    }

    /// Release every segment resource (teardown)
    pub fn release(&mut self, resources: &mut ResourceRegistry) -> usize {
        self.release_segments(resources)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.connections.iter().map(|c| (c.a, c.b))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn material(&self) -> Material {
        self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::core::nodes::NodeField;
    use glam::Vec2;
    use rand::{rngs::StdRng, SeedableRng};

    fn node_at(index: usize, position: Vec3, resources: &mut ResourceRegistry) -> Node {
        Node {
            index,
            position,
            velocity: Vec3::ZERO,
            rotation: Vec2::ZERO,
            scale: 1.0,
            material: resources.allocate(ResourceKind::NodeMaterial),
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let positions = [
            Vec3::ZERO,
            Vec3::new(25.0, 0.0, 0.0),
            Vec3::new(0.0, 24.99, 0.0),
        ];
        let pairs = proximity_pairs(&positions, 25.0);
        // 0-1 exactly at threshold is excluded; 1-2 is ~35 apart
        assert_eq!(pairs, vec![(0, 2)]);
    }

    #[test]
    fn test_edge_set_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut resources = ResourceRegistry::new();
        let mut field = NodeField::populate(&NodeConfig::default(), &mut rng, &mut resources);
        let mut graph = ConnectionGraph::new(&ConnectionConfig::default());

        for step in 0..5 {
            for _ in 0..400 {
                field.update(step as f64);
            }
            graph.rebuild(step as f64 * 2.0, field.nodes(), &mut resources);

            let nodes = field.nodes();
            let mut expected = Vec::new();
            for i in 0..nodes.len() {
                for j in (i + 1)..nodes.len() {
                    if nodes[i].position.distance(nodes[j].position) < 25.0 {
                        expected.push((i, j));
                    }
                }
            }
            let actual: Vec<(usize, usize)> = graph.pairs().collect();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_rebuild_releases_previous_segments() {
        let mut resources = ResourceRegistry::new();
        let nodes = vec![
            node_at(0, Vec3::ZERO, &mut resources),
            node_at(1, Vec3::new(1.0, 0.0, 0.0), &mut resources),
            node_at(2, Vec3::new(2.0, 0.0, 0.0), &mut resources),
        ];
        let mut graph = ConnectionGraph::new(&ConnectionConfig::default());

        graph.rebuild(0.0, &nodes, &mut resources);
        assert_eq!(graph.len(), 3);
        let old: Vec<ResourceId> = graph
            .connections()
            .iter()
            .flat_map(|c| [c.geometry, c.material])
            .collect();

        graph.rebuild(2.0, &nodes, &mut resources);
        assert_eq!(graph.len(), 3);
        assert!(old.iter().all(|&id| !resources.is_live(id)));
        assert_eq!(resources.live_of(ResourceKind::ConnectionGeometry), 3);
        assert_eq!(resources.live_of(ResourceKind::ConnectionMaterial), 3);
    }

    #[test]
    fn test_throttle_uses_simulation_time() {
        let mut resources = ResourceRegistry::new();
        let nodes = vec![node_at(0, Vec3::ZERO, &mut resources)];
        let mut graph = ConnectionGraph::new(&ConnectionConfig::default());

        assert!(graph.maybe_rebuild(0.01, &nodes, &mut resources));
        assert!(!graph.maybe_rebuild(0.5, &nodes, &mut resources));
        assert!(!graph.maybe_rebuild(2.0, &nodes, &mut resources));
        assert!(graph.maybe_rebuild(2.5, &nodes, &mut resources));
        assert_eq!(graph.rebuilds(), 2);
    }

    #[test]
    fn test_endpoints_frozen_until_rebuild() {
        let mut resources = ResourceRegistry::new();
        let mut nodes = vec![
            node_at(0, Vec3::ZERO, &mut resources),
            node_at(1, Vec3::new(3.0, 0.0, 0.0), &mut resources),
        ];
        let mut graph = ConnectionGraph::new(&ConnectionConfig::default());
        graph.rebuild(0.0, &nodes, &mut resources);

        nodes[1].position = Vec3::new(4.0, 0.0, 0.0);
        assert_eq!(graph.connections()[0].endpoints[1], Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_release_all_segments() {
        let mut resources = ResourceRegistry::new();
        let nodes = vec![
            node_at(0, Vec3::ZERO, &mut resources),
            node_at(1, Vec3::new(1.0, 0.0, 0.0), &mut resources),
        ];
        let mut graph = ConnectionGraph::new(&ConnectionConfig::default());
        graph.rebuild(0.0, &nodes, &mut resources);

        assert_eq!(graph.release(&mut resources), 2);
        assert_eq!(graph.release(&mut resources), 0);
        assert!(graph.is_empty());
    }
}
