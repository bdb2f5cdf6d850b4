//! Render seam
//!
//! The animator issues exactly one `render` call per frame with a borrowed
//! view of the scene. The browser implements the trait with an egui painter;
//! the CLI and tests use `HeadlessRenderer`.

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::connections::ConnectionGraph;
use super::nodes::NodeField;
use super::packets::PacketStream;
use super::stage::{project_with, Stage};

/// Borrowed view of everything a renderer needs for one frame
pub struct SceneView<'a> {
    pub stage: &'a Stage,
    pub nodes: &'a NodeField,
    pub connections: &'a ConnectionGraph,
    pub packets: &'a PacketStream,
}

impl SceneView<'_> {
    /// Model matrix of node `index`
    pub fn node_transform(&self, index: usize) -> Option<Mat4> {
        self.nodes.nodes().get(index).map(|node| {
            Mat4::from_scale_rotation_translation(
                Vec3::splat(node.scale),
                Quat::from_euler(EulerRot::XYZ, node.rotation.x, node.rotation.y, 0.0),
                node.position,
            )
        })
    }

    /// Model matrix of packet `index`
    pub fn packet_transform(&self, index: usize) -> Option<Mat4> {
        self.packets.packets().get(index).map(|packet| {
            Mat4::from_rotation_translation(
                Quat::from_euler(EulerRot::XYZ, packet.rotation.x, packet.rotation.y, 0.0),
                packet.position,
            )
        })
    }

    /// Distance from the camera, used for fog
    #[inline]
    pub fn eye_distance(&self, world: Vec3) -> f32 {
        self.stage.camera.position.distance(world)
    }
}

/// Receives one call per frame
pub trait SceneRenderer {
    fn render(&mut self, view: &SceneView<'_>);
}

/// What the last headless render saw
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub visible_nodes: usize,
    pub visible_segments: usize,
    pub visible_packets: usize,
}

/// Renderer without an output device: projects every entity and counts what
/// lands inside the view volume
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub render_calls: u64,
    pub last: FrameSummary,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_view(ndc: Option<Vec3>) -> bool {
    ndc.is_some_and(|p| p.x.abs() <= 1.0 && p.y.abs() <= 1.0 && p.z.abs() <= 1.0)
}

impl SceneRenderer for HeadlessRenderer {
    fn render(&mut self, view: &SceneView<'_>) {
        let camera = &view.stage.camera;
        let vp = camera.view_projection();
        let near = camera.near;

        let visible_nodes = view
            .nodes
            .nodes()
            .iter()
            .filter(|n| in_view(project_with(&vp, near, n.position)))
            .count();
        let visible_segments = view
            .connections
            .connections()
            .iter()
            .filter(|c| c.endpoints.iter().any(|&p| in_view(project_with(&vp, near, p))))
            .count();
        let visible_packets = view
            .packets
            .packets()
            .iter()
            .filter(|p| in_view(project_with(&vp, near, p.position)))
            .count();

        self.render_calls += 1;
        self.last = FrameSummary {
            visible_nodes,
            visible_segments,
            visible_packets,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::core::{Animator, Viewport};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn animator() -> Animator {
        Animator::with_rng(
            SceneConfig::default(),
            Viewport::default(),
            StdRng::seed_from_u64(11),
        )
    }

    #[test]
    fn test_transforms_follow_entities() {
        let animator = animator();
        let view = animator.view();

        let node = &view.nodes.nodes()[0];
        let model = view.node_transform(0).unwrap();
        assert!(model.transform_point3(Vec3::ZERO).distance(node.position) < 1e-4);
        assert!(view.node_transform(view.nodes.len()).is_none());

        let packet = &view.packets.packets()[0];
        let model = view.packet_transform(0).unwrap();
        assert!(model.transform_point3(Vec3::ZERO).distance(packet.position) < 1e-4);
        assert!(view.packet_transform(view.packets.len()).is_none());
    }

    #[test]
    fn test_headless_counts_within_totals() {
        let mut animator = animator();
        let mut renderer = HeadlessRenderer::new();

        animator.frame(&mut renderer);

        assert_eq!(renderer.render_calls, 1);
        let view = animator.view();
        assert!(renderer.last.visible_nodes <= view.nodes.len());
        assert!(renderer.last.visible_segments <= view.connections.len());
        assert!(renderer.last.visible_packets <= view.packets.len());
        // Camera starts on the z axis looking at the middle of the box
        assert!(renderer.last.visible_nodes > 0);
    }
}
