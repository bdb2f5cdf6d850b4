//! CPU scene rendering through the egui painter

use eframe::egui;
use glam::Vec3;

use crate::core::geometry::{Geometry, Material, Primitives};
use crate::core::render::{SceneRenderer, SceneView};
use crate::core::stage::project_with;
use crate::theme::material_color;

/// Draws one frame of the scene into a painter rect
pub struct PainterRenderer<'a> {
    painter: &'a egui::Painter,
    rect: egui::Rect,
}

impl<'a> PainterRenderer<'a> {
    pub fn new(painter: &'a egui::Painter, rect: egui::Rect) -> Self {
        Self { painter, rect }
    }

    /// NDC to screen position inside the rect (y up in NDC, down on screen)
    fn to_screen(&self, ndc: Vec3) -> egui::Pos2 {
        let center = self.rect.center();
        egui::pos2(
            center.x + ndc.x * self.rect.width() * 0.5,
            center.y - ndc.y * self.rect.height() * 0.5,
        )
    }

    /// Stroke the edges of a wireframe material, fill the faces of a solid one.
    /// Primitives with a vertex behind the camera are skipped.
    fn draw_mesh(
        &self,
        geometry: &Geometry,
        material: Material,
        color: egui::Color32,
        project: impl Fn(Vec3) -> Option<egui::Pos2>,
    ) {
        let screen: Vec<Option<egui::Pos2>> =
            geometry.vertices.iter().map(|&v| project(v)).collect();
        match geometry.primitives(material) {
            Primitives::Edges(edges) => {
                let stroke = egui::Stroke::new(1.0, color);
                for &(a, b) in edges {
                    if let (Some(pa), Some(pb)) = (screen[a], screen[b]) {
                        self.painter.line_segment([pa, pb], stroke);
                    }
                }
            }
            Primitives::Faces(faces) => {
                for face in faces {
                    let points: Option<Vec<egui::Pos2>> =
                        face.iter().map(|&v| screen[v]).collect();
                    if let Some(points) = points {
                        self.painter.add(egui::Shape::convex_polygon(
                            points,
                            color,
                            egui::Stroke::NONE,
                        ));
                    }
                }
            }
        }
    }

    fn color(&self, view: &SceneView<'_>, material: Material, world: Vec3) -> egui::Color32 {
        let visibility = view.stage.fog.visibility(view.eye_distance(world));
        material_color(material, visibility)
    }
}

impl SceneRenderer for PainterRenderer<'_> {
    fn render(&mut self, view: &SceneView<'_>) {
        let camera = &view.stage.camera;
        let vp = camera.view_projection();
        let near = camera.near;
        let project = |world: Vec3| {
            let ndc = project_with(&vp, near, world)?;
            Some(self.to_screen(ndc))
        };

        // Connections first so nodes and packets draw over them
        let line_material = view.connections.material();
        for connection in view.connections.connections() {
            let [a, b] = connection.endpoints;
            if let (Some(pa), Some(pb)) = (project(a), project(b)) {
                let color = self.color(view, line_material, (a + b) * 0.5);
                self.painter
                    .line_segment([pa, pb], egui::Stroke::new(1.0, color));
            }
        }

        // Node octahedra, then packet cubes
        let node_geometry = view.nodes.geometry();
        let node_material = view.nodes.material();
        for (i, node) in view.nodes.nodes().iter().enumerate() {
            let Some(model) = view.node_transform(i) else {
                continue;
            };
            let color = self.color(view, node_material, node.position);
            self.draw_mesh(node_geometry, node_material, color, |v| {
                project(model.transform_point3(v))
            });
        }

        let packet_geometry = view.packets.geometry();
        let packet_material = view.packets.material();
        for (i, packet) in view.packets.packets().iter().enumerate() {
            let Some(model) = view.packet_transform(i) else {
                continue;
            };
            let color = self.color(view, packet_material, packet.position);
            self.draw_mesh(packet_geometry, packet_material, color, |v| {
                project(model.transform_point3(v))
            });
        }
    }
}
