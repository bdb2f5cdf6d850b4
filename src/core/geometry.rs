//! Shared mesh shapes and material descriptors

use glam::Vec3;

/// Vertex/edge/face description of a small mesh.
/// Edges drive wireframe drawing, faces drive solid fills.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub vertices: Vec<Vec3>,
    pub edges: Vec<(usize, usize)>,
    pub faces: Vec<Vec<usize>>,
}

/// Index lists a renderer walks for one mesh
#[derive(Clone, Copy, Debug)]
pub enum Primitives<'a> {
    Edges(&'a [(usize, usize)]),
    Faces(&'a [Vec<usize>]),
}

impl Geometry {
    /// Edges for wireframe materials, faces otherwise
    pub fn primitives(&self, material: Material) -> Primitives<'_> {
        if material.wireframe {
            Primitives::Edges(&self.edges)
        } else {
            Primitives::Faces(&self.faces)
        }
    }

    /// Regular octahedron with vertices on the axes at `radius`
    pub fn octahedron(radius: f32) -> Self {
        let vertices = vec![
            Vec3::new(radius, 0.0, 0.0),
            Vec3::new(-radius, 0.0, 0.0),
            Vec3::new(0.0, radius, 0.0),
            Vec3::new(0.0, -radius, 0.0),
            Vec3::new(0.0, 0.0, radius),
            Vec3::new(0.0, 0.0, -radius),
        ];
        // every axis vertex joins the four that are not its opposite
        let mut edges = Vec::with_capacity(12);
        for a in 0..6 {
            for b in (a + 1)..6 {
                if a / 2 != b / 2 {
                    edges.push((a, b));
                }
            }
        }
        let mut faces = Vec::with_capacity(8);
        for &x in &[0, 1] {
            for &y in &[2, 3] {
                for &z in &[4, 5] {
                    faces.push(vec![x, y, z]);
                }
            }
        }
        Self {
            vertices,
            edges,
            faces,
        }
    }

    /// Axis-aligned cube centred on the origin
    pub fn cuboid(edge: f32) -> Self {
        let h = edge * 0.5;
        let vertices = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        let edges = vec![
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        let faces = vec![
            vec![0, 1, 2, 3],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![2, 3, 7, 6],
            vec![1, 2, 6, 5],
            vec![0, 3, 7, 4],
        ];
        Self {
            vertices,
            edges,
            faces,
        }
    }
}

/// Flat-colour material: `0xRRGGBB` plus opacity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: u32,
    pub opacity: f32,
    pub wireframe: bool,
}

impl Material {
    pub const NODE: Material = Material {
        color: 0x00ff00,
        opacity: 0.8,
        wireframe: true,
    };

    pub const CONNECTION: Material = Material {
        color: 0x00ff00,
        opacity: 0.2,
        wireframe: false,
    };

    pub const PACKET: Material = Material {
        color: 0x00ffff,
        opacity: 0.8,
        wireframe: false,
    };

    /// Split into (r, g, b) bytes
    pub fn rgb(&self) -> [u8; 3] {
        [
            ((self.color >> 16) & 0xff) as u8,
            ((self.color >> 8) & 0xff) as u8,
            (self.color & 0xff) as u8,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octahedron_shape() {
        let geo = Geometry::octahedron(2.0);
        assert_eq!(geo.vertices.len(), 6);
        assert_eq!(geo.edges.len(), 12);
        assert_eq!(geo.faces.len(), 8);

        // No edge joins opposite vertices (they are 2·radius apart)
        for &(a, b) in &geo.edges {
            let len = geo.vertices[a].distance(geo.vertices[b]);
            assert!((len - 2.0 * 2.0_f32.sqrt()).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cuboid_shape() {
        let geo = Geometry::cuboid(0.4);
        assert_eq!(geo.vertices.len(), 8);
        assert_eq!(geo.edges.len(), 12);
        assert_eq!(geo.faces.len(), 6);
        for &(a, b) in &geo.edges {
            assert!((geo.vertices[a].distance(geo.vertices[b]) - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_primitives_follow_material() {
        let node = Geometry::octahedron(2.0);
        match node.primitives(Material::NODE) {
            Primitives::Edges(edges) => assert_eq!(edges.len(), 12),
            Primitives::Faces(_) => panic!("node material is wireframe"),
        }

        let packet = Geometry::cuboid(0.4);
        match packet.primitives(Material::PACKET) {
            Primitives::Faces(faces) => assert_eq!(faces.len(), 6),
            Primitives::Edges(_) => panic!("packet material is solid"),
        }
    }

    #[test]
    fn test_material_rgb() {
        assert_eq!(Material::NODE.rgb(), [0, 255, 0]);
        assert_eq!(Material::PACKET.rgb(), [0, 255, 255]);
    }
}
