//! Scene stage: camera, fog and output surface
//!
//! Built once per mount. `resize` is synchronous and idempotent: applying the
//! same viewport twice leaves the stage unchanged.

use glam::{Mat4, Vec3, Vec4};
use tracing::{debug, info};

use super::resources::{ResourceId, ResourceKind, ResourceRegistry};
use crate::config::{CameraConfig, SceneConfig};

/// Logical viewport size plus device pixel ratio
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// Width over height; a collapsed viewport reports 1.0
    pub fn aspect(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Backing-store size in device pixels
    pub fn physical_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio.max(0.0);
        (
            (self.width.max(0.0) * ratio).round() as u32,
            (self.height.max(0.0) * ratio).round() as u32,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 1.0)
    }
}

/// Perspective camera looking at a fixed target
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_degrees: config.fov_degrees,
            near: config.near,
            far: config.far,
            aspect,
            position: Vec3::from(config.start),
            target: Vec3::ZERO,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Project a world point to normalized device coordinates.
    /// Returns `None` for points at or behind the near plane.
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        project_with(&self.view_projection(), self.near, world)
    }
}

/// Project through a precomputed view-projection matrix
#[inline]
pub fn project_with(view_projection: &Mat4, near: f32, world: Vec3) -> Option<Vec3> {
    let clip: Vec4 = *view_projection * world.extend(1.0);
    if clip.w < near {
        return None;
    }
    Some(clip.truncate() / clip.w)
}

/// Exponential-squared distance fog
#[derive(Clone, Copy, Debug)]
pub struct Fog {
    pub color: u32,
    pub density: f32,
}

impl Fog {
    /// Fog contribution in [0, 1] at `distance` from the eye (0 = clear)
    pub fn factor(&self, distance: f32) -> f32 {
        let d = self.density * distance;
        (1.0 - (-(d * d)).exp()).clamp(0.0, 1.0)
    }

    /// Remaining visibility, i.e. `1 - factor`
    pub fn visibility(&self, distance: f32) -> f32 {
        1.0 - self.factor(distance)
    }
}

/// Lissajous-like camera path around the origin
#[derive(Clone, Copy, Debug)]
pub struct Orbit {
    pub amplitude: [f32; 2],
    pub frequency: [f32; 2],
    pub z: f32,
}

impl Orbit {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            amplitude: config.orbit_amplitude,
            frequency: config.orbit_frequency,
            z: config.orbit_z,
        }
    }

    pub fn position_at(&self, time: f64) -> Vec3 {
        let x = (time * f64::from(self.frequency[0])).sin() as f32;
        let y = (time * f64::from(self.frequency[1])).cos() as f32;
        Vec3::new(x * self.amplitude[0], y * self.amplitude[1], self.z)
    }
}

/// Output surface the renderer draws into
#[derive(Clone, Debug)]
pub struct Surface {
    pub resource: ResourceId,
    pub viewport: Viewport,
    /// Device-pixel size of the backing store
    pub physical_size: (u32, u32),
}

/// Everything set up once per mount: fog, camera, orbit and surface
#[derive(Debug)]
pub struct Stage {
    pub fog: Fog,
    pub camera: PerspectiveCamera,
    pub orbit: Orbit,
    pub surface: Surface,
}

impl Stage {
    pub fn new(config: &SceneConfig, viewport: Viewport, resources: &mut ResourceRegistry) -> Self {
        let surface = Surface {
            resource: resources.allocate(ResourceKind::Surface),
            viewport,
            physical_size: viewport.physical_size(),
        };
        info!(
            width = viewport.width,
            height = viewport.height,
            pixel_ratio = viewport.pixel_ratio,
            "stage created"
        );
        Self {
            fog: Fog {
                color: 0x000000,
                density: config.fog_density,
            },
            camera: PerspectiveCamera::new(&config.camera, viewport.aspect()),
            orbit: Orbit::from_config(&config.camera),
            surface,
        }
    }

    /// Recompute camera aspect and surface size for a new viewport
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.surface.viewport {
            return;
        }
        self.camera.set_aspect(viewport.aspect());
        self.surface.viewport = viewport;
        self.surface.physical_size = viewport.physical_size();
        debug!(
            width = viewport.width,
            height = viewport.height,
            physical = ?self.surface.physical_size,
            "stage resized"
        );
    }

    /// Move the camera along the orbit and aim it at the origin
    pub fn follow_orbit(&mut self, time: f64) {
        self.camera.position = self.orbit.position_at(time);
        self.camera.look_at(Vec3::ZERO);
    }

    pub fn release(&mut self, resources: &mut ResourceRegistry) -> bool {
        resources.release(self.surface.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(viewport: Viewport) -> (Stage, ResourceRegistry) {
        let mut resources = ResourceRegistry::new();
        let stage = Stage::new(&SceneConfig::default(), viewport, &mut resources);
        (stage, resources)
    }

    #[test]
    fn test_initial_camera() {
        let (stage, resources) = stage(Viewport::new(800.0, 400.0, 2.0));
        assert_eq!(stage.camera.position, Vec3::new(0.0, 0.0, 80.0));
        assert_eq!(stage.camera.aspect, 2.0);
        assert_eq!(stage.surface.physical_size, (1600, 800));
        assert_eq!(resources.live_of(ResourceKind::Surface), 1);
    }

    #[test]
    fn test_resize_uses_latest_signal() {
        let (mut stage, _) = stage(Viewport::default());

        stage.resize(Viewport::new(1000.0, 500.0, 1.0));
        stage.resize(Viewport::new(300.0, 600.0, 2.0));

        assert_eq!(stage.camera.aspect, 0.5);
        assert_eq!(stage.surface.viewport, Viewport::new(300.0, 600.0, 2.0));
        assert_eq!(stage.surface.physical_size, (600, 1200));

        // Same signal again is a no-op
        stage.resize(Viewport::new(300.0, 600.0, 2.0));
        assert_eq!(stage.camera.aspect, 0.5);
    }

    #[test]
    fn test_degenerate_viewport_aspect() {
        assert_eq!(Viewport::new(0.0, 0.0, 1.0).aspect(), 1.0);
        assert_eq!(Viewport::new(0.0, 0.0, 1.0).physical_size(), (0, 0));
    }

    #[test]
    fn test_origin_projects_to_center() {
        let (mut stage, _) = stage(Viewport::default());
        stage.follow_orbit(3.7);
        let ndc = stage.camera.project(Vec3::ZERO).unwrap();
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
    }

    #[test]
    fn test_point_behind_camera_is_culled() {
        let (stage, _) = stage(Viewport::default());
        assert!(stage.camera.project(Vec3::new(0.0, 0.0, 200.0)).is_none());
    }

    #[test]
    fn test_orbit_path() {
        let orbit = Orbit::from_config(&CameraConfig::default());
        assert_eq!(orbit.position_at(0.0), Vec3::new(0.0, 20.0, 80.0));

        let t = 10.0_f64;
        let p = orbit.position_at(t);
        assert!((p.x - 50.0 * (0.2 * t).sin() as f32).abs() < 1e-4);
        assert!((p.y - 20.0 * (0.15 * t).cos() as f32).abs() < 1e-4);
        assert_eq!(p.z, 80.0);
    }

    #[test]
    fn test_fog_factor() {
        let fog = Fog {
            color: 0,
            density: 0.005,
        };
        assert_eq!(fog.factor(0.0), 0.0);
        assert!(fog.factor(100.0) > fog.factor(50.0));
        let expected = 1.0 - (-(0.5_f32 * 0.5)).exp();
        assert!((fog.factor(100.0) - expected).abs() < 1e-6);
    }
}
