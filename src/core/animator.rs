//! Scene animator: owns all animation state and runs one frame at a time
//!
//! The animator is driven from outside (vsync callback in the browser, a
//! tokio interval in the CLI). `frame` returns whether the caller should
//! schedule another one; after `teardown` it always says stop.

use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::connections::ConnectionGraph;
use super::nodes::NodeField;
use super::packets::PacketStream;
use super::render::{SceneRenderer, SceneView};
use super::resources::{ResourceKind, ResourceRegistry};
use super::stage::{Stage, Viewport};
use super::stats::{synthetic_bandwidth, SharedStats, StatsSnapshot};
use crate::config::SceneConfig;

/// Whether the frame loop should keep rescheduling itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Reschedule,
    Stop,
}

/// Resources released by a teardown call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub nodes: usize,
    pub connections: usize,
    pub packets: usize,
    pub surface: bool,
    /// Entries still live after the per-owner release (should be zero)
    pub swept: usize,
}

impl TeardownReport {
    pub fn total(&self) -> usize {
        self.nodes + self.connections + self.packets + self.surface as usize + self.swept
    }
}

/// All state of one animated scene
pub struct Animator {
    config: SceneConfig,
    rng: StdRng,
    resources: ResourceRegistry,
    stage: Stage,
    nodes: NodeField,
    connections: ConnectionGraph,
    packets: PacketStream,
    stats: SharedStats,
    /// Accumulated simulation time, kept in f64 so the fixed step never rounds away
    time: f64,
    frames: u64,
    torn_down: bool,
}

impl Animator {
    /// Build a scene seeded from `config.seed`, or from entropy when unset
    pub fn new(config: SceneConfig, viewport: Viewport) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, viewport, rng)
    }

    pub fn with_rng(config: SceneConfig, viewport: Viewport, mut rng: StdRng) -> Self {
        let config = config.sanitized();
        let mut resources = ResourceRegistry::new();

        let stage = Stage::new(&config, viewport, &mut resources);
        let nodes = NodeField::populate(&config.nodes, &mut rng, &mut resources);
        let mut connections = ConnectionGraph::new(&config.connections);
        connections.rebuild(0.0, nodes.nodes(), &mut resources);

        let mut packets = PacketStream::new(&config.packets, &mut resources);
        for _ in 0..config.packets.initial_count {
            packets.spawn(nodes.nodes(), &mut rng, &mut resources);
        }

        let stats = Rc::new(Cell::new(StatsSnapshot {
            packets: packets.len(),
            bandwidth: synthetic_bandwidth(0.0),
            nodes: nodes.len(),
        }));

        info!(
            nodes = nodes.len(),
            connections = connections.len(),
            packets = packets.len(),
            seeded = config.seed.is_some(),
            "scene initialised"
        );

        Self {
            config,
            rng,
            resources,
            stage,
            nodes,
            connections,
            packets,
            stats,
            time: 0.0,
            frames: 0,
            torn_down: false,
        }
    }

    /// Run one frame and issue exactly one render call
    pub fn frame<R: SceneRenderer + ?Sized>(&mut self, renderer: &mut R) -> LoopControl {
        if self.torn_down {
            return LoopControl::Stop;
        }

        self.time += self.config.time_step;
        let time = self.time;

        self.nodes.update(time);
        self.connections
            .maybe_rebuild(time, self.nodes.nodes(), &mut self.resources);
        self.packets.advance(self.nodes.nodes(), &mut self.resources);
        self.packets
            .maybe_spawn(self.nodes.nodes(), &mut self.rng, &mut self.resources);

        self.stats.set(StatsSnapshot {
            packets: self.packets.len(),
            bandwidth: synthetic_bandwidth(time),
            nodes: self.nodes.len(),
        });

        self.stage.follow_orbit(time);

        renderer.render(&self.view());
        self.frames += 1;

        LoopControl::Reschedule
    }

    /// Recompute camera aspect and surface size
    pub fn resize(&mut self, viewport: Viewport) {
        if self.torn_down {
            return;
        }
        self.stage.resize(viewport);
    }

    /// Release every graphics resource. Safe to call more than once; later
    /// calls release nothing.
    pub fn teardown(&mut self) -> TeardownReport {
        if self.torn_down {
            return TeardownReport::default();
        }
        self.torn_down = true;

        let mut report = TeardownReport {
            nodes: self.nodes.release(&mut self.resources),
            connections: self.connections.release(&mut self.resources),
            packets: self.packets.release(&mut self.resources),
            surface: self.stage.release(&mut self.resources),
            swept: 0,
        };
        report.swept = self.resources.release_all();

        info!(
            frames = self.frames,
            released = report.total(),
            swept = report.swept,
            "scene torn down"
        );
        for kind in ResourceKind::ALL {
            debug!(
                kind = kind.label(),
                allocated = self.resources.allocated_of(*kind),
                released = self.resources.released_of(*kind),
                "resource balance"
            );
        }
        report
    }

    pub fn view(&self) -> SceneView<'_> {
        SceneView {
            stage: &self.stage,
            nodes: &self.nodes,
            connections: &self.connections,
            packets: &self.packets,
        }
    }

    /// Handle for readers of the per-frame stats (HUD timer)
    pub fn stats_handle(&self) -> SharedStats {
        self.stats.clone()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.get()
    }

    pub fn is_running(&self) -> bool {
        !self.torn_down
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn nodes(&self) -> &NodeField {
        &self.nodes
    }

    pub fn connections(&self) -> &ConnectionGraph {
        &self.connections
    }

    pub fn packets(&self) -> &PacketStream {
        &self.packets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::HeadlessRenderer;

    fn seeded(seed: u64) -> Animator {
        let config = SceneConfig {
            seed: Some(seed),
            ..SceneConfig::default()
        };
        Animator::new(config, Viewport::default())
    }

    #[test]
    fn test_initial_state() {
        let animator = seeded(1);
        assert_eq!(animator.nodes().len(), 50);
        assert_eq!(animator.packets().len(), 100);
        assert_eq!(animator.connections().rebuilds(), 1);
        assert_eq!(animator.stats().nodes, 50);
        assert_eq!(animator.resources().live_of(ResourceKind::Surface), 1);
    }

    #[test]
    fn test_one_render_call_per_frame() {
        let mut animator = seeded(2);
        let mut renderer = HeadlessRenderer::new();

        for _ in 0..30 {
            assert_eq!(animator.frame(&mut renderer), LoopControl::Reschedule);
        }
        assert_eq!(renderer.render_calls, 30);
        assert_eq!(animator.frames(), 30);
        assert!((animator.time() - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_stats_written_each_frame() {
        let mut animator = seeded(3);
        let stats = animator.stats_handle();
        let mut renderer = HeadlessRenderer::new();

        for _ in 0..50 {
            animator.frame(&mut renderer);
            let snapshot = stats.get();
            assert_eq!(snapshot.packets, animator.packets().len());
            assert_eq!(snapshot.nodes, 50);
            assert_eq!(snapshot.bandwidth, synthetic_bandwidth(animator.time()));
        }
    }

    #[test]
    fn test_packet_cap_holds_over_time() {
        let config = SceneConfig {
            seed: Some(4),
            packets: crate::config::PacketConfig {
                cap: 20,
                spawn_probability: 1.0,
                ..Default::default()
            },
            ..SceneConfig::default()
        };
        let mut animator = Animator::new(config, Viewport::default());
        let mut renderer = HeadlessRenderer::new();

        assert_eq!(animator.packets().len(), 20);
        for _ in 0..500 {
            animator.frame(&mut renderer);
            assert!(animator.packets().len() <= 20);
        }
        assert!(animator.packets().dropped() > 0);
    }

    #[test]
    fn test_connections_rebuilt_on_throttle() {
        let mut animator = seeded(5);
        let mut renderer = HeadlessRenderer::new();

        for _ in 0..150 {
            animator.frame(&mut renderer);
        }
        // only the initial build within the first two time units
        assert_eq!(animator.connections().rebuilds(), 1);

        for _ in 0..100 {
            animator.frame(&mut renderer);
        }
        assert_eq!(animator.connections().rebuilds(), 2);
    }

    #[test]
    fn test_time_keeps_advancing_after_long_runs() {
        let mut renderer = HeadlessRenderer::new();
        for start in [16_384.0, 65_536.0, 262_144.0] {
            let mut animator = seeded(12);
            animator.time = start;
            let rebuilds = animator.connections().rebuilds();

            for _ in 0..1000 {
                let before = animator.time();
                animator.frame(&mut renderer);
                assert!((animator.time() - before - 0.01).abs() < 1e-9);
            }
            assert!((animator.time() - start - 10.0).abs() < 1e-6);
            // one catch-up rebuild, then one per two time units
            assert!(animator.connections().rebuilds() - rebuilds >= 5);
        }
    }

    #[test]
    fn test_non_positive_packet_speeds_still_complete() {
        let config = SceneConfig {
            seed: Some(13),
            packets: crate::config::PacketConfig {
                min_speed: -0.04,
                max_speed: -0.015,
                ..Default::default()
            },
            ..SceneConfig::default()
        };
        let mut animator = Animator::new(config, Viewport::default());
        let mut renderer = HeadlessRenderer::new();

        for _ in 0..2000 {
            animator.frame(&mut renderer);
            let packets = animator.packets().packets();
            assert!(packets.iter().all(|p| p.progress >= 0.0));
        }
        assert!(animator.packets().completed() >= 100);
        assert!(animator.packets().len() <= 200);
    }

    #[test]
    fn test_camera_follows_orbit() {
        let mut animator = seeded(6);
        let mut renderer = HeadlessRenderer::new();
        for _ in 0..100 {
            animator.frame(&mut renderer);
        }
        let t = animator.time();
        let camera = &animator.stage().camera;
        assert!((camera.position.x - (50.0 * (0.2 * t).sin()) as f32).abs() < 1e-4);
        assert!((camera.position.y - (20.0 * (0.15 * t).cos()) as f32).abs() < 1e-4);
        assert_eq!(camera.position.z, 80.0);
        assert_eq!(camera.target, glam::Vec3::ZERO);
    }

    #[test]
    fn test_teardown_after_run_releases_everything() {
        let mut animator = seeded(7);
        let mut renderer = HeadlessRenderer::new();
        for _ in 0..120 {
            animator.frame(&mut renderer);
        }

        let report = animator.teardown();
        let resources = animator.resources();
        assert_eq!(resources.live_count(), 0);
        assert_eq!(report.swept, 0, "every resource has an owner that released it");
        assert!(report.surface);
        for kind in ResourceKind::ALL {
            assert_eq!(
                resources.allocated_of(*kind),
                resources.released_of(*kind),
                "{} released exactly once",
                kind.label()
            );
        }
        assert_eq!(resources.released_of(ResourceKind::NodeGeometry), 1);
        assert_eq!(resources.released_of(ResourceKind::PacketGeometry), 1);
        assert_eq!(resources.released_of(ResourceKind::Surface), 1);
    }

    #[test]
    fn test_teardown_is_idempotent_and_stops_loop() {
        let mut animator = seeded(8);
        let mut renderer = HeadlessRenderer::new();
        animator.frame(&mut renderer);

        assert!(animator.teardown().total() > 0);
        assert_eq!(animator.teardown(), TeardownReport::default());
        assert!(!animator.is_running());

        assert_eq!(animator.frame(&mut renderer), LoopControl::Stop);
        assert_eq!(renderer.render_calls, 1);
        assert_eq!(animator.resources().live_count(), 0);
    }

    #[test]
    fn test_teardown_with_no_packets() {
        let config = SceneConfig {
            seed: Some(9),
            packets: crate::config::PacketConfig {
                initial_count: 0,
                spawn_probability: 0.0,
                ..Default::default()
            },
            ..SceneConfig::default()
        };
        let mut animator = Animator::new(config, Viewport::default());
        assert!(animator.packets().is_empty());

        let report = animator.teardown();
        assert_eq!(report.packets, 1); // only the shared geometry
        assert_eq!(animator.resources().live_count(), 0);
    }

    #[test]
    fn test_resize_latest_signal_wins() {
        let mut animator = seeded(10);
        animator.resize(Viewport::new(1920.0, 1080.0, 1.0));
        animator.resize(Viewport::new(500.0, 1000.0, 3.0));

        let stage = animator.stage();
        assert_eq!(stage.camera.aspect, 0.5);
        assert_eq!(stage.surface.physical_size, (1500, 3000));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut a = seeded(99);
        let mut b = seeded(99);
        assert_eq!(a.nodes().positions(), b.nodes().positions());

        let mut ra = HeadlessRenderer::new();
        let mut rb = HeadlessRenderer::new();
        for _ in 0..200 {
            a.frame(&mut ra);
            b.frame(&mut rb);
        }
        let pairs = |anim: &Animator| -> Vec<(usize, usize)> {
            anim.packets().packets().iter().map(|p| (p.source, p.target)).collect()
        };
        assert_eq!(pairs(&a), pairs(&b));
        assert_eq!(a.nodes().positions(), b.nodes().positions());
        assert_eq!(ra.last, rb.last);
    }

    #[test]
    fn test_unseeded_structural_invariants() {
        let mut animator = Animator::new(SceneConfig::default(), Viewport::default());
        let mut renderer = HeadlessRenderer::new();
        for _ in 0..60 {
            animator.frame(&mut renderer);
        }
        assert_eq!(animator.nodes().len(), 50);
        assert!(animator.packets().len() <= 200);
        for node in animator.nodes().nodes() {
            assert!(node.position.x.abs() <= 60.05 + 1e-4);
            assert!(node.position.y.abs() <= 30.05 + 1e-4);
            assert!(node.position.z.abs() <= 30.05 + 1e-4);
        }
    }
}
