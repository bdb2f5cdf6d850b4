//! Headless CLI driving the scene simulation
//!
//! Run with: cargo run --features cli --bin net-scene-cli
//!
//! Environment:
//!   NET_SCENE_CONFIG  path to a JSON scene config
//!   NET_SCENE_SEED    u64 seed for a reproducible run
//!   NET_SCENE_FRAMES  stop after this many frames (default: until ctrl-c)

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use net_scene::config::SceneConfig;
    use net_scene::core::{
        refresh_hud, Animator, FloatingTextSet, HeadlessRenderer, HudSlot, LoopControl, TextSlots,
        Viewport,
    };
    use net_scene::time::{now_seconds, RateMeter};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use tracing::{debug, info, trace, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    /// HUD slots kept as plain strings
    #[derive(Default)]
    struct HudLines(BTreeMap<&'static str, String>);

    impl TextSlots for HudLines {
        fn set_text(&mut self, id: &str, text: &str) -> bool {
            match HudSlot::ALL.iter().find(|slot| slot.id() == id) {
                Some(slot) => {
                    self.0.insert(slot.id(), text.to_string());
                    true
                }
                None => false,
            }
        }
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,net_scene=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let mut config = match std::env::var("NET_SCENE_CONFIG") {
        Ok(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| SceneConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(config) => {
                info!(path = %path, "Loaded scene config");
                config
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Failed to load scene config, using defaults");
                SceneConfig::default()
            }
        },
        Err(_) => SceneConfig::default(),
    };
    if let Ok(seed) = std::env::var("NET_SCENE_SEED") {
        match seed.parse::<u64>() {
            Ok(seed) => config.seed = Some(seed),
            Err(e) => warn!(seed = %seed, error = %e, "Ignoring invalid NET_SCENE_SEED"),
        }
    }
    let frame_limit = std::env::var("NET_SCENE_FRAMES")
        .ok()
        .and_then(|v| v.parse::<u64>().ok());

    let viewport = Viewport::default();
    let mut animator = Animator::new(config, viewport);
    let config = animator.config().clone();
    let mut renderer = HeadlessRenderer::new();
    let mut hud = HudLines::default();
    let mut overlay = FloatingTextSet::new(&config.overlay);
    let mut overlay_rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };

    let mut frame_interval = tokio::time::interval(Duration::from_micros(16_667));
    let mut hud_interval =
        tokio::time::interval(Duration::from_millis(config.hud.refresh_ms as u64));
    let mut overlay_interval =
        tokio::time::interval(Duration::from_millis(config.overlay.spawn_ms as u64));
    let mut stats_interval = tokio::time::interval(Duration::from_secs(5));
    let mut frame_rate = RateMeter::new();

    info!(frame_limit = ?frame_limit, "Scene running, ctrl-c to stop");

    loop {
        tokio::select! {
            _ = frame_interval.tick() => {
                if animator.frame(&mut renderer) == LoopControl::Stop {
                    break;
                }
                frame_rate.tick();
                if frame_limit.is_some_and(|limit| animator.frames() >= limit) {
                    info!(frames = animator.frames(), "Frame limit reached");
                    break;
                }
            }
            _ = hud_interval.tick() => {
                refresh_hud(&animator.stats(), &mut hud);
                trace!(hud = ?hud.0, "HUD refreshed");
            }
            _ = overlay_interval.tick() => {
                let now = now_seconds();
                for id in overlay.expire(now) {
                    trace!(id = id.0, "Floating text expired");
                }
                if let Some(spawned) = overlay.spawn(now, viewport.width, &mut overlay_rng) {
                    trace!(id = spawned.entry.id.0, text = %spawned.entry.text, "Floating text");
                }
            }
            _ = stats_interval.tick() => {
                let stats = animator.stats();
                info!(
                    time = format!("{:.2}", animator.time()),
                    packets = stats.packets,
                    nodes = stats.nodes,
                    bandwidth = format!("{:.1}", stats.bandwidth),
                    segments = animator.connections().len(),
                    visible_nodes = renderer.last.visible_nodes,
                    floating = overlay.len(),
                    "fps" = format!("{:.1}", frame_rate.take()),
                    "stats"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    let report = animator.teardown();
    overlay.clear();
    debug!(live = animator.resources().live_count(), "Resources after teardown");
    info!(
        nodes = report.nodes,
        connections = report.connections,
        packets = report.packets,
        surface = report.surface,
        swept = report.swept,
        total = report.total(),
        "Scene torn down"
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
