//! Browser mount point
//!
//! `mount` builds the scene inside a container element and starts the frame
//! loop plus the HUD and overlay timers. The returned handle owns all of it;
//! `SceneHandle::teardown` stops every schedule and releases every resource.

mod dom;
mod timers;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::app::SceneApp;
use crate::config::SceneConfig;
use crate::core::{refresh_hud, Animator, Viewport};
use dom::{DocumentSlots, DomOverlay};
use timers::Interval;

/// Window global that may hold a JSON-compatible scene config object
pub const CONFIG_GLOBAL: &str = "__net_scene_config";

thread_local! {
    static AUTO_MOUNTED: RefCell<Option<SceneHandle>> = const { RefCell::new(None) };
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn load_config(window: &web_sys::Window) -> SceneConfig {
    let value = match js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL)) {
        Ok(value) if !value.is_undefined() && !value.is_null() => value,
        _ => return SceneConfig::default(),
    };
    let json: String = match js_sys::JSON::stringify(&value) {
        Ok(json) => json.into(),
        Err(e) => {
            warn!(error = ?e, "Scene config is not serializable, using defaults");
            return SceneConfig::default();
        }
    };
    match SceneConfig::from_json(&json) {
        Ok(config) => {
            debug!(?config, "Loaded scene config from window");
            config
        }
        Err(e) => {
            warn!(error = %e, "Invalid scene config, using defaults");
            SceneConfig::default()
        }
    }
}

fn window_viewport(window: &web_sys::Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    Viewport::new(
        dimension(window.inner_width()),
        dimension(window.inner_height()),
        window.device_pixel_ratio() as f32,
    )
}

fn create_canvas(document: &web_sys::Document) -> Result<web_sys::HtmlCanvasElement, JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("canvas is not an HtmlCanvasElement"))?;
    let style = canvas.style();
    style.set_property("display", "block")?;
    style.set_property("width", "100vw")?;
    style.set_property("height", "100vh")?;
    Ok(canvas)
}

/// A mounted scene. Dropping it without `teardown` leaves the scene running.
#[wasm_bindgen]
pub struct SceneHandle {
    runner: eframe::WebRunner,
    animator: Rc<RefCell<Animator>>,
    teardown_requested: Rc<Cell<bool>>,
    overlay: Rc<RefCell<DomOverlay>>,
    container: web_sys::Element,
    canvas: web_sys::HtmlCanvasElement,
    hud_timer: Option<Interval>,
    overlay_timer: Option<Interval>,
    mounted: bool,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Stop the frame loop and timers, release the scene, remove the canvas.
    /// Calling it again does nothing.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;

        self.hud_timer.take();
        self.overlay_timer.take();

        match self.animator.try_borrow_mut() {
            Ok(mut animator) => {
                animator.teardown();
            }
            // Called from inside a frame: the app finishes teardown when it returns
            Err(_) => self.teardown_requested.set(true),
        }
        self.runner.destroy();

        let removed = self.overlay.borrow_mut().clear();
        let canvas_node: &web_sys::Node = self.canvas.as_ref();
        if self.container.contains(Some(canvas_node)) {
            if let Err(e) = self.container.remove_child(&self.canvas) {
                warn!(error = ?e, "Failed to detach scene canvas");
            }
        }
        info!(floating_texts = removed, "Scene unmounted");
    }

    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.mounted
    }
}

/// Mount the scene into the element with id `container_id`
#[wasm_bindgen]
pub async fn mount(container_id: String) -> Result<SceneHandle, JsValue> {
    let window = window()?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container = document
        .get_element_by_id(&container_id)
        .ok_or_else(|| JsValue::from_str(&format!("mount point #{container_id} not found")))?;

    let viewport = window_viewport(&window);
    let animator = Rc::new(RefCell::new(Animator::new(load_config(&window), viewport)));
    // Timers use the sanitized copy held by the animator
    let config = animator.borrow().config().clone();
    let teardown_requested = Rc::new(Cell::new(false));

    let canvas = create_canvas(&document)?;
    container.append_child(&canvas)?;

    let runner = eframe::WebRunner::new();
    let app_animator = animator.clone();
    let app_teardown = teardown_requested.clone();
    if let Err(e) = runner
        .start(
            canvas.clone(),
            eframe::WebOptions::default(),
            Box::new(move |cc| Ok(Box::new(SceneApp::new(cc, app_animator, app_teardown)))),
        )
        .await
    {
        error!(error = ?e, "Failed to start scene renderer");
        animator.borrow_mut().teardown();
        let _ = container.remove_child(&canvas);
        return Err(e);
    }

    let stats = animator.borrow().stats_handle();
    let hud_timer = Interval::new(&window, config.hud.refresh_ms, move || {
        refresh_hud(&stats.get(), &mut DocumentSlots::current());
    })?;

    let overlay_rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };
    let overlay = Rc::new(RefCell::new(DomOverlay::new(&config.overlay, overlay_rng)));
    let overlay_timer = Interval::new(&window, config.overlay.spawn_ms, {
        let overlay = overlay.clone();
        move || DomOverlay::tick(&overlay)
    })?;

    info!(container = %container_id, "Scene mounted");
    Ok(SceneHandle {
        runner,
        animator,
        teardown_requested,
        overlay,
        container,
        canvas,
        hud_timer: Some(hud_timer),
        overlay_timer: Some(overlay_timer),
        mounted: true,
    })
}

/// Mount into `container_id` if the page has it, keeping the handle for `unmount`
pub fn auto_mount(container_id: &'static str) {
    let present = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(container_id))
        .is_some();
    if !present {
        info!(container = container_id, "No mount point, waiting for explicit mount()");
        return;
    }

    wasm_bindgen_futures::spawn_local(async move {
        match mount(container_id.to_string()).await {
            Ok(handle) => AUTO_MOUNTED.with(|slot| {
                if let Some(mut previous) = slot.borrow_mut().replace(handle) {
                    previous.teardown();
                }
            }),
            Err(e) => error!(error = ?e, "Auto mount failed"),
        }
    });
}

/// Tear down the automatically mounted scene, if any
#[wasm_bindgen]
pub fn unmount() {
    let handle = AUTO_MOUNTED.with(|slot| slot.borrow_mut().take());
    if let Some(mut handle) = handle {
        handle.teardown();
    }
}
