//! DOM side of the HUD and the floating binary overlay

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rand::rngs::StdRng;
use tracing::{trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::OverlayConfig;
use crate::core::{FloatingText, FloatingTextSet, TextId, TextSlots};
use crate::time::now_seconds;

/// Element that receives floating labels
pub const OVERLAY_CONTAINER_ID: &str = "dataContainer";
/// Class carrying the float-up animation
pub const OVERLAY_CLASS: &str = "dataFlow";

/// HUD text slots looked up by element id on each refresh
pub struct DocumentSlots {
    document: Option<web_sys::Document>,
}

impl DocumentSlots {
    pub fn current() -> Self {
        Self {
            document: web_sys::window().and_then(|w| w.document()),
        }
    }
}

impl TextSlots for DocumentSlots {
    fn set_text(&mut self, id: &str, text: &str) -> bool {
        match self.document.as_ref().and_then(|d| d.get_element_by_id(id)) {
            Some(element) => {
                element.set_text_content(Some(text));
                true
            }
            None => false,
        }
    }
}

/// Floating labels plus the DOM elements that display them
pub struct DomOverlay {
    set: FloatingTextSet,
    elements: HashMap<TextId, web_sys::HtmlElement>,
    rng: StdRng,
}

impl DomOverlay {
    pub fn new(config: &OverlayConfig, rng: StdRng) -> Self {
        Self {
            set: FloatingTextSet::new(config),
            elements: HashMap::new(),
            rng,
        }
    }

    /// Interval tick: drop expired labels and add a new one
    pub fn tick(this: &Rc<RefCell<Self>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        // No container on this page means no overlay
        let Some(container) = document.get_element_by_id(OVERLAY_CONTAINER_ID) else {
            return;
        };
        let width = window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0) as f32;
        let now = now_seconds();

        let (id, ttl) = {
            let mut overlay = this.borrow_mut();
            for expired in overlay.set.expire(now) {
                overlay.detach(expired);
            }

            let overlay = &mut *overlay;
            let Some(spawned) = overlay.set.spawn(now, width, &mut overlay.rng) else {
                return;
            };
            if let Some(evicted) = spawned.evicted {
                overlay.detach(evicted);
            }

            let id = spawned.entry.id;
            match build_element(&document, &spawned.entry)
                .and_then(|el| container.append_child(&el).map(|_| el))
            {
                Ok(element) => {
                    overlay.elements.insert(id, element);
                }
                Err(e) => {
                    warn!(error = ?e, "Failed to attach floating text");
                    overlay.set.remove(id);
                    return;
                }
            }
            (id, overlay.set.ttl())
        };

        let weak = Rc::downgrade(this);
        let expire = Closure::once_into_js(move || {
            if let Some(overlay) = weak.upgrade() {
                overlay.borrow_mut().remove(id);
            }
        });
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            expire.unchecked_ref(),
            (ttl * 1000.0) as i32,
        ) {
            // The next tick's expiry sweep still removes it
            warn!(error = ?e, "Failed to schedule floating text removal");
        }
    }

    /// Remove one label; false when it was already gone
    pub fn remove(&mut self, id: TextId) -> bool {
        if self.set.remove(id) {
            self.detach(id);
            true
        } else {
            false
        }
    }

    /// Remove every label and its element
    pub fn clear(&mut self) -> usize {
        let ids = self.set.clear();
        for id in &ids {
            self.detach(*id);
        }
        for (_, element) in self.elements.drain() {
            element.remove();
        }
        ids.len()
    }

    fn detach(&mut self, id: TextId) {
        if let Some(element) = self.elements.remove(&id) {
            element.remove();
            trace!(id = id.0, "Floating text removed");
        }
    }
}

fn build_element(
    document: &web_sys::Document,
    entry: &FloatingText,
) -> Result<web_sys::HtmlElement, JsValue> {
    let element = document
        .create_element("div")?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| JsValue::from_str("div is not an HtmlElement"))?;
    element.set_class_name(OVERLAY_CLASS);
    let style = element.style();
    style.set_property("left", &format!("{}px", entry.left))?;
    style.set_property("animation-delay", &format!("{}s", entry.delay))?;
    element.set_text_content(Some(&entry.text));
    Ok(element)
}
