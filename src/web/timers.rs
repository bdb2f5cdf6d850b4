//! Cancellable browser intervals

use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A `setInterval` registration, cleared when dropped
pub struct Interval {
    window: web_sys::Window,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn new<F>(window: &web_sys::Window, period_ms: u32, tick: F) -> Result<Self, JsValue>
    where
        F: FnMut() + 'static,
    {
        let callback = Closure::wrap(Box::new(tick) as Box<dyn FnMut()>);
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            period_ms.min(i32::MAX as u32) as i32,
        )?;
        debug!(handle, period_ms, "Interval started");
        Ok(Self {
            window: window.clone(),
            handle,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.handle);
        debug!(handle = self.handle, "Interval cleared");
    }
}
