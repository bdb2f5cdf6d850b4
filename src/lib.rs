//! net-scene - decorative 3D network animation
//!
//! Wireframe nodes drift inside a box, nearby nodes are joined by lines and
//! small packets travel between random nodes. The simulation lives in
//! [`core`] and runs natively; the browser front end (`wasm` feature)
//! draws it with egui and keeps a DOM HUD and a floating binary overlay.

pub mod config;
pub mod core;
#[cfg(any(feature = "wasm", not(target_arch = "wasm32")))]
pub mod time;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod app;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod theme;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod web;

/// Element id the scene mounts into on page load
pub const MOUNT_ID: &str = "scene";

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();

    web::auto_mount(MOUNT_ID);
}
