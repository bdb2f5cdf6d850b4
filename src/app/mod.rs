//! eframe application hosting the animated scene

mod render;

use eframe::egui;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

use crate::core::{Animator, LoopControl, Viewport};
use crate::theme::{colors, scene_visuals};
use render::PainterRenderer;

pub struct SceneApp {
    animator: Rc<RefCell<Animator>>,
    /// Set when teardown arrives while a frame holds the animator
    teardown_requested: Rc<Cell<bool>>,
    viewport: Option<Viewport>,
}

impl SceneApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        animator: Rc<RefCell<Animator>>,
        teardown_requested: Rc<Cell<bool>>,
    ) -> Self {
        cc.egui_ctx.set_visuals(scene_visuals());
        Self {
            animator,
            teardown_requested,
            viewport: None,
        }
    }

    fn current_viewport(ctx: &egui::Context) -> Viewport {
        let rect = ctx.screen_rect();
        Viewport::new(rect.width(), rect.height(), ctx.pixels_per_point())
    }
}

impl eframe::App for SceneApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let viewport = Self::current_viewport(ctx);
        if self.viewport != Some(viewport) {
            debug!(width = viewport.width, height = viewport.height, "Canvas resized");
            self.animator.borrow_mut().resize(viewport);
            self.viewport = Some(viewport);
        }

        let mut control = LoopControl::Stop;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY))
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::hover());
                let mut renderer = PainterRenderer::new(&painter, response.rect);
                control = self.animator.borrow_mut().frame(&mut renderer);
            });

        if self.teardown_requested.replace(false) {
            self.animator.borrow_mut().teardown();
            control = LoopControl::Stop;
        }

        if control == LoopControl::Reschedule {
            ctx.request_repaint();
        }
    }
}
