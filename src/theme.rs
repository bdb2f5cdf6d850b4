//! Dark terminal-green theme for the scene canvas

use egui::Color32;

use crate::core::geometry::Material;

/// Scene palette
pub mod colors {
    use super::Color32;

    pub const BG_PRIMARY: Color32 = Color32::from_rgb(0, 0, 0); // #000000 - clear colour
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0, 255, 0); // #00FF00 - node colour
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0, 110, 0); // #006E00
}

/// Colour of `material` with its opacity scaled by `visibility` (fog)
pub fn material_color(material: Material, visibility: f32) -> Color32 {
    let [r, g, b] = material.rgb();
    let alpha = (material.opacity * visibility.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// egui Visuals for a full-bleed black canvas
pub fn scene_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_PRIMARY;
    visuals.extreme_bg_color = BG_PRIMARY;
    visuals.faint_bg_color = BG_PRIMARY;

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);

    // No shadows - flat design
    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}
