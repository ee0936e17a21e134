//! テーマ設定 - 倉庫向けの明るいテーマ

use egui::{Color32, CornerRadius, Stroke, Style, Visuals};

/// カラーパレット
pub struct Palette;

impl Palette {
    pub const BG_PANEL: Color32 = Color32::from_rgb(246, 244, 238);
    pub const BG_CARD: Color32 = Color32::from_rgb(255, 255, 255);
    pub const BG_DROP: Color32 = Color32::from_rgb(255, 246, 224);
    pub const ACCENT: Color32 = Color32::from_rgb(230, 145, 20);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(33, 37, 41);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(108, 117, 125);
    pub const SUCCESS: Color32 = Color32::from_rgb(40, 150, 70);
    pub const WARNING: Color32 = Color32::from_rgb(200, 120, 0);
    pub const ERROR: Color32 = Color32::from_rgb(200, 50, 50);
    pub const BORDER: Color32 = Color32::from_rgb(206, 201, 190);
}

/// 明るいテーマのスタイルを作成
pub fn warehouse_theme() -> Style {
    let mut style = Style::default();
    let mut visuals = Visuals::light();

    visuals.panel_fill = Palette::BG_PANEL;
    visuals.window_fill = Palette::BG_CARD;
    visuals.faint_bg_color = Palette::BG_PANEL;

    for widget in [
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
    ] {
        widget.corner_radius = CornerRadius::same(6);
    }
    visuals.widgets.active.bg_fill = Palette::ACCENT;
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, Palette::ACCENT);

    visuals.selection.bg_fill = Palette::ACCENT.gamma_multiply(0.4);
    visuals.selection.stroke = Stroke::new(1.0, Palette::ACCENT);

    style.visuals = visuals;
    style
}
