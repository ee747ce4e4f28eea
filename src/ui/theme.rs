//! Theme and styling
//!
//! Built from the theme configuration: a named base palette, an optional
//! primary hue and a font preference.

use crate::config::ThemeSettings;
use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};
use tracing::warn;

/// Application theme configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    /// Palette name this theme was built from
    pub name: String,
    pub dark: bool,

    /// Primary accent color
    pub primary: Color32,
    pub error: Color32,

    /// Background colors
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,

    /// Text colors
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    pub user_bubble: Color32,
    pub assistant_bubble: Color32,

    pub button_rounding: Rounding,
    pub card_rounding: Rounding,
    pub bubble_rounding: Rounding,

    /// Family used for body text
    pub body_family: FontFamily,

    /// Standard spacing
    pub spacing: f32,
    /// Large spacing
    pub spacing_lg: f32,
    /// Small spacing
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::soft()
    }
}

/// Palette names accepted in `source_theme`
pub const KNOWN_THEMES: &[&str] = &["soft", "default", "base", "monochrome", "glass", "dark"];

impl Theme {
    /// Build the theme described by the configuration
    pub fn from_settings(settings: &ThemeSettings) -> Self {
        if settings.load_theme_from_hf_hub {
            warn!(
                "Theme '{}' is not fetched from the hub; using the local '{}' palette",
                settings.hf_hub_theme_name.as_deref().unwrap_or("<unnamed>"),
                settings.source_theme
            );
        }

        let mut theme = Self::named(&settings.source_theme).unwrap_or_else(|| {
            warn!(
                "Unknown theme '{}'; expected one of {}",
                settings.source_theme,
                KNOWN_THEMES.join(", ")
            );
            Self::soft()
        });

        if let Some(hue) = &settings.primary_hue {
            match hue_color(hue) {
                Some(color) => theme = theme.with_primary(color),
                None => warn!("Unknown primary_hue '{}'; keeping the palette default", hue),
            }
        }

        if settings
            .font
            .iter()
            .any(|family| family.to_ascii_lowercase().contains("mono"))
        {
            theme.body_family = FontFamily::Monospace;
        }

        theme
    }

    /// Look up a palette by name, ignoring case
    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "soft" => Some(Self::soft()),
            "default" => Some(Self::default_palette()),
            "base" => Some(Self::base()),
            "monochrome" => Some(Self::monochrome()),
            "glass" => Some(Self::glass()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }

    fn light(name: &str, primary: Color32) -> Self {
        Self {
            name: name.to_string(),
            dark: false,
            primary,
            error: Color32::from_rgb(220, 38, 38),

            bg_primary: Color32::from_rgb(255, 255, 255),
            bg_secondary: Color32::from_rgb(243, 244, 246),
            bg_tertiary: Color32::from_rgb(229, 231, 235),

            text_primary: Color32::from_rgb(17, 24, 39),
            text_secondary: Color32::from_rgb(55, 65, 81),
            text_muted: Color32::from_rgb(107, 114, 128),

            user_bubble: primary,
            assistant_bubble: Color32::from_rgb(243, 244, 246),

            button_rounding: Rounding::same(8.0),
            card_rounding: Rounding::same(12.0),
            bubble_rounding: Rounding::same(12.0),

            body_family: FontFamily::Proportional,

            spacing: 16.0,
            spacing_lg: 24.0,
            spacing_sm: 8.0,
        }
    }

    /// Rounded, indigo on white
    pub fn soft() -> Self {
        let mut theme = Self::light("soft", Color32::from_rgb(99, 102, 241));
        theme.bg_secondary = Color32::from_rgb(248, 250, 252);
        theme.assistant_bubble = Color32::from_rgb(238, 242, 255);
        theme.button_rounding = Rounding::same(12.0);
        theme.card_rounding = Rounding::same(16.0);
        theme.bubble_rounding = Rounding::same(16.0);
        theme
    }

    pub fn default_palette() -> Self {
        Self::light("default", Color32::from_rgb(249, 115, 22))
    }

    pub fn base() -> Self {
        Self::light("base", Color32::from_rgb(59, 130, 246))
    }

    /// Black and grey, square corners
    pub fn monochrome() -> Self {
        let mut theme = Self::light("monochrome", Color32::from_rgb(38, 38, 38));
        theme.assistant_bubble = Color32::from_rgb(245, 245, 245);
        theme.button_rounding = Rounding::same(2.0);
        theme.card_rounding = Rounding::same(2.0);
        theme.bubble_rounding = Rounding::same(2.0);
        theme
    }

    pub fn glass() -> Self {
        let mut theme = Self::light("glass", Color32::from_rgb(120, 113, 108));
        theme.bg_primary = Color32::from_rgb(250, 250, 249);
        theme.bg_secondary = Color32::from_rgb(245, 245, 244);
        theme.assistant_bubble = Color32::from_rgb(231, 229, 228);
        theme
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            dark: true,
            primary: Color32::from_rgb(99, 102, 241),
            error: Color32::from_rgb(239, 68, 68),

            bg_primary: Color32::from_rgb(17, 24, 39),
            bg_secondary: Color32::from_rgb(31, 41, 55),
            bg_tertiary: Color32::from_rgb(55, 65, 81),

            text_primary: Color32::from_rgb(249, 250, 251),
            text_secondary: Color32::from_rgb(209, 213, 219),
            text_muted: Color32::from_rgb(156, 163, 175),

            user_bubble: Color32::from_rgb(99, 102, 241),
            assistant_bubble: Color32::from_rgb(31, 41, 55),

            button_rounding: Rounding::same(8.0),
            card_rounding: Rounding::same(12.0),
            bubble_rounding: Rounding::same(12.0),

            body_family: FontFamily::Proportional,

            spacing: 16.0,
            spacing_lg: 24.0,
            spacing_sm: 8.0,
        }
    }

    /// Replace the accent color
    pub fn with_primary(mut self, color: Color32) -> Self {
        self.primary = color;
        self.user_bubble = color;
        self
    }

    /// Apply this theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = if self.dark {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_tertiary;

        visuals.widgets.noninteractive.bg_fill = self.bg_secondary;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_muted);

        visuals.widgets.inactive.bg_fill = self.bg_tertiary;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_secondary);

        visuals.widgets.hovered.bg_fill = self.primary.gamma_multiply(0.8);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.widgets.active.bg_fill = self.primary;
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.selection.bg_fill = self.primary.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.primary);
        visuals.hyperlink_color = self.primary;
        visuals.window_rounding = self.card_rounding;
        visuals.window_stroke = Stroke::new(1.0, self.bg_tertiary);

        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.spacing_sm);
        style.spacing.window_margin = egui::Margin::same(self.spacing);
        style.spacing.button_padding = Vec2::new(self.spacing, self.spacing_sm);

        style.text_styles.insert(
            egui::TextStyle::Heading,
            FontId::new(24.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            FontId::new(14.0, self.body_family.clone()),
        );
        style.text_styles.insert(
            egui::TextStyle::Monospace,
            FontId::new(13.0, FontFamily::Monospace),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            FontId::new(14.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Small,
            FontId::new(12.0, FontFamily::Proportional),
        );

        ctx.set_style(style);
    }

    /// Text color on top of the user bubble
    pub fn on_primary(&self) -> Color32 {
        Color32::WHITE
    }
}

/// Named hues, using the 500 shade of each
pub fn hue_color(name: &str) -> Option<Color32> {
    let rgb = match name.trim().to_ascii_lowercase().as_str() {
        "slate" => (100, 116, 139),
        "gray" => (107, 114, 128),
        "zinc" => (113, 113, 122),
        "neutral" => (115, 115, 115),
        "stone" => (120, 113, 108),
        "red" => (239, 68, 68),
        "orange" => (249, 115, 22),
        "amber" => (245, 158, 11),
        "yellow" => (234, 179, 8),
        "lime" => (132, 204, 22),
        "green" => (34, 197, 94),
        "emerald" => (16, 185, 129),
        "teal" => (20, 184, 166),
        "cyan" => (6, 182, 212),
        "sky" => (14, 165, 233),
        "blue" => (59, 130, 246),
        "indigo" => (99, 102, 241),
        "violet" => (139, 92, 246),
        "purple" => (168, 85, 247),
        "fuchsia" => (217, 70, 239),
        "pink" => (236, 72, 153),
        "rose" => (244, 63, 94),
        _ => return None,
    };
    Some(Color32::from_rgb(rgb.0, rgb.1, rgb.2))
}
