//! Main application struct and eframe integration

use crate::config::ThemeSettings;
use crate::ui::components::{InputBar, MessageList};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use std::time::Duration;

/// How often to redraw while a response is being revealed
const STREAM_REPAINT_INTERVAL: Duration = Duration::from_millis(30);

/// The chat window
pub struct ChatApp {
    state: AppState,
    theme: Theme,
    settings: ThemeSettings,
}

impl ChatApp {
    /// Create the app for eframe
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState, settings: ThemeSettings) -> Self {
        let app = Self::with_parts(state, Theme::from_settings(&settings), settings);
        app.theme.apply(&cc.egui_ctx);
        app
    }

    /// Create the app without an eframe context
    pub fn with_parts(state: AppState, theme: Theme, settings: ThemeSettings) -> Self {
        Self {
            state,
            theme,
            settings,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(12.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let title = ui.label(
                        RichText::new(&self.settings.app_name)
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    title.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Label,
                            true,
                            format!("Title: {}", self.settings.app_name),
                        )
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if self.state.speech_enabled {
                            ui.label(RichText::new("🔊").size(14.0).color(self.theme.text_muted))
                                .on_hover_text("Responses are spoken aloud");
                        }
                        if let Some(ms) = self.state.streaming_response.total_ms {
                            ui.label(
                                RichText::new(format!("{} ms", ms))
                                    .size(11.0)
                                    .family(egui::FontFamily::Monospace)
                                    .color(self.theme.text_muted),
                            );
                        }
                    });
                });
            });
    }

    fn show_error_banner(&mut self, ctx: &egui::Context) {
        let Some(error) = self.state.last_error.clone() else {
            return;
        };

        TopBottomPanel::top("error_banner")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.error.gamma_multiply(0.15))
                    .inner_margin(8.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let label = ui.label(RichText::new(&error).color(self.theme.error));
                    label.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Label,
                            true,
                            format!("Error: {}", error),
                        )
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").on_hover_text("Dismiss").clicked() {
                            self.state.dismiss_error();
                        }
                    });
                });
            });
    }

    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                InputBar::new(
                    &mut self.state,
                    &self.theme,
                    &self.settings.textbox_placeholder_text,
                )
                .show(ui);
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                MessageList::new(
                    &self.state,
                    &self.theme,
                    &self.settings.chat_placeholder_text,
                )
                .assistant_name(&self.settings.app_name)
                .show(ui);
            });
    }

    /// Poll the worker and draw one frame
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.state.poll_events();

        self.show_header(ctx);
        self.show_error_banner(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);

        if self.state.streaming_response.is_generating {
            ctx.request_repaint_after(STREAM_REPAINT_INTERVAL);
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.shutdown();
    }
}
