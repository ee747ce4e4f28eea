//! Message list component
//!
//! Shows the transcript, the response being revealed and an empty-chat
//! placeholder.

use crate::messages::{Message, Role};
use crate::ui::state::{AppState, StreamingResponse};
use crate::ui::theme::Theme;
use egui::{self, Align, RichText};

/// Message list component
pub struct MessageList<'a> {
    state: &'a AppState,
    theme: &'a Theme,
    placeholder: &'a str,
    assistant_name: &'a str,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme, placeholder: &'a str) -> Self {
        Self {
            state,
            theme,
            placeholder,
            assistant_name: "Assistant",
        }
    }

    /// Label shown above assistant bubbles
    pub fn assistant_name(mut self, name: &'a str) -> Self {
        self.assistant_name = name;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let messages = self.state.messages.get_all();

        egui::ScrollArea::vertical()
            .id_salt("messages")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(self.theme.spacing);

                    if messages.is_empty() && !self.state.streaming_response.is_generating {
                        self.show_placeholder(ui);
                    } else {
                        for message in &messages {
                            self.show_message(ui, message);
                            ui.add_space(self.theme.spacing_sm);
                        }

                        if self.state.streaming_response.is_generating {
                            self.show_streaming_response(ui, &self.state.streaming_response);
                        }
                    }

                    ui.add_space(self.theme.spacing);
                });
            });
    }

    fn show_placeholder(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);
            let response = ui.label(
                RichText::new(self.placeholder)
                    .size(18.0)
                    .color(self.theme.text_muted),
            );
            response.widget_info(|| {
                egui::WidgetInfo::labeled(
                    egui::WidgetType::Label,
                    true,
                    format!("Chat placeholder: {}", self.placeholder),
                )
            });
        });
    }

    fn show_message(&self, ui: &mut egui::Ui, message: &Message) {
        let is_user = message.role == Role::User;
        let (bubble_color, text_color, align, sender) = if is_user {
            (
                self.theme.user_bubble,
                self.theme.on_primary(),
                Align::RIGHT,
                "You",
            )
        } else {
            (
                self.theme.assistant_bubble,
                self.theme.text_primary,
                Align::LEFT,
                self.assistant_name,
            )
        };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            ui.label(
                RichText::new(sender)
                    .size(12.0)
                    .color(self.theme.text_muted),
            );
            ui.add_space(2.0);

            let max_width = ui.available_width() * 0.75;
            egui::Frame::none()
                .fill(bubble_color)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    let response = ui.label(RichText::new(&message.text).color(text_color));
                    let label = if is_user {
                        format!("User message: {}", message.text)
                    } else {
                        format!("Assistant response: {}", message.text)
                    };
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
                    });
                });

            let mut footer = message.timestamp.format("%H:%M").to_string();
            if message.metadata.is_spoken {
                footer.push_str(" · spoken");
            }
            ui.label(RichText::new(footer).size(10.0).color(self.theme.text_muted));
        });
    }

    fn show_streaming_response(&self, ui: &mut egui::Ui, response: &StreamingResponse) {
        ui.with_layout(egui::Layout::top_down(Align::LEFT), |ui| {
            ui.label(
                RichText::new(self.assistant_name)
                    .size(12.0)
                    .color(self.theme.text_muted),
            );
            ui.add_space(2.0);

            let max_width = ui.available_width() * 0.75;
            egui::Frame::none()
                .fill(self.theme.assistant_bubble)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);

                    if response.text.is_empty() {
                        // Waiting on the model
                        let t = ui.ctx().input(|i| i.time);
                        ui.horizontal(|ui| {
                            for i in 0..3 {
                                let alpha = ((t * 3.0 + i as f64 * 0.5).sin() * 0.5 + 0.5) as f32;
                                ui.label(
                                    RichText::new("●")
                                        .size(10.0)
                                        .color(self.theme.text_muted.gamma_multiply(alpha)),
                                );
                            }
                        });
                    } else {
                        let label = ui.label(
                            RichText::new(&response.text).color(self.theme.text_primary),
                        );
                        label.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Label,
                                true,
                                format!("Streaming response: {}", response.text),
                            )
                        });
                    }
                });
        });
    }
}
