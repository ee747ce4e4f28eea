//! GUI implementation with egui/eframe

mod app;
pub mod components;
mod state;
mod theme;

pub use app::ChatApp;
pub use state::{AppState, StreamingResponse};
pub use theme::{hue_color, Theme, KNOWN_THEMES};

use crate::config::ThemeSettings;

/// Open the chat window and block until it closes
pub fn run(settings: ThemeSettings, state: AppState) -> eframe::Result<()> {
    let title = settings.app_name.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(ChatApp::new(cc, state, settings)))),
    )
}
