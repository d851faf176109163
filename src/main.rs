mod app;
mod codec;
mod coords;
mod editor;
mod history;
mod logging;
mod ops;
mod render;
mod settings;

use eframe::egui;

use crate::app::{PhotoEditApp, APP_NAME};
use crate::settings::{Settings, SETTINGS_FILE};

fn main() -> eframe::Result<()> {
    let (settings, settings_error) = match Settings::load(SETTINGS_FILE) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    logging::init(settings.debug);
    if let Some(e) = settings_error {
        tracing::warn!("ignoring {SETTINGS_FILE}: {e:#}");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_title(APP_NAME)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    tracing::info!("starting {APP_NAME} {}", env!("CARGO_PKG_VERSION"));
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| Ok(Box::new(PhotoEditApp::new(settings)))),
    )
}
