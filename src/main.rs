#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use clap::Parser;
use eframe::egui;
use kroppit::{Cli, EditorConfig, KroppitApp};

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EditorConfig::from(Cli::parse());
    log::info!(
        "Kroppit starting (display box {}x{}, overlay {:?})",
        config.max_display_width,
        config.max_display_height,
        config.overlay
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 600.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Kroppit",
        options,
        Box::new(|cc| Ok(Box::new(KroppitApp::new(cc, config)))),
    )
}
