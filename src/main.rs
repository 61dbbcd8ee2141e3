mod app;
mod audio;
mod core;
mod ui;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([640.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "wavefreq",
        options,
        Box::new(|_cc| Ok(Box::new(app::ExplorerApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("application error: {e}"))
}
