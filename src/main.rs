use eframe::egui;
use launcher_prefs::launcher_app::{self, LauncherApp};

fn main() -> eframe::Result<()> {
    // Try to load user's log level from settings, default to "error" if not found
    let log_level = launcher_prefs::Config::new()
        .and_then(|config| config.load_settings())
        .map(|settings| settings.log_level.to_lowercase())
        .unwrap_or_else(|_| "error".to_string());

    launcher_prefs::log_capture::init_tracing(&log_level);

    tracing::info!("OS: {} / {}", std::env::consts::OS, std::env::consts::ARCH);

    launcher_app::init_common();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 720.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Launcher Preferences",
        options,
        Box::new(|cc| {
            launcher_app::init_egui(&cc.egui_ctx);
            Ok(Box::<LauncherApp>::default())
        }),
    )
}
