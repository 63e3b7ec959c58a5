use android_activity::AndroidApp;
use eframe::NativeOptions;

use crate::launcher_app::{self, LauncherApp};
use crate::log_capture;
use crate::Config;

// Android entry point
#[no_mangle]
pub fn android_main(app: AndroidApp) {
    // Try to load user's log level from settings, default to ERROR if not found
    let log_level = Config::new()
        .and_then(|config| config.load_settings())
        .map(|settings| settings.log_level.to_lowercase())
        .unwrap_or_else(|_| "error".to_string());

    log_capture::init_tracing(&log_level);

    // Initialize Android logger with max level (actual filtering done by tracing)
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Trace)
            .with_tag("LauncherPrefs"),
    );
    log::info!("Android logger initialized");

    launcher_app::init_common();

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("PANIC OCCURRED: {}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic location: {}:{}", location.file(), location.line());
        }
    }));

    let options = NativeOptions {
        android_app: Some(app),
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    match eframe::run_native(
        "LauncherPrefs",
        options,
        Box::new(|cc| {
            launcher_app::init_egui(&cc.egui_ctx);
            Ok(Box::<LauncherApp>::default())
        }),
    ) {
        Ok(_) => log::info!("LauncherApp exited successfully"),
        Err(e) => log::error!("LauncherApp failed: {}", e),
    }
}
