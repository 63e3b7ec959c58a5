pub mod adb;
pub mod android_activity;
pub mod android_contentprovider;
pub mod android_packagemanager;
pub mod android_packagemanager_stt;
pub mod calc_disabledapps;
pub mod gesture_controller;
pub mod gesture_handler;
pub mod gesture_handler_stt;
pub mod pref_store_enable;
pub mod pref_store_enable_stt;

pub mod log_capture;

// Export modules for external use
pub use launcher_app::LauncherApp;
pub mod launcher_app;
pub mod launcher_app_stt;

#[cfg(target_os = "android")]
mod main_android;

use anyhow::{Context, Result};
#[cfg(not(target_os = "android"))]
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::gesture_handler_stt::Gesture;
use crate::pref_store_enable_stt::{default_enabler, DEFAULT_STORE_PACKAGE};

#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub show_logs: bool,
    #[serde(default = "default_language")]
    pub language: String,
    /// Package whose disabled state the store preference watches.
    #[serde(default = "default_store_package")]
    pub store_package: String,
    /// `pkg/cls` of the app that re-enables the store.
    #[serde(default = "default_enabler_component")]
    pub enabler_component: String,
    /// adb serial used on desktop; first attached device when empty.
    #[serde(default)]
    pub adb_device: String,
    /// Persisted handler text per gesture.
    #[serde(default)]
    pub gesture_bindings: BTreeMap<Gesture, String>,
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_log_level() -> String {
    "Error".to_string()
}

fn default_store_package() -> String {
    DEFAULT_STORE_PACKAGE.to_string()
}

fn default_enabler_component() -> String {
    default_enabler().flatten()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            show_logs: false,
            language: default_language(),
            store_package: default_store_package(),
            enabler_component: default_enabler_component(),
            adb_device: String::new(),
            gesture_bindings: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        #[cfg(target_os = "android")]
        {
            let config_dir = PathBuf::from("/data/data/io.launcherprefs.app/files");
            match fs::create_dir_all(&config_dir) {
                Ok(()) => log::info!("Using config_dir: {:?}", config_dir),
                Err(e) => log::error!(
                    "Failed to create config_dir: {:?} - Error: {}",
                    config_dir,
                    e
                ),
            }
            Ok(Config { config_dir })
        }

        #[cfg(not(target_os = "android"))]
        {
            let proj_dirs = ProjectDirs::from("io", "launcherprefs", "launcher_prefs")
                .context("Failed to get project directories")?;
            let config_dir = proj_dirs.config_dir().to_path_buf();
            fs::create_dir_all(&config_dir)?;
            Ok(Config { config_dir })
        }
    }

    /// Config rooted at an explicit directory.
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create {:?}", config_dir))?;
        Ok(Config { config_dir })
    }

    fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.txt")
    }

    pub fn load_settings(&self) -> Result<Settings> {
        let settings_path = self.settings_path();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents =
            fs::read_to_string(&settings_path).context("Failed to read settings file")?;

        let settings: Settings =
            serde_json::from_str(&contents).context("Failed to parse settings JSON")?;

        Ok(settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let settings_path = self.settings_path();

        let json =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        fs::write(&settings_path, json).context("Failed to write settings file")?;

        tracing::info!("Settings saved to {:?}", settings_path);
        Ok(())
    }
}

pub fn init_i18n() {
    let en_us = String::from_utf8_lossy(include_bytes!("../assets/languages/fluent/en-US.ftl"));
    let ko_kr = String::from_utf8_lossy(include_bytes!("../assets/languages/fluent/ko-KR.ftl"));

    if let Err(e) = egui_i18n::load_translations_from_text("en-US", en_us) {
        tracing::error!("Failed to load en-US translations: {:?}", e);
    }
    if let Err(e) = egui_i18n::load_translations_from_text("ko-KR", ko_kr) {
        tracing::error!("Failed to load ko-KR translations: {:?}", e);
    }

    egui_i18n::set_language("en-US");
    egui_i18n::set_fallback("en-US");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"show_logs": true}"#).unwrap();
        assert!(settings.show_logs);
        assert_eq!(settings.store_package, "com.android.vending");
        assert_eq!(
            settings.enabler_component,
            "io.fieldx.store/io.android.store.ui.MainActivity"
        );
        assert!(settings.gesture_bindings.is_empty());
    }

    #[test]
    fn test_gesture_bindings_keyed_by_gesture_name() {
        let mut settings = Settings::default();
        settings
            .gesture_bindings
            .insert(Gesture::DoubleTap, r#"{"class":"blank"}"#.to_string());

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains(r#""double_tap":"{\"class\":\"blank\"}""#));

        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
