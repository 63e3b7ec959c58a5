use crate::android_activity::AppLauncher;
use crate::android_contentprovider::ContentResolver;
use crate::android_packagemanager_stt::InstalledApplication;
use crate::calc_disabledapps::PackageRegistry;
use crate::gesture_controller::GestureBindings;
use crate::gesture_handler_stt::Gesture;
use crate::pref_store_enable_stt::StoreEnablePreference;
use crate::{Config, Settings};

/// App chooser shown for handlers asking for `ConfigIntent::PickApp`.
#[derive(Default)]
pub struct DlgAppPicker {
    pub open: bool,
    pub gesture: Option<Gesture>,
    pub apps: Vec<InstalledApplication>,
    pub filter: String,
}

/// Seconds a toast stays on screen.
pub const TOAST_SECONDS: f64 = 2.0;

/// Platform services the screen talks to.
pub struct PlatformBackends {
    pub registry: Box<dyn PackageRegistry>,
    pub launcher: Box<dyn AppLauncher>,
    pub gesture_launcher: Box<dyn AppLauncher>,
    pub content: Box<dyn ContentResolver>,
}

pub struct Toast {
    pub message: String,
    pub until: Option<f64>,
}

pub struct LauncherApp {
    pub config: Option<Config>,
    pub settings: Settings,
    pub registry: Box<dyn PackageRegistry>,
    pub launcher: Box<dyn AppLauncher>,
    pub content: Box<dyn ContentResolver>,
    pub store_pref: Option<StoreEnablePreference>,
    pub store_pref_error: Option<String>,
    pub bindings: GestureBindings,
    pub app_picker: DlgAppPicker,
    pub toasts: Vec<Toast>,
}
