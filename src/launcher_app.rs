use eframe::egui;
use eframe::egui::Context;
use egui_i18n::tr;
use egui_material3::theme::{load_fonts, load_themes, setup_local_theme, update_window_background};
use egui_material3::{dialog, MaterialButton};
use std::cell::Cell;
use tracing::{error, info, warn};

use crate::android_activity::ComponentName;
use crate::android_contentprovider::{hide_app, show_app};
use crate::calc_disabledapps::{set_display_name_locale, DisplayNameOrder, PackageRegistry};
use crate::gesture_controller::GestureBindings;
use crate::gesture_handler::{ConfigIntent, ConfigResult, Gesture, HandlerKind};
use crate::log_capture;
use crate::pref_store_enable::StoreEnablePreference;
use crate::pref_store_enable_stt::default_enabler;
pub use crate::launcher_app_stt::*;
use crate::{Config, Settings};

const LOG_LEVELS: [&str; 5] = ["Error", "Warn", "Info", "Debug", "Trace"];

/// Initialize common app components (i18n).
/// Call this early in main() before creating the app.
pub fn init_common() {
    crate::init_i18n();
    if let Ok(config) = Config::new() {
        if let Ok(settings) = config.load_settings() {
            egui_i18n::set_language(&settings.language);
            set_display_name_locale(&settings.language);
        }
    }
}

/// Initialize egui context with themes and fonts.
/// Call this in the eframe app creation callback.
pub fn init_egui(ctx: &Context) {
    setup_local_theme(None);
    load_fonts(ctx);
    load_themes();
    update_window_background(ctx);
}

#[cfg(target_os = "android")]
fn platform_backends(_settings: &Settings) -> PlatformBackends {
    use crate::android_activity::AndroidLauncher;
    use crate::android_contentprovider::AndroidContentResolver;
    use crate::android_packagemanager::AndroidPackageRegistry;
    PlatformBackends {
        registry: Box::new(AndroidPackageRegistry),
        launcher: Box::new(AndroidLauncher),
        gesture_launcher: Box::new(AndroidLauncher),
        content: Box::new(AndroidContentResolver),
    }
}

#[cfg(not(target_os = "android"))]
fn platform_backends(settings: &Settings) -> PlatformBackends {
    use crate::adb::{get_devices, AdbContentResolver, AdbLauncher, AdbPackageRegistry};

    let device = if settings.adb_device.is_empty() {
        match get_devices() {
            Ok(devices) => devices.into_iter().next(),
            Err(e) => {
                warn!("adb devices failed: {}", e);
                None
            }
        }
    } else {
        Some(settings.adb_device.clone())
    };
    info!("Using adb device {:?}", device);

    PlatformBackends {
        registry: Box::new(AdbPackageRegistry::new(device.clone())),
        launcher: Box::new(AdbLauncher::new(device.clone())),
        gesture_launcher: Box::new(AdbLauncher::new(device.clone())),
        content: Box::new(AdbContentResolver::new(device)),
    }
}

fn enabler_component(settings: &Settings) -> ComponentName {
    ComponentName::unflatten(&settings.enabler_component).unwrap_or_else(|| {
        warn!(
            "Invalid enabler component {:?}, using default",
            settings.enabler_component
        );
        default_enabler()
    })
}

impl Default for LauncherApp {
    fn default() -> Self {
        let config = Config::new().ok();
        let settings = config
            .as_ref()
            .and_then(|cfg| cfg.load_settings().ok())
            .unwrap_or_default();
        let backends = platform_backends(&settings);
        Self::new(config, settings, backends)
    }
}

impl LauncherApp {
    pub fn new(config: Option<Config>, settings: Settings, backends: PlatformBackends) -> Self {
        let PlatformBackends {
            registry,
            launcher,
            gesture_launcher,
            content,
        } = backends;
        let (store_pref, store_pref_error) = match StoreEnablePreference::new(
            registry.as_ref(),
            settings.store_package.clone(),
            enabler_component(&settings),
        ) {
            Ok(pref) => (Some(pref), None),
            Err(e) => {
                error!("Failed to query installed applications: {}", e);
                (None, Some(e.to_string()))
            }
        };
        let bindings = GestureBindings::from_settings(&settings.gesture_bindings, gesture_launcher);

        Self {
            config,
            settings,
            registry,
            launcher,
            content,
            store_pref,
            store_pref_error,
            bindings,
            app_picker: DlgAppPicker::default(),
            toasts: Vec::new(),
        }
    }

    fn save_settings(&mut self) {
        self.settings.gesture_bindings = self.bindings.to_settings();
        if let Some(config) = &self.config {
            if let Err(e) = config.save_settings(&self.settings) {
                error!("Failed to save settings: {:#}", e);
            }
        }
    }

    fn push_toast(&mut self, message: String) {
        self.toasts.push(Toast {
            message,
            until: None,
        });
    }

    /// Open the configuration UI the handler bound to `gesture` asks for.
    pub fn open_config(&mut self, gesture: Gesture) {
        if let Some(ConfigIntent::PickApp) = self.bindings.config_intent(gesture) {
            self.open_app_picker(gesture);
        }
    }

    fn open_app_picker(&mut self, gesture: Gesture) {
        match self.registry.list_enabled_applications() {
            Ok(mut apps) => {
                DisplayNameOrder::current().sort(&mut apps);
                self.app_picker = DlgAppPicker {
                    open: true,
                    gesture: Some(gesture),
                    apps,
                    filter: String::new(),
                };
            }
            Err(e) => {
                error!("Failed to list applications: {}", e);
                self.push_toast(tr!("registry-query-failed", { error: e.to_string() }));
            }
        }
    }

    fn retry_store_pref(&mut self) {
        match StoreEnablePreference::new(
            self.registry.as_ref(),
            self.settings.store_package.clone(),
            enabler_component(&self.settings),
        ) {
            Ok(pref) => {
                self.store_pref = Some(pref);
                self.store_pref_error = None;
            }
            Err(e) => self.store_pref_error = Some(e.to_string()),
        }
    }

    /// Show or hide the store app through the vendor content provider.
    pub fn set_store_visible(&mut self, visible: bool) {
        let package = self.settings.store_package.clone();
        let result = if visible {
            show_app(self.content.as_ref(), &package)
        } else {
            hide_app(self.content.as_ref(), &package)
        };
        match result {
            Ok(Some(_)) => {
                let message = if visible {
                    tr!("store-shown", { name: package })
                } else {
                    tr!("store-hidden", { name: package })
                };
                self.push_toast(message);
            }
            Ok(None) => {
                warn!("Store provider gave no answer for {}", package);
                self.push_toast(tr!("store-provider-no-response"));
            }
            Err(e) => {
                error!("Store provider query failed: {}", e);
                self.push_toast(tr!("store-provider-failed", { error: e.to_string() }));
            }
        }
        if let Some(pref) = self.store_pref.as_mut() {
            if let Err(e) = pref.refresh(self.registry.as_ref()) {
                error!("Failed to query installed applications: {}", e);
            }
        }
    }

    fn ui_store_section(&mut self, ui: &mut egui::Ui) {
        ui.heading(tr!("store-section"));
        ui.add_space(6.0);
        if let Some(pref) = self.store_pref.as_mut() {
            pref.show(ui, self.registry.as_ref(), self.launcher.as_mut());
            ui.horizontal(|ui| {
                if ui.add(MaterialButton::outlined(tr!("store-show"))).clicked() {
                    self.set_store_visible(true);
                }
                if ui.add(MaterialButton::outlined(tr!("store-hide"))).clicked() {
                    self.set_store_visible(false);
                }
            });
            return;
        }

        let msg = self.store_pref_error.clone().unwrap_or_default();
        ui.label(tr!("registry-query-failed", { error: msg }));
        if ui.add(MaterialButton::outlined(tr!("retry"))).clicked() {
            self.retry_store_pref();
        }
    }

    fn ui_gesture_section(&mut self, ui: &mut egui::Ui) {
        ui.heading(tr!("gestures-section"));
        ui.add_space(6.0);

        let mut changed = false;
        egui::Grid::new("gesture_bindings_grid")
            .num_columns(4)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                for gesture in Gesture::ALL {
                    ui.label(gesture.display_name());

                    let current = self.bindings.handler(gesture).kind();
                    let mut selected = current;
                    egui::ComboBox::from_id_salt(("gesture_handler", gesture))
                        .selected_text(self.bindings.handler(gesture).display_name())
                        .show_ui(ui, |ui| {
                            for kind in HandlerKind::ALL {
                                ui.selectable_value(&mut selected, kind, kind.display_name());
                            }
                        });

                    if selected != current {
                        self.bindings.bind(gesture, selected.create(None));
                        changed = true;
                        self.open_config(gesture);
                    }

                    if self.bindings.handler(gesture).has_config() {
                        if ui.add(MaterialButton::outlined(tr!("configure"))).clicked() {
                            self.open_config(gesture);
                        }
                    } else {
                        ui.label("");
                    }

                    if ui.add(MaterialButton::outlined(tr!("test"))).clicked() {
                        self.bindings.trigger(gesture);
                    }
                    ui.end_row();
                }
            });

        if changed {
            self.save_settings();
        }
    }

    fn ui_log_section(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.checkbox(&mut self.settings.show_logs, tr!("show-logs")).changed() {
                self.save_settings();
            }

            let mut level = self.settings.log_level.clone();
            egui::ComboBox::from_id_salt("log_level_selector")
                .selected_text(&level)
                .show_ui(ui, |ui| {
                    for lvl in LOG_LEVELS {
                        ui.selectable_value(&mut level, lvl.to_string(), lvl);
                    }
                });
            if level != self.settings.log_level {
                log_capture::update_tracing_level(&level.to_lowercase());
                self.settings.log_level = level;
                self.save_settings();
            }
        });

        if self.settings.show_logs {
            if ui.add(MaterialButton::outlined(tr!("clear-logs"))).clicked() {
                log_capture::clear_logs();
            }
            egui::ScrollArea::vertical()
                .max_height(200.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in log_capture::recent_logs() {
                        ui.monospace(line);
                    }
                });
        }
    }

    fn show_app_picker(&mut self, ctx: &egui::Context) {
        if !self.app_picker.open {
            return;
        }
        if self.app_picker.gesture.is_none() {
            self.app_picker.open = false;
            return;
        }

        let picked: Cell<Option<usize>> = Cell::new(None);
        let cancelled = Cell::new(false);
        let title = tr!("pick-app-title");
        let filter = &mut self.app_picker.filter;
        let apps = &self.app_picker.apps;

        dialog("app_picker_dialog", &title, &mut self.app_picker.open)
            .content(|ui| {
                ui.set_width(320.0);
                ui.text_edit_singleline(filter);
                let needle = filter.to_lowercase();
                egui::ScrollArea::vertical()
                    .max_height(360.0)
                    .show(ui, |ui| {
                        for (idx, app) in apps.iter().enumerate() {
                            if !needle.is_empty()
                                && !app.label.to_lowercase().contains(&needle)
                                && !app.package_name.contains(&needle)
                            {
                                continue;
                            }
                            if ui.selectable_label(false, &app.label).clicked() {
                                picked.set(Some(idx));
                            }
                        }
                    });
            })
            .action(tr!("cancel"), || {
                cancelled.set(true);
            })
            .show(ctx);

        if let Some(idx) = picked.get() {
            self.apply_picker_choice(Some(idx));
        } else if cancelled.get() || !self.app_picker.open {
            self.apply_picker_choice(None);
        }
    }

    /// Close the app picker, handing the chosen row (None when cancelled) to
    /// the handler that asked for it.
    pub fn apply_picker_choice(&mut self, choice: Option<usize>) {
        let picker = std::mem::take(&mut self.app_picker);
        let Some(gesture) = picker.gesture else {
            return;
        };
        match choice.and_then(|idx| picker.apps.get(idx)) {
            Some(app) => {
                let result = ConfigResult::AppPicked {
                    package: app.package_name.clone(),
                    label: app.label.clone(),
                };
                self.bindings.apply_config_result(gesture, Some(&result));
                self.save_settings();
            }
            None => self.bindings.apply_config_result(gesture, None),
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let mut messages = self.bindings.take_notifications();
        if let Some(pref) = self.store_pref.as_mut() {
            messages.extend(pref.take_notifications());
        }
        for message in messages {
            self.push_toast(message);
        }

        let now = ctx.input(|i| i.time);
        self.toasts.retain_mut(|toast| {
            let until = *toast.until.get_or_insert(now + TOAST_SECONDS);
            now < until
        });
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("launcher_toasts"))
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -96.0])
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(&toast.message);
                    });
                }
            });
        ctx.request_repaint_after(std::time::Duration::from_secs_f64(TOAST_SECONDS));
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.ui_store_section(ui);
                ui.separator();
                self.ui_gesture_section(ui);
                ui.separator();
                self.ui_log_section(ui);
            });
        });

        self.show_app_picker(ctx);
        self.show_toasts(ctx);
    }
}
