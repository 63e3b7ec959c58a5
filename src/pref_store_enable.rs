pub use crate::pref_store_enable_stt::*;
use eframe::egui;
use egui_i18n::tr;
use egui_material3::dialog;
use std::cell::Cell;
use tracing::{error, info, warn};

use crate::android_activity::{AppLauncher, ComponentName, LaunchError};
use crate::calc_disabledapps::{is_package_disabled, PackageRegistry};

impl StoreEnablePreference {
    /// Builds the row and sets its summary from a fresh registry scan.
    pub fn new<R: PackageRegistry + ?Sized>(
        registry: &R,
        store_package: impl Into<String>,
        enabler: ComponentName,
    ) -> std::io::Result<Self> {
        let mut pref = Self {
            store_package: store_package.into(),
            enabler,
            state: StoreState::Disabled,
            summary: tr!("store-enable-summary"),
            dialog_open: false,
            notifications: Vec::new(),
        };
        pref.refresh(registry)?;
        Ok(pref)
    }

    /// Re-scan the registry. Never cached, the platform sends no change signal.
    pub fn refresh<R: PackageRegistry + ?Sized>(
        &mut self,
        registry: &R,
    ) -> std::io::Result<StoreState> {
        let state = if is_package_disabled(registry, &self.store_package)? {
            StoreState::Disabled
        } else {
            StoreState::Enabled
        };
        self.set_state(state);
        Ok(state)
    }

    // state and summary only change together
    fn set_state(&mut self, state: StoreState) {
        self.state = state;
        self.summary = match state {
            StoreState::Enabled => tr!("store-already-enabled-summary"),
            StoreState::Disabled => tr!("store-enable-summary"),
        };
    }

    pub fn on_click<R: PackageRegistry + ?Sized>(
        &mut self,
        registry: &R,
    ) -> std::io::Result<ClickOutcome> {
        match self.refresh(registry)? {
            StoreState::Enabled => {
                self.notify(tr!("store-already-enabled"));
                Ok(ClickOutcome::AlreadyEnabled)
            }
            StoreState::Disabled => {
                self.dialog_open = true;
                Ok(ClickOutcome::DialogShown)
            }
        }
    }

    /// Affirmative dialog action: one launch of the enabler app, after
    /// checking it is installed.
    pub fn confirm<R: PackageRegistry + ?Sized>(
        &mut self,
        registry: &R,
        launcher: &mut dyn AppLauncher,
    ) -> Result<(), LaunchError> {
        self.dialog_open = false;

        match registry.is_package_installed(&self.enabler.package) {
            Ok(true) => {}
            Ok(false) => {
                warn!("Store enabler {} is not installed", self.enabler.package);
                self.notify(tr!("app-not-installed", { name: self.enabler.package.clone() }));
                return Err(LaunchError::ActivityNotFound(self.enabler.flatten()));
            }
            Err(e) => {
                error!("Failed to query installed applications: {}", e);
                self.notify(tr!("registry-query-failed", { error: e.to_string() }));
                return Err(e.into());
            }
        }

        info!("Launching store enabler {}", self.enabler);
        match launcher.launch_component(&self.enabler) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Store enabler launch failed: {}", e);
                let msg = match &e {
                    LaunchError::ActivityNotFound(_) => {
                        tr!("app-not-installed", { name: self.enabler.package.clone() })
                    }
                    other => tr!("launch-failed", { error: other.to_string() }),
                };
                self.notify(msg);
                Err(e)
            }
        }
    }

    /// Dismissive dialog action.
    pub fn cancel(&mut self) {
        self.dialog_open = false;
    }

    /// Apply the button pressed in the confirmation dialog.
    pub fn apply_dialog_action<R: PackageRegistry + ?Sized>(
        &mut self,
        action: DialogAction,
        registry: &R,
        launcher: &mut dyn AppLauncher,
    ) -> Result<(), LaunchError> {
        match action {
            DialogAction::Confirm => self.confirm(registry, launcher),
            DialogAction::Cancel => {
                self.cancel();
                Ok(())
            }
        }
    }

    fn notify(&mut self, message: String) {
        self.notifications.push(message);
    }

    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    /// Renders the preference row and its dialog.
    pub fn show<R: PackageRegistry + ?Sized>(
        &mut self,
        ui: &mut egui::Ui,
        registry: &R,
        launcher: &mut dyn AppLauncher,
    ) {
        let response = ui
            .vertical(|ui| {
                let title = ui.selectable_label(false, tr!("store-enable-title"));
                ui.weak(&self.summary);
                title
            })
            .inner;

        if response.clicked() {
            if let Err(e) = self.on_click(registry) {
                error!("Failed to query installed applications: {}", e);
                self.notify(tr!("registry-query-failed", { error: e.to_string() }));
            }
        }

        let ctx = ui.ctx().clone();
        self.show_dialog(&ctx, registry, launcher);
    }

    fn show_dialog<R: PackageRegistry + ?Sized>(
        &mut self,
        ctx: &egui::Context,
        registry: &R,
        launcher: &mut dyn AppLauncher,
    ) {
        if !self.dialog_open {
            return;
        }

        let action: Cell<Option<DialogAction>> = Cell::new(None);
        let title = tr!("store-enable-dialog-title");
        let message = tr!("store-enable-dialog-message");

        dialog("store_enable_dialog", &title, &mut self.dialog_open)
            .content(|ui| {
                ui.set_width(300.0);
                ui.label(message.clone());
            })
            .action(tr!("cancel"), || {
                action.set(Some(DialogAction::Cancel));
            })
            .primary_action(tr!("ok"), || {
                action.set(Some(DialogAction::Confirm));
            })
            .show(ctx);

        if let Some(action) = action.get() {
            // failures are logged and queued as notifications
            let _ = self.apply_dialog_action(action, registry, launcher);
        }
    }
}
