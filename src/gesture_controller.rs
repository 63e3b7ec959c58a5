// usage
// let mut bindings = GestureBindings::from_settings(&settings.gesture_bindings, launcher);
// bindings.bind(Gesture::DoubleTap, HandlerKind::StartApp.create(None));
// bindings.trigger(Gesture::DoubleTap);
// settings.gesture_bindings = bindings.to_settings();

use std::collections::BTreeMap;

use egui_i18n::tr;
use tracing::{debug, info, warn};

use crate::android_activity::{AppLauncher, ComponentName, LaunchError};
use crate::gesture_handler::{
    handler_from_persisted, BlankGestureHandler, ConfigIntent, ConfigResult, Gesture,
    GestureHandler,
};

/// Handle handlers use to act on the host: start activities, show messages.
pub struct GestureController {
    launcher: Box<dyn AppLauncher>,
    notifications: Vec<String>,
}

impl GestureController {
    pub fn new(launcher: Box<dyn AppLauncher>) -> Self {
        Self {
            launcher,
            notifications: Vec::new(),
        }
    }

    pub fn launch_package(&mut self, package_name: &str) -> Result<(), LaunchError> {
        let result = self.launcher.launch_package(package_name);
        self.report(package_name, result)
    }

    pub fn launch_component(&mut self, component: &ComponentName) -> Result<(), LaunchError> {
        let result = self.launcher.launch_component(component);
        self.report(&component.flatten(), result)
    }

    fn report(&mut self, target: &str, result: Result<(), LaunchError>) -> Result<(), LaunchError> {
        if let Err(e) = &result {
            warn!("Gesture launch of {} failed: {}", target, e);
            let msg = match e {
                LaunchError::ActivityNotFound(_) => {
                    tr!("app-not-installed", { name: target.to_string() })
                }
                other => tr!("launch-failed", { error: other.to_string() }),
            };
            self.notify(msg);
        }
        result
    }

    /// Queue a transient message for the UI.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notifications.push(message.into());
    }

    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }
}

/// Every gesture mapped to exactly one live handler.
pub struct GestureBindings {
    controller: GestureController,
    handlers: BTreeMap<Gesture, Box<dyn GestureHandler>>,
}

impl GestureBindings {
    pub fn new(launcher: Box<dyn AppLauncher>) -> Self {
        let handlers = Gesture::ALL
            .iter()
            .map(|g| (*g, Box::new(BlankGestureHandler) as Box<dyn GestureHandler>))
            .collect();
        Self {
            controller: GestureController::new(launcher),
            handlers,
        }
    }

    /// Rebuild bindings from persisted strings. Unreadable entries become blank.
    pub fn from_settings(
        persisted: &BTreeMap<Gesture, String>,
        launcher: Box<dyn AppLauncher>,
    ) -> Self {
        let mut bindings = Self::new(launcher);
        for (gesture, text) in persisted {
            bindings
                .handlers
                .insert(*gesture, handler_from_persisted(text));
        }
        debug!("Loaded {} gesture bindings", persisted.len());
        bindings
    }

    pub fn to_settings(&self) -> BTreeMap<Gesture, String> {
        self.handlers
            .iter()
            .map(|(gesture, handler)| (*gesture, handler.to_string()))
            .collect()
    }

    pub fn handler(&self, gesture: Gesture) -> &dyn GestureHandler {
        // every gesture is bound from construction on
        self.handlers[&gesture].as_ref()
    }

    /// Replace the handler of `gesture`, retiring the previous one.
    pub fn bind(&mut self, gesture: Gesture, handler: Box<dyn GestureHandler>) {
        info!("Binding {:?} to {:?}", gesture, handler.kind());
        if let Some(mut previous) = self.handlers.insert(gesture, handler) {
            previous.on_destroy();
        }
    }

    pub fn unbind(&mut self, gesture: Gesture) {
        self.bind(gesture, Box::new(BlankGestureHandler));
    }

    pub fn trigger(&mut self, gesture: Gesture) {
        if let Some(handler) = self.handlers.get_mut(&gesture) {
            debug!("Gesture {:?} -> {:?}", gesture, handler.kind());
            handler.on_gesture_trigger(&mut self.controller);
        }
    }

    pub fn config_intent(&self, gesture: Gesture) -> Option<ConfigIntent> {
        self.handlers
            .get(&gesture)
            .and_then(|h| h.config())
            .and_then(|c| c.config_intent())
    }

    pub fn apply_config_result(&mut self, gesture: Gesture, data: Option<&ConfigResult>) {
        if let Some(config) = self
            .handlers
            .get_mut(&gesture)
            .and_then(|h| h.config_mut())
        {
            config.on_config_result(data);
        }
    }

    pub fn take_notifications(&mut self) -> Vec<String> {
        self.controller.take_notifications()
    }
}

impl Drop for GestureBindings {
    fn drop(&mut self) {
        for handler in self.handlers.values_mut() {
            handler.on_destroy();
        }
    }
}
