// Pluggable actions bound to home screen gestures.
//
// A handler is persisted as {"class": <tag>} or {"class": <tag>, "config": {...}}
// and rebuilt from that text by parse_handler / handler_from_persisted.

use std::fmt;

use egui_i18n::tr;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::gesture_controller::GestureController;
pub use crate::gesture_handler_stt::*;

/// Action performed when a bound gesture fires.
pub trait GestureHandler {
    fn kind(&self) -> HandlerKind;

    /// Localized, user facing name.
    fn display_name(&self) -> String;

    /// Called by the controller when the bound gesture fires.
    fn on_gesture_trigger(&mut self, controller: &mut GestureController);

    /// Configuration capability, for handlers that have one.
    fn config(&self) -> Option<&dyn HandlerConfig> {
        None
    }

    fn config_mut(&mut self) -> Option<&mut dyn HandlerConfig> {
        None
    }

    fn has_config(&self) -> bool {
        self.config().is_some()
    }

    /// Called once when the handler is unbound or replaced. Anything acquired
    /// after construction must be released here.
    fn on_destroy(&mut self) {}
}

/// Optional capability of a handler that carries user configuration.
pub trait HandlerConfig {
    fn config_intent(&self) -> Option<ConfigIntent> {
        None
    }

    /// Write the current configuration into a fresh, empty object.
    fn save_config(&self, config: &mut Map<String, Value>);

    fn on_config_result(&mut self, data: Option<&ConfigResult>);
}

impl HandlerKind {
    pub fn create(self, config: Option<&Map<String, Value>>) -> Box<dyn GestureHandler> {
        match self {
            HandlerKind::Blank => Box::new(BlankGestureHandler),
            HandlerKind::StartApp => Box::new(StartAppGestureHandler::from_config(config)),
        }
    }

    pub fn display_name(self) -> String {
        match self {
            HandlerKind::Blank => tr!("action-none"),
            HandlerKind::StartApp => tr!("action-open-app"),
        }
    }
}

impl Gesture {
    pub fn display_name(self) -> String {
        match self {
            Gesture::DoubleTap => tr!("gesture-double-tap"),
            Gesture::SwipeUp => tr!("gesture-swipe-up"),
            Gesture::SwipeDown => tr!("gesture-swipe-down"),
            Gesture::LongPress => tr!("gesture-long-press"),
            Gesture::HomePress => tr!("gesture-home-press"),
        }
    }
}

pub fn persisted_form(handler: &dyn GestureHandler) -> PersistedHandler {
    let config = handler.config().map(|capability| {
        let mut config = Map::new();
        capability.save_config(&mut config);
        config
    });
    PersistedHandler {
        class: handler.kind(),
        config,
    }
}

impl fmt::Display for dyn GestureHandler + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(&persisted_form(self)).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Debug for dyn GestureHandler + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureHandler")
            .field("kind", &self.kind())
            .field("has_config", &self.has_config())
            .finish()
    }
}

pub fn parse_handler(text: &str) -> Result<Box<dyn GestureHandler>, serde_json::Error> {
    let persisted: PersistedHandler = serde_json::from_str(text)?;
    Ok(persisted.class.create(persisted.config.as_ref()))
}

/// Like [`parse_handler`], falling back to the blank handler.
pub fn handler_from_persisted(text: &str) -> Box<dyn GestureHandler> {
    match parse_handler(text) {
        Ok(handler) => handler,
        Err(e) => {
            warn!("Ignoring unreadable gesture binding {:?}: {}", text, e);
            Box::new(BlankGestureHandler)
        }
    }
}

/// Does nothing. Default for every unbound gesture.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlankGestureHandler;

impl GestureHandler for BlankGestureHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Blank
    }

    fn display_name(&self) -> String {
        tr!("action-none")
    }

    fn on_gesture_trigger(&mut self, _controller: &mut GestureController) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartAppTarget {
    pub package: String,
    #[serde(default)]
    pub label: String,
}

/// Opens an app picked by the user.
#[derive(Debug, Default, Clone)]
pub struct StartAppGestureHandler {
    pub target: Option<StartAppTarget>,
}

impl StartAppGestureHandler {
    pub fn from_config(config: Option<&Map<String, Value>>) -> Self {
        let target = config.and_then(|config| {
            if config.is_empty() {
                return None;
            }
            match StartAppTarget::deserialize(Value::Object(config.clone())) {
                Ok(target) if !target.package.is_empty() => Some(target),
                Ok(_) => None,
                Err(e) => {
                    warn!("StartApp: malformed config {:?}: {}", config, e);
                    None
                }
            }
        });
        Self { target }
    }
}

impl GestureHandler for StartAppGestureHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::StartApp
    }

    fn display_name(&self) -> String {
        match &self.target {
            Some(target) => {
                let name = if target.label.is_empty() {
                    target.package.clone()
                } else {
                    target.label.clone()
                };
                tr!("action-open-app-named", { name: name })
            }
            None => tr!("action-open-app"),
        }
    }

    fn on_gesture_trigger(&mut self, controller: &mut GestureController) {
        match &self.target {
            Some(target) => {
                // failure is already surfaced to the user by the controller
                let _ = controller.launch_package(&target.package);
            }
            None => controller.notify(tr!("gesture-no-app-selected")),
        }
    }

    fn config(&self) -> Option<&dyn HandlerConfig> {
        Some(self)
    }

    fn config_mut(&mut self) -> Option<&mut dyn HandlerConfig> {
        Some(self)
    }
}

impl HandlerConfig for StartAppGestureHandler {
    fn config_intent(&self) -> Option<ConfigIntent> {
        Some(ConfigIntent::PickApp)
    }

    fn save_config(&self, config: &mut Map<String, Value>) {
        if let Some(target) = &self.target {
            config.insert("package".into(), Value::String(target.package.clone()));
            config.insert("label".into(), Value::String(target.label.clone()));
        }
    }

    fn on_config_result(&mut self, data: Option<&ConfigResult>) {
        // None means the picker was cancelled; keep the previous target
        if let Some(ConfigResult::AppPicked { package, label }) = data {
            self.target = Some(StartAppTarget {
                package: package.clone(),
                label: label.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::android_activity::{AppLauncher, ComponentName, LaunchError};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct RecordingLauncher {
        launched: Rc<RefCell<Vec<String>>>,
    }

    impl AppLauncher for RecordingLauncher {
        fn launch_component(&mut self, component: &ComponentName) -> Result<(), LaunchError> {
            self.launched.borrow_mut().push(component.flatten());
            Ok(())
        }

        fn launch_package(&mut self, package_name: &str) -> Result<(), LaunchError> {
            self.launched.borrow_mut().push(package_name.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_blank_persists_class_only() {
        let handler: Box<dyn GestureHandler> = Box::new(BlankGestureHandler);
        assert!(!handler.has_config());
        assert_eq!(handler.to_string(), r#"{"class":"blank"}"#);
    }

    #[test]
    fn test_blank_trigger_has_no_side_effect() {
        let launcher = RecordingLauncher::default();
        let mut controller = GestureController::new(Box::new(launcher.clone()));
        let mut handler = BlankGestureHandler;
        handler.on_gesture_trigger(&mut controller);
        assert!(launcher.launched.borrow().is_empty());
        assert!(controller.take_notifications().is_empty());
    }

    #[test]
    fn test_start_app_config_written_by_save_config() {
        let mut handler = StartAppGestureHandler::default();
        handler.on_config_result(Some(&ConfigResult::AppPicked {
            package: "org.example.notes".into(),
            label: "Notes".into(),
        }));
        let handler: Box<dyn GestureHandler> = Box::new(handler);

        let value: Value = serde_json::from_str(&handler.to_string()).unwrap();
        assert_eq!(value["class"], "start_app");
        assert_eq!(value["config"]["package"], "org.example.notes");
        assert_eq!(value["config"]["label"], "Notes");
    }

    #[test]
    fn test_unconfigured_start_app_has_empty_config() {
        let handler: Box<dyn GestureHandler> = Box::new(StartAppGestureHandler::default());
        assert_eq!(handler.to_string(), r#"{"class":"start_app","config":{}}"#);
    }

    #[test]
    fn test_parse_restores_target() {
        let handler =
            parse_handler(r#"{"class":"start_app","config":{"package":"a.b","label":"AB"}}"#)
                .unwrap();
        assert_eq!(handler.kind(), HandlerKind::StartApp);

        let launcher = RecordingLauncher::default();
        let mut controller = GestureController::new(Box::new(launcher.clone()));
        let mut handler = handler;
        handler.on_gesture_trigger(&mut controller);
        assert_eq!(*launcher.launched.borrow(), vec!["a.b".to_string()]);
    }

    #[test]
    fn test_unknown_class_falls_back_to_blank() {
        assert!(parse_handler(r#"{"class":"teleport"}"#).is_err());
        let handler = handler_from_persisted(r#"{"class":"teleport"}"#);
        assert_eq!(handler.kind(), HandlerKind::Blank);
        assert_eq!(handler_from_persisted("not json").kind(), HandlerKind::Blank);
    }

    #[test]
    fn test_malformed_config_is_ignored() {
        let handler = StartAppGestureHandler::from_config(
            serde_json::from_str::<Map<String, Value>>(r#"{"package": 42}"#)
                .ok()
                .as_ref(),
        );
        assert!(handler.target.is_none());
    }

    #[test]
    fn test_cancelled_picker_keeps_target() {
        let mut handler = StartAppGestureHandler {
            target: Some(StartAppTarget {
                package: "a.b".into(),
                label: String::new(),
            }),
        };
        handler.on_config_result(None);
        assert_eq!(handler.target.as_ref().map(|t| t.package.as_str()), Some("a.b"));
    }
}
