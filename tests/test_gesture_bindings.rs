use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use launcher_prefs::android_activity::{AppLauncher, ComponentName, LaunchError};
use launcher_prefs::gesture_controller::GestureBindings;
use launcher_prefs::gesture_handler::{
    handler_from_persisted, BlankGestureHandler, ConfigIntent, ConfigResult, Gesture,
    GestureHandler, HandlerKind,
};
use launcher_prefs::{Config, Settings};

#[derive(Default, Clone)]
struct SharedLauncher {
    launched: Rc<RefCell<Vec<String>>>,
}

impl AppLauncher for SharedLauncher {
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
fn test_blank_handler_serializes_class_only() {
    let handler: &dyn GestureHandler = &BlankGestureHandler;
    let value: serde_json::Value = serde_json::from_str(&handler.to_string()).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert_eq!(object["class"], "blank");
}

#[test]
fn test_blank_trigger_does_nothing() {
    launcher_prefs::init_i18n();
    let launcher = SharedLauncher::default();
    let mut bindings = GestureBindings::new(Box::new(launcher.clone()));

    bindings.trigger(Gesture::DoubleTap);
    assert!(launcher.launched.borrow().is_empty());
    assert!(bindings.take_notifications().is_empty());
}

#[test]
fn test_configured_binding_survives_settings_round_trip() {
    launcher_prefs::init_i18n();
    let launcher = SharedLauncher::default();
    let mut bindings = GestureBindings::new(Box::new(launcher.clone()));

    bindings.bind(Gesture::SwipeUp, HandlerKind::StartApp.create(None));
    assert_eq!(
        bindings.config_intent(Gesture::SwipeUp),
        Some(ConfigIntent::PickApp)
    );
    bindings.apply_config_result(
        Gesture::SwipeUp,
        Some(&ConfigResult::AppPicked {
            package: "org.example.notes".into(),
            label: "Notes".into(),
        }),
    );

    let dir = std::env::temp_dir().join(format!("launcher-prefs-test-{}", std::process::id()));
    let config = Config::with_dir(&dir).unwrap();
    let settings = Settings {
        gesture_bindings: bindings.to_settings(),
        ..Settings::default()
    };
    config.save_settings(&settings).unwrap();
    drop(bindings);

    let loaded = config.load_settings().unwrap();
    assert_eq!(loaded.gesture_bindings.len(), Gesture::ALL.len());

    let mut restored = GestureBindings::from_settings(&loaded.gesture_bindings, Box::new(launcher.clone()));
    assert_eq!(restored.handler(Gesture::SwipeUp).kind(), HandlerKind::StartApp);
    assert_eq!(restored.handler(Gesture::DoubleTap).kind(), HandlerKind::Blank);

    restored.trigger(Gesture::SwipeUp);
    assert_eq!(*launcher.launched.borrow(), vec!["org.example.notes".to_string()]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_corrupt_binding_falls_back_to_blank() {
    let mut persisted = BTreeMap::new();
    persisted.insert(Gesture::LongPress, "{\"class\":".to_string());
    persisted.insert(Gesture::HomePress, r#"{"class":"start_app","config":{"package":"a.b"}}"#.to_string());

    let bindings = GestureBindings::from_settings(&persisted, Box::new(SharedLauncher::default()));
    assert_eq!(bindings.handler(Gesture::LongPress).kind(), HandlerKind::Blank);
    assert_eq!(bindings.handler(Gesture::HomePress).kind(), HandlerKind::StartApp);
}

#[test]
fn test_unconfigured_start_app_notifies_instead_of_launching() {
    launcher_prefs::init_i18n();
    let launcher = SharedLauncher::default();
    let mut bindings = GestureBindings::new(Box::new(launcher.clone()));
    bindings.bind(Gesture::SwipeDown, handler_from_persisted(r#"{"class":"start_app"}"#));

    bindings.trigger(Gesture::SwipeDown);
    assert!(launcher.launched.borrow().is_empty());
    assert_eq!(bindings.take_notifications().len(), 1);
}
