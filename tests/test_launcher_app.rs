use std::cell::RefCell;
use std::rc::Rc;

use launcher_prefs::android_activity::{AppLauncher, ComponentName, LaunchError};
use launcher_prefs::android_contentprovider::ContentResolver;
use launcher_prefs::android_packagemanager_stt::{InstalledApplication, FLAG_SYSTEM};
use launcher_prefs::calc_disabledapps::PackageRegistry;
use launcher_prefs::gesture_handler::{Gesture, HandlerKind};
use launcher_prefs::launcher_app_stt::PlatformBackends;
use launcher_prefs::{LauncherApp, Settings};

struct StaticRegistry;

impl PackageRegistry for StaticRegistry {
    fn list_all_applications(
        &self,
        _include_uninstalled: bool,
    ) -> std::io::Result<Vec<InstalledApplication>> {
        let mut apps = self.list_enabled_applications()?;
        apps.push(InstalledApplication::new(
            "com.android.vending",
            FLAG_SYSTEM,
            "Google Play Store",
        ));
        Ok(apps)
    }

    fn list_enabled_applications(&self) -> std::io::Result<Vec<InstalledApplication>> {
        Ok(vec![
            InstalledApplication::new("org.example.notes", 0, "Notes"),
            InstalledApplication::new("org.example.clock", 0, "Clock"),
        ])
    }
}

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

#[derive(Default, Clone)]
struct SharedResolver {
    queries: Rc<RefCell<Vec<(String, String)>>>,
    answer: Option<String>,
}

impl ContentResolver for SharedResolver {
    fn query(&self, uri: &str, selection: &str) -> std::io::Result<Option<String>> {
        self.queries
            .borrow_mut()
            .push((uri.to_string(), selection.to_string()));
        Ok(self.answer.clone())
    }
}

fn app(gestures: &SharedLauncher, content: &SharedResolver) -> LauncherApp {
    launcher_prefs::init_i18n();
    LauncherApp::new(
        None,
        Settings::default(),
        PlatformBackends {
            registry: Box::new(StaticRegistry),
            launcher: Box::new(SharedLauncher::default()),
            gesture_launcher: Box::new(gestures.clone()),
            content: Box::new(content.clone()),
        },
    )
}

#[test]
fn test_picker_lists_apps_by_name_and_applies_choice() {
    let gestures = SharedLauncher::default();
    let mut app = app(&gestures, &SharedResolver::default());

    app.bindings
        .bind(Gesture::SwipeUp, HandlerKind::StartApp.create(None));
    app.open_config(Gesture::SwipeUp);
    assert!(app.app_picker.open);
    let labels: Vec<&str> = app.app_picker.apps.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(labels, vec!["Clock", "Notes"]);

    app.apply_picker_choice(Some(1));
    assert!(!app.app_picker.open);

    app.bindings.trigger(Gesture::SwipeUp);
    assert_eq!(*gestures.launched.borrow(), vec!["org.example.notes".to_string()]);
}

#[test]
fn test_picker_cancel_leaves_handler_unconfigured() {
    let gestures = SharedLauncher::default();
    let mut app = app(&gestures, &SharedResolver::default());

    app.bindings
        .bind(Gesture::LongPress, HandlerKind::StartApp.create(None));
    app.open_config(Gesture::LongPress);
    assert!(app.app_picker.open);

    app.apply_picker_choice(None);
    assert!(!app.app_picker.open);

    app.bindings.trigger(Gesture::LongPress);
    assert!(gestures.launched.borrow().is_empty());
    assert_eq!(app.bindings.take_notifications().len(), 1);
}

#[test]
fn test_store_visibility_goes_through_content_provider() {
    let content = SharedResolver {
        answer: Some("ok".to_string()),
        ..Default::default()
    };
    let mut app = app(&SharedLauncher::default(), &content);

    app.set_store_visible(false);
    app.set_store_visible(true);
    assert_eq!(
        *content.queries.borrow(),
        vec![
            (
                "content://io.fieldx.content.provider/action/25".to_string(),
                "com.android.vending".to_string()
            ),
            (
                "content://io.fieldx.content.provider/action/26".to_string(),
                "com.android.vending".to_string()
            ),
        ]
    );
    assert_eq!(app.toasts.len(), 2);
}
