// Android Activity launcher for opening external apps via JNI
// Provides explicit-component and by-package launches behind the AppLauncher trait.

use std::fmt;

#[cfg(target_os = "android")]
use jni::objects::JValue;

#[cfg(target_os = "android")]
use ndk_context;

/// Explicit (package, activity class) pair, as ComponentName on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentName {
    pub package: String,
    pub class: String,
}

impl ComponentName {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }

    /// Parse `pkg/cls`. A class starting with `.` is relative to the package.
    pub fn unflatten(text: &str) -> Option<Self> {
        let (package, class) = text.trim().split_once('/')?;
        if package.is_empty() || class.is_empty() {
            return None;
        }
        let class = if class.starts_with('.') {
            format!("{}{}", package, class)
        } else {
            class.to_string()
        };
        Some(Self {
            package: package.to_string(),
            class,
        })
    }

    pub fn flatten(&self) -> String {
        format!("{}/{}", self.package, self.class)
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("no activity found to handle {0}")]
    ActivityNotFound(String),
    #[error("platform error: {0}")]
    Platform(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error for a `startActivity` call that threw. Only ActivityNotFoundException
/// means the target is missing.
pub fn launch_failure(target: String, activity_not_found: bool, detail: &str) -> LaunchError {
    if activity_not_found {
        LaunchError::ActivityNotFound(target)
    } else {
        LaunchError::Platform(format!("{}: {}", target, detail))
    }
}

/// Starts external activities.
pub trait AppLauncher {
    fn launch_component(&mut self, component: &ComponentName) -> Result<(), LaunchError>;
    fn launch_package(&mut self, package_name: &str) -> Result<(), LaunchError>;
}

impl<L: AppLauncher + ?Sized> AppLauncher for Box<L> {
    fn launch_component(&mut self, component: &ComponentName) -> Result<(), LaunchError> {
        (**self).launch_component(component)
    }

    fn launch_package(&mut self, package_name: &str) -> Result<(), LaunchError> {
        (**self).launch_package(package_name)
    }
}

/// Launcher using the hosting Activity's context.
#[derive(Debug, Default, Clone, Copy)]
pub struct AndroidLauncher;

#[cfg(target_os = "android")]
impl From<jni::errors::Error> for LaunchError {
    fn from(e: jni::errors::Error) -> Self {
        LaunchError::Platform(e.to_string())
    }
}

/// Take the pending exception after a failed `startActivity`.
#[cfg(target_os = "android")]
fn pending_launch_error(
    env: &mut jni::JNIEnv,
    target: String,
    err: jni::errors::Error,
) -> LaunchError {
    let throwable = match env.exception_occurred() {
        Ok(throwable) if !throwable.is_null() => throwable,
        _ => return launch_failure(target, false, &err.to_string()),
    };
    let _ = env.exception_clear();

    let not_found = env
        .is_instance_of(&throwable, "android/content/ActivityNotFoundException")
        .unwrap_or(false);
    let detail = env
        .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .and_then(|obj| env.get_string(&jni::objects::JString::from(obj)).map(String::from))
        .unwrap_or_else(|_| err.to_string());
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    launch_failure(target, not_found, &detail)
}

#[cfg(target_os = "android")]
impl AppLauncher for AndroidLauncher {
    fn launch_component(&mut self, component: &ComponentName) -> Result<(), LaunchError> {
        let ctx = ndk_context::android_context();
        let vm = unsafe { jni::JavaVM::from_raw(ctx.vm() as _) }?;
        let activity = unsafe { jni::objects::JObject::from_raw(ctx.context() as _) };
        let mut env = vm.attach_current_thread()?;

        let intent_class = env.find_class("android/content/Intent")?;
        let action = env.new_string("android.intent.action.MAIN")?;
        let intent = env.new_object(
            &intent_class,
            "(Ljava/lang/String;)V",
            &[JValue::Object(&action)],
        )?;

        let category = env.new_string("android.intent.category.LAUNCHER")?;
        env.call_method(
            &intent,
            "addCategory",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&category)],
        )?;

        let pkg = env.new_string(&component.package)?;
        let cls = env.new_string(&component.class)?;
        env.call_method(
            &intent,
            "setClassName",
            "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&pkg), JValue::Object(&cls)],
        )?;

        // FLAG_ACTIVITY_NEW_TASK
        env.call_method(
            &intent,
            "addFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(0x10000000)],
        )?;

        match env.call_method(
            &activity,
            "startActivity",
            "(Landroid/content/Intent;)V",
            &[JValue::Object(&intent)],
        ) {
            Ok(_) => {
                log::info!("Started activity {}", component);
                Ok(())
            }
            Err(e) => Err(pending_launch_error(&mut env, component.flatten(), e)),
        }
    }

    fn launch_package(&mut self, package_name: &str) -> Result<(), LaunchError> {
        let ctx = ndk_context::android_context();
        let vm = unsafe { jni::JavaVM::from_raw(ctx.vm() as _) }?;
        let activity = unsafe { jni::objects::JObject::from_raw(ctx.context() as _) };
        let mut env = vm.attach_current_thread()?;

        let pm = env
            .call_method(
                &activity,
                "getPackageManager",
                "()Landroid/content/pm/PackageManager;",
                &[],
            )?
            .l()?;

        let package = env.new_string(package_name)?;
        let launch_intent = env
            .call_method(
                &pm,
                "getLaunchIntentForPackage",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&package)],
            )?
            .l()?;

        if launch_intent.is_null() {
            return Err(LaunchError::ActivityNotFound(package_name.to_string()));
        }

        match env.call_method(
            &activity,
            "startActivity",
            "(Landroid/content/Intent;)V",
            &[JValue::Object(&launch_intent)],
        ) {
            Ok(_) => Ok(()),
            Err(e) => Err(pending_launch_error(&mut env, package_name.to_string(), e)),
        }
    }
}

// Non-Android stub implementation
#[cfg(not(target_os = "android"))]
impl AppLauncher for AndroidLauncher {
    fn launch_component(&mut self, component: &ComponentName) -> Result<(), LaunchError> {
        tracing::debug!("launch_component({}) is only available on Android", component);
        Err(LaunchError::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "activity launch is only available on Android",
        )))
    }

    fn launch_package(&mut self, package_name: &str) -> Result<(), LaunchError> {
        tracing::debug!("launch_package({}) is only available on Android", package_name);
        Err(LaunchError::Io(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "activity launch is only available on Android",
        )))
    }
}
