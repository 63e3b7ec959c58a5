// usage
// let registry = AndroidPackageRegistry;
// let apps = registry.list_all_applications(true)?;

// reference
// https://developer.android.com/reference/android/content/pm/PackageManager
// getInstalledApplications(int flags)
// https://developer.android.com/reference/android/content/pm/ApplicationInfo
// packageName, flags, loadLabel(PackageManager)
// getPackageInfo(String, int) throws NameNotFoundException

pub use crate::android_packagemanager_stt::*;
use crate::calc_disabledapps::PackageRegistry;

#[cfg(target_os = "android")]
use jni::objects::{JObject, JString, JValue};
#[cfg(target_os = "android")]
use jni::JNIEnv;

#[cfg(target_os = "android")]
use ndk_context;

/// Registry backed by the host PackageManager through JNI.
#[derive(Debug, Default, Clone, Copy)]
pub struct AndroidPackageRegistry;

impl PackageRegistry for AndroidPackageRegistry {
    fn list_all_applications(
        &self,
        include_uninstalled: bool,
    ) -> std::io::Result<Vec<InstalledApplication>> {
        let flags = if include_uninstalled {
            MATCH_UNINSTALLED_PACKAGES
        } else {
            0
        };
        get_installed_applications(flags)
    }

    fn list_enabled_applications(&self) -> std::io::Result<Vec<InstalledApplication>> {
        get_installed_applications(0)
    }

    fn is_package_installed(&self, package_name: &str) -> std::io::Result<bool> {
        is_package_installed(package_name)
    }
}

#[cfg(target_os = "android")]
fn jni_err(what: &str) -> impl Fn(jni::errors::Error) -> std::io::Error + '_ {
    move |e| std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, e))
}

/// Clear a Java exception left pending by a failed call.
#[cfg(target_os = "android")]
pub(crate) fn clear_pending_exception(env: &mut JNIEnv) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

#[cfg(target_os = "android")]
pub(crate) fn with_android_env<T>(
    what: &str,
    f: impl FnOnce(&mut JNIEnv) -> jni::errors::Result<T>,
) -> std::io::Result<T> {
    let ctx = ndk_context::android_context();
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm() as _) }.map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Expected to find JVM via ndk_context crate",
        )
    })?;
    let mut env = vm.attach_current_thread().map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::Other, "Failed to attach current thread")
    })?;

    // the thread stays attached, so every local ref lives in a frame popped here
    let result = env.with_local_frame(16, |env| f(env));
    if result.is_err() {
        clear_pending_exception(&mut env);
    }
    result.map_err(jni_err(what))
}

#[cfg(target_os = "android")]
fn package_manager<'local>(env: &mut JNIEnv<'local>) -> jni::errors::Result<JObject<'local>> {
    let ctx = ndk_context::android_context();
    let activity = unsafe { JObject::from_raw(ctx.context() as _) };
    env.call_method(
        &activity,
        "getPackageManager",
        "()Landroid/content/pm/PackageManager;",
        &[],
    )?
    .l()
}

#[cfg(target_os = "android")]
fn read_application(
    env: &mut JNIEnv,
    package_manager: &JObject,
    app_list: &JObject,
    index: i32,
) -> jni::errors::Result<InstalledApplication> {
    env.with_local_frame(8, |env| {
        let app_info = env
            .call_method(app_list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])?
            .l()?;

        let package_name = env
            .get_field(&app_info, "packageName", "Ljava/lang/String;")?
            .l()?;
        let package_name: String = env.get_string(&JString::from(package_name))?.into();

        let flags = env.get_field(&app_info, "flags", "I")?.i()?;

        // loadLabel returns a CharSequence, stringify it on the Java side
        let label = env
            .call_method(
                &app_info,
                "loadLabel",
                "(Landroid/content/pm/PackageManager;)Ljava/lang/CharSequence;",
                &[JValue::Object(package_manager)],
            )
            .and_then(|v| v.l())
            .and_then(|seq| env.call_method(&seq, "toString", "()Ljava/lang/String;", &[]))
            .and_then(|v| v.l());
        let label = match label {
            Ok(obj) if !obj.is_null() => env
                .get_string(&JString::from(obj))
                .map(String::from)
                .unwrap_or_else(|_| package_name.clone()),
            _ => {
                clear_pending_exception(env);
                package_name.clone()
            }
        };

        Ok(InstalledApplication {
            package_name,
            flags,
            label,
        })
    })
}

#[cfg(target_os = "android")]
pub fn get_installed_applications(flags: i32) -> std::io::Result<Vec<InstalledApplication>> {
    let apps = with_android_env("getInstalledApplications failed", |env| {
        let package_manager = package_manager(env)?;
        let app_list = env
            .call_method(
                &package_manager,
                "getInstalledApplications",
                "(I)Ljava/util/List;",
                &[JValue::Int(flags)],
            )?
            .l()?;
        let size = env.call_method(&app_list, "size", "()I", &[])?.i()?;

        let mut apps = Vec::with_capacity(size.max(0) as usize);
        for i in 0..size {
            apps.push(read_application(env, &package_manager, &app_list, i)?);
        }
        Ok(apps)
    })?;

    log::debug!("getInstalledApplications({:#x}) returned {} apps", flags, apps.len());
    Ok(apps)
}

/// PackageManager.getPackageInfo; NameNotFoundException means not installed.
#[cfg(target_os = "android")]
pub fn is_package_installed(package_name: &str) -> std::io::Result<bool> {
    with_android_env("getPackageInfo failed", |env| {
        let package_manager = package_manager(env)?;
        let package = env.new_string(package_name)?;
        match env.call_method(
            &package_manager,
            "getPackageInfo",
            "(Ljava/lang/String;I)Landroid/content/pm/PackageInfo;",
            &[JValue::Object(&package), JValue::Int(GET_META_DATA)],
        ) {
            Ok(info) => Ok(!info.l()?.is_null()),
            Err(jni::errors::Error::JavaException) => {
                env.exception_clear()?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    })
}

// Non-Android stub implementation
#[cfg(not(target_os = "android"))]
pub fn get_installed_applications(_flags: i32) -> std::io::Result<Vec<InstalledApplication>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "PackageManager is only available on Android",
    ))
}

#[cfg(not(target_os = "android"))]
pub fn is_package_installed(_package_name: &str) -> std::io::Result<bool> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "PackageManager is only available on Android",
    ))
}
