// Disabled system apps = {all system apps} - {enabled apps}
//
// usage
// let disabled = resolve_disabled_system_apps(&registry)?;
// let store_disabled = is_package_disabled(&registry, "com.android.vending")?;
//
// Display names are ordered with a locale collator (icu_collator), the locale
// comes from Settings::language via set_display_name_locale.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{OnceLock, RwLock};

use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::Locale;

pub use crate::android_packagemanager_stt::InstalledApplication;
use tracing::{debug, warn};

/// Read access to the platform application registry.
pub trait PackageRegistry {
    /// Every application known to the platform, optionally including packages
    /// that are uninstalled for the current user but still have metadata.
    fn list_all_applications(
        &self,
        include_uninstalled: bool,
    ) -> std::io::Result<Vec<InstalledApplication>>;

    /// Applications currently enabled for the current user.
    fn list_enabled_applications(&self) -> std::io::Result<Vec<InstalledApplication>>;

    /// True if `package_name` is installed for the current user, enabled or not.
    fn is_package_installed(&self, package_name: &str) -> std::io::Result<bool> {
        Ok(self
            .list_all_applications(false)?
            .iter()
            .any(|app| app.package_name == package_name))
    }
}

impl<R: PackageRegistry + ?Sized> PackageRegistry for &R {
    fn list_all_applications(
        &self,
        include_uninstalled: bool,
    ) -> std::io::Result<Vec<InstalledApplication>> {
        (**self).list_all_applications(include_uninstalled)
    }

    fn list_enabled_applications(&self) -> std::io::Result<Vec<InstalledApplication>> {
        (**self).list_enabled_applications()
    }

    fn is_package_installed(&self, package_name: &str) -> std::io::Result<bool> {
        (**self).is_package_installed(package_name)
    }
}

impl<R: PackageRegistry + ?Sized> PackageRegistry for Box<R> {
    fn list_all_applications(
        &self,
        include_uninstalled: bool,
    ) -> std::io::Result<Vec<InstalledApplication>> {
        (**self).list_all_applications(include_uninstalled)
    }

    fn list_enabled_applications(&self) -> std::io::Result<Vec<InstalledApplication>> {
        (**self).list_enabled_applications()
    }

    fn is_package_installed(&self, package_name: &str) -> std::io::Result<bool> {
        (**self).is_package_installed(package_name)
    }
}

static SORT_LOCALE: OnceLock<RwLock<String>> = OnceLock::new();

fn sort_locale() -> &'static RwLock<String> {
    SORT_LOCALE.get_or_init(|| RwLock::new("en-US".to_string()))
}

/// Locale used by `resolve_disabled_system_apps` and the app picker.
pub fn set_display_name_locale(language: &str) {
    if let Ok(mut locale) = sort_locale().write() {
        *locale = language.to_string();
    }
}

pub fn display_name_locale() -> String {
    sort_locale()
        .read()
        .map(|locale| locale.clone())
        .unwrap_or_else(|_| "en-US".to_string())
}

/// Locale-aware ordering of application display names.
pub struct DisplayNameOrder {
    collator: Option<Collator>,
}

impl DisplayNameOrder {
    pub fn for_language(language: &str) -> Self {
        let locale = language.parse::<Locale>().unwrap_or_else(|e| {
            warn!("Invalid sort locale {:?}: {}", language, e);
            Locale::UND
        });
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Tertiary);
        let collator = match Collator::try_new(&locale.into(), options) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!("No collator for {:?}, comparing lowercase text: {}", language, e);
                None
            }
        };
        Self { collator }
    }

    pub fn current() -> Self {
        Self::for_language(&display_name_locale())
    }

    /// Collation order first, raw text as tie breaker.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let primary = match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        primary.then_with(|| a.cmp(b))
    }

    /// Stable sort of `apps` by label.
    pub fn sort(&self, apps: &mut [InstalledApplication]) {
        apps.sort_by(|a, b| self.compare(&a.label, &b.label));
    }
}

/// Package ids of system apps present in the full registry but missing from the
/// enabled query, ordered by display name. Not cached: every call hits the registry.
pub fn resolve_disabled_system_apps<R: PackageRegistry + ?Sized>(
    registry: &R,
) -> std::io::Result<Vec<String>> {
    let mut all_apps = registry.list_all_applications(true)?;
    DisplayNameOrder::current().sort(&mut all_apps);

    let enabled_apps = registry.list_enabled_applications()?;
    let enabled: HashSet<&str> = enabled_apps
        .iter()
        .map(|app| app.package_name.as_str())
        .collect();

    let mut seen = HashSet::new();
    let disabled: Vec<String> = all_apps
        .iter()
        .filter(|app| app.is_system() && !enabled.contains(app.package_name.as_str()))
        .filter(|app| seen.insert(app.package_name.as_str()))
        .map(|app| app.package_name.clone())
        .collect();

    debug!(
        "Resolved {} disabled system apps ({} total, {} enabled)",
        disabled.len(),
        all_apps.len(),
        enabled_apps.len()
    );
    Ok(disabled)
}

/// True if `package_name` is a disabled system app right now.
pub fn is_package_disabled<R: PackageRegistry + ?Sized>(
    registry: &R,
    package_name: &str,
) -> std::io::Result<bool> {
    Ok(resolve_disabled_system_apps(registry)?
        .iter()
        .any(|pkg| pkg == package_name))
}
