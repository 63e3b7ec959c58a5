/// ApplicationInfo.FLAG_SYSTEM
pub const FLAG_SYSTEM: i32 = 1;

/// PackageManager.MATCH_UNINSTALLED_PACKAGES (formerly GET_UNINSTALLED_PACKAGES)
pub const MATCH_UNINSTALLED_PACKAGES: i32 = 0x0000_2000;

/// PackageManager.GET_META_DATA
pub const GET_META_DATA: i32 = 0x0000_0080;

/// One row of the platform application registry. Read-only snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledApplication {
    pub package_name: String,
    pub flags: i32,
    pub label: String,
}

impl InstalledApplication {
    pub fn new(package_name: impl Into<String>, flags: i32, label: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            flags,
            label: label.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.flags & FLAG_SYSTEM != 0
    }
}
