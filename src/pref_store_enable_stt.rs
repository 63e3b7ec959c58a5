use crate::android_activity::ComponentName;

pub const DEFAULT_STORE_PACKAGE: &str = "com.android.vending";
pub const DEFAULT_ENABLER_PACKAGE: &str = "io.fieldx.store";
pub const DEFAULT_ENABLER_CLASS: &str = "io.android.store.ui.MainActivity";

pub fn default_enabler() -> ComponentName {
    ComponentName::new(DEFAULT_ENABLER_PACKAGE, DEFAULT_ENABLER_CLASS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Store package is a disabled system app.
    Disabled,
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    AlreadyEnabled,
    DialogShown,
}

/// Button pressed in the confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Confirm,
    Cancel,
}

pub struct StoreEnablePreference {
    pub store_package: String,
    pub enabler: ComponentName,
    pub state: StoreState,
    pub summary: String,
    pub dialog_open: bool,
    /// Transient messages for the user, drained by the host screen.
    pub notifications: Vec<String>,
}
