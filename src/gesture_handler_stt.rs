use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registered handler variants. The serde name is the `class` tag of the
/// persisted form, so renaming a variant breaks stored bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Blank,
    StartApp,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 2] = [HandlerKind::Blank, HandlerKind::StartApp];
}

/// Input gestures a handler can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    DoubleTap,
    SwipeUp,
    SwipeDown,
    LongPress,
    HomePress,
}

impl Gesture {
    pub const ALL: [Gesture; 5] = [
        Gesture::DoubleTap,
        Gesture::SwipeUp,
        Gesture::SwipeDown,
        Gesture::LongPress,
        Gesture::HomePress,
    ];
}

/// Configuration UI the controller should present for a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIntent {
    PickApp,
}

/// What the configuration UI handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigResult {
    AppPicked { package: String, label: String },
}

/// On-disk shape of one gesture binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedHandler {
    pub class: HandlerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}
