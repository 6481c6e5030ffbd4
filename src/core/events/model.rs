// Event identifiers and alert channels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a reportable condition (e.g. "doorOpen", "radarFault").
///
/// The set of identifiers is owned by whoever ships the catalog; the engine
/// treats them as opaque names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EventId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Axis of consequence an event can trigger an alert for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    Enable,
    PreEnable,
    NoEntry,
    Warning,
    UserDisable,
    SoftDisable,
    ImmediateDisable,
    Permanent,
}

impl Channel {
    pub const COUNT: usize = 8;

    /// Get all channels
    pub fn all() -> &'static [Channel] {
        &[
            Self::Enable,
            Self::PreEnable,
            Self::NoEntry,
            Self::Warning,
            Self::UserDisable,
            Self::SoftDisable,
            Self::ImmediateDisable,
            Self::Permanent,
        ]
    }

    /// Wire/tag name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::PreEnable => "preEnable",
            Self::NoEntry => "noEntry",
            Self::Warning => "warning",
            Self::UserDisable => "userDisable",
            Self::SoftDisable => "softDisable",
            Self::ImmediateDisable => "immediateDisable",
            Self::Permanent => "permanent",
        }
    }

    /// Dense index, used for per-channel bitsets.
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
