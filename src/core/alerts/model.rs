// Alert model types: the catalog-defined template and the per-tick resolution record.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::events::model::{Channel, EventId};

/// Alert priority, lowest to highest severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Lowest = 0,
    Lower = 1,
    Low = 2,
    Mid = 3,
    High = 4,
    Highest = 5,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lowest => "LOWEST",
            Self::Lower => "LOWER",
            Self::Low => "LOW",
            Self::Mid => "MID",
            Self::High => "HIGH",
            Self::Highest => "HIGHEST",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Lowest),
            1 => Ok(Self::Lower),
            2 => Ok(Self::Low),
            3 => Ok(Self::Mid),
            4 => Ok(Self::High),
            5 => Ok(Self::Highest),
            other => Err(format!("priority must be 0..=5, got {other}")),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status tier, drives the banner colour in the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AlertStatus {
    #[default]
    Normal,
    UserPrompt,
    Critical,
}

/// Display-size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AlertSize {
    #[default]
    None,
    Small,
    Mid,
    Full,
}

/// Visual cue forwarded to the vehicle HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum VisualAlert {
    #[default]
    None,
    Fcw,
    SteerRequired,
    BrakePressed,
    WrongGear,
    SeatbeltUnbuckled,
    SpeedTooHigh,
    Ldw,
}

impl VisualAlert {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fcw => "fcw",
            Self::SteerRequired => "steerRequired",
            Self::BrakePressed => "brakePressed",
            Self::WrongGear => "wrongGear",
            Self::SeatbeltUnbuckled => "seatbeltUnbuckled",
            Self::SpeedTooHigh => "speedTooHigh",
            Self::Ldw => "ldw",
        }
    }
}

/// Sound played alongside the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AudibleAlert {
    #[default]
    None,
    ChimeEngage,
    ChimeDisengage,
    ChimeError,
    ChimeWarning1,
    ChimeWarning2,
    ChimeWarningRepeat,
    ChimePrompt,
    ChimeWarning2Repeat,
}

impl AudibleAlert {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ChimeEngage => "chimeEngage",
            Self::ChimeDisengage => "chimeDisengage",
            Self::ChimeError => "chimeError",
            Self::ChimeWarning1 => "chimeWarning1",
            Self::ChimeWarning2 => "chimeWarning2",
            Self::ChimeWarningRepeat => "chimeWarningRepeat",
            Self::ChimePrompt => "chimePrompt",
            Self::ChimeWarning2Repeat => "chimeWarning2Repeat",
        }
    }
}

/// Presentable description attached to one (event, channel) rule.
///
/// Text is opaque to the engine; only `priority` and `creation_delay` are
/// ever interpreted. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub text1: String,
    pub text2: String,
    pub status: AlertStatus,
    pub size: AlertSize,
    pub priority: Priority,
    pub visual: VisualAlert,
    pub audible: AudibleAlert,
    pub duration_sound: f64,
    pub duration_hud_alert: f64,
    pub duration_text: f64,
    /// Repeat rate in Hz, 0 = no repeat
    #[serde(default)]
    pub alert_rate: f64,
    /// Seconds the event must stay active before this alert is eligible
    #[serde(default)]
    pub creation_delay: f64,
}

impl Alert {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        text1: impl Into<String>,
        text2: impl Into<String>,
        status: AlertStatus,
        size: AlertSize,
        priority: Priority,
        visual: VisualAlert,
        audible: AudibleAlert,
        duration_sound: f64,
        duration_hud_alert: f64,
        duration_text: f64,
    ) -> Self {
        Self {
            text1: text1.into(),
            text2: text2.into(),
            status,
            size,
            priority,
            visual,
            audible,
            duration_sound,
            duration_hud_alert,
            duration_text,
            alert_rate: 0.0,
            creation_delay: 0.0,
        }
    }

    pub fn with_alert_rate(mut self, hz: f64) -> Self {
        self.alert_rate = hz;
        self
    }

    pub fn with_creation_delay(mut self, seconds: f64) -> Self {
        self.creation_delay = seconds;
        self
    }

    pub fn with_audible(mut self, audible: AudibleAlert) -> Self {
        self.audible = audible;
        self
    }

    pub fn with_visual(mut self, visual: VisualAlert) -> Self {
        self.visual = visual;
        self
    }

    pub fn with_duration_hud_alert(mut self, seconds: f64) -> Self {
        self.duration_hud_alert = seconds;
        self
    }

    /// Engagement is refused; the headline is the generic "unavailable" text.
    pub fn no_entry(text2: impl Into<String>) -> Self {
        Self::new(
            "Automation Unavailable",
            text2,
            AlertStatus::Normal,
            AlertSize::Mid,
            Priority::Low,
            VisualAlert::None,
            AudibleAlert::ChimeError,
            0.4,
            2.0,
            3.0,
        )
    }

    pub fn soft_disable(text2: impl Into<String>) -> Self {
        Self::new(
            "TAKE CONTROL IMMEDIATELY",
            text2,
            AlertStatus::UserPrompt,
            AlertSize::Full,
            Priority::Mid,
            VisualAlert::SteerRequired,
            AudibleAlert::ChimeError,
            0.1,
            2.0,
            2.0,
        )
    }

    pub fn immediate_disable(text2: impl Into<String>) -> Self {
        Self::new(
            "TAKE CONTROL IMMEDIATELY",
            text2,
            AlertStatus::Critical,
            AlertSize::Full,
            Priority::Highest,
            VisualAlert::SteerRequired,
            AudibleAlert::ChimeWarningRepeat,
            2.2,
            3.0,
            4.0,
        )
    }

    /// Sound-only alert for engage/disengage transitions.
    pub fn engagement(audible: AudibleAlert) -> Self {
        Self::new(
            "",
            "",
            AlertStatus::Normal,
            AlertSize::None,
            Priority::Mid,
            VisualAlert::None,
            audible,
            0.2,
            0.0,
            0.0,
        )
    }

    pub fn normal_permanent(text1: impl Into<String>, text2: impl Into<String>) -> Self {
        Self::new(
            text1,
            text2,
            AlertStatus::Normal,
            AlertSize::Mid,
            Priority::Lower,
            VisualAlert::None,
            AudibleAlert::None,
            0.0,
            0.0,
            0.2,
        )
    }

    /// Alerts are ranked by priority alone.
    pub fn outranks(&self, other: &Alert) -> bool {
        self.priority > other.priority
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {} {} {}",
            self.text1,
            self.text2,
            self.priority,
            self.visual.as_str(),
            self.audible.as_str()
        )
    }
}

/// One eligible candidate produced by arbitration.
///
/// The template stays shared with the catalog (or owned, for factory output);
/// the event/channel tagging lives here so catalog alerts are never mutated.
#[derive(Debug, Clone)]
pub struct ResolvedAlert {
    pub alert: Arc<Alert>,
    pub event: EventId,
    pub channel: Channel,
    /// "<event>/<channel>"
    pub alert_type: String,
}

impl ResolvedAlert {
    pub fn new(alert: Arc<Alert>, event: EventId, channel: Channel) -> Self {
        let alert_type = format!("{event}/{channel}");
        Self {
            alert,
            event,
            channel,
            alert_type,
        }
    }

    pub fn priority(&self) -> Priority {
        self.alert.priority
    }

    pub fn outranks(&self, other: &ResolvedAlert) -> bool {
        self.alert.outranks(&other.alert)
    }
}
