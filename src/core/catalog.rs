// Event catalog: the loaded, read-only mapping event -> channel -> alert rule.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::alerts::factories::{AlertContext, AlertFactory, FactoryError, FactoryRegistry};
use super::alerts::model::Alert;
use super::events::model::{Channel, EventId};

/// One catalog slot: either a fixed alert or a factory computed per resolution.
#[derive(Clone)]
pub enum CatalogEntry {
    Static(Arc<Alert>),
    Computed(AlertFactory),
}

impl CatalogEntry {
    /// Produce the alert for this tick. Factory output is never cached.
    pub fn evaluate(&self, ctx: &AlertContext<'_>) -> Result<Arc<Alert>, FactoryError> {
        match self {
            Self::Static(alert) => Ok(Arc::clone(alert)),
            Self::Computed(factory) => factory(ctx).map(Arc::new),
        }
    }
}

impl From<Alert> for CatalogEntry {
    fn from(alert: Alert) -> Self {
        Self::Static(Arc::new(alert))
    }
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(alert) => f.debug_tuple("Static").field(alert).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate rule for {event}/{channel}")]
    DuplicateRule { event: EventId, channel: Channel },

    #[error("unknown factory '{factory}' for {event}/{channel}")]
    UnknownFactory {
        event: EventId,
        channel: Channel,
        factory: String,
    },

    #[error("invalid alert for {event}/{channel}: {field} = {value}")]
    InvalidAlert {
        event: EventId,
        channel: Channel,
        field: &'static str,
        value: f64,
    },

    #[error("rule for {event}/{channel} must name exactly one of alert or factory")]
    AmbiguousRule { event: EventId, channel: Channel },

    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot read catalog: {0}")]
    Io(#[from] io::Error),
}

/// Rules per event, keyed by channel
pub type ChannelRules = BTreeMap<Channel, CatalogEntry>;

/// Immutable after construction; share it with `Arc<EventCatalog>`.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: HashMap<EventId, ChannelRules>,
}

impl EventCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Parse a JSON rule list, resolving factory names against `registry`.
    pub fn from_json_str(json: &str, registry: &FactoryRegistry) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut builder = Self::builder();

        for event in file.events {
            builder.declare(event);
        }

        for rule in file.rules {
            let entry = match (rule.alert, rule.factory) {
                (Some(alert), None) => CatalogEntry::from(alert),
                (None, Some(factory)) => match registry.get(&factory) {
                    Some(f) => CatalogEntry::Computed(f),
                    None => {
                        return Err(CatalogError::UnknownFactory {
                            event: rule.event,
                            channel: rule.channel,
                            factory,
                        })
                    }
                },
                _ => {
                    return Err(CatalogError::AmbiguousRule {
                        event: rule.event,
                        channel: rule.channel,
                    })
                }
            };
            builder.insert(rule.event, rule.channel, entry)?;
        }

        let catalog = builder.build();
        log::info!(
            "Loaded alert catalog: {} events, {} rules",
            catalog.event_count(),
            catalog.rule_count()
        );
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>, registry: &FactoryRegistry) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content, registry)
    }

    /// All rules for `event`, if the catalog knows it
    pub fn rules(&self, event: &EventId) -> Option<&ChannelRules> {
        self.events.get(event)
    }

    pub fn entry(&self, event: &EventId, channel: Channel) -> Option<&CatalogEntry> {
        self.events.get(event)?.get(&channel)
    }

    pub fn has_rule(&self, event: &EventId, channel: Channel) -> bool {
        self.entry(event, channel).is_some()
    }

    /// Channels `event` defines a rule for, in channel order
    pub fn channels(&self, event: &EventId) -> impl Iterator<Item = Channel> + '_ {
        self.events
            .get(event)
            .into_iter()
            .flat_map(|rules| rules.keys().copied())
    }

    pub fn event_ids(&self) -> impl Iterator<Item = &EventId> {
        self.events.keys()
    }

    pub fn contains(&self, event: &EventId) -> bool {
        self.events.contains_key(event)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn rule_count(&self) -> usize {
        self.events.values().map(BTreeMap::len).sum()
    }
}

/// Accumulates rules, rejecting a second rule for the same (event, channel).
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    events: HashMap<EventId, ChannelRules>,
}

impl CatalogBuilder {
    /// Make `event` known without giving it any rule
    pub fn declare(&mut self, event: impl Into<EventId>) -> &mut Self {
        self.events.entry(event.into()).or_default();
        self
    }

    pub fn insert(
        &mut self,
        event: impl Into<EventId>,
        channel: Channel,
        entry: impl Into<CatalogEntry>,
    ) -> Result<&mut Self, CatalogError> {
        let event = event.into();
        let entry = entry.into();
        if let CatalogEntry::Static(alert) = &entry {
            if let Some((field, value)) = invalid_timing(alert) {
                return Err(CatalogError::InvalidAlert {
                    event,
                    channel,
                    field,
                    value,
                });
            }
        }
        let rules = self.events.entry(event.clone()).or_default();
        if rules.contains_key(&channel) {
            return Err(CatalogError::DuplicateRule { event, channel });
        }
        rules.insert(channel, entry);
        Ok(self)
    }

    pub fn insert_factory<F>(
        &mut self,
        event: impl Into<EventId>,
        channel: Channel,
        factory: F,
    ) -> Result<&mut Self, CatalogError>
    where
        F: Fn(&AlertContext<'_>) -> Result<Alert, FactoryError> + Send + Sync + 'static,
    {
        let factory: AlertFactory = Arc::new(factory);
        self.insert(event, channel, CatalogEntry::Computed(factory))
    }

    pub fn build(self) -> EventCatalog {
        EventCatalog { events: self.events }
    }
}

/// First timing field that is negative or not finite
fn invalid_timing(alert: &Alert) -> Option<(&'static str, f64)> {
    [
        ("duration_sound", alert.duration_sound),
        ("duration_hud_alert", alert.duration_hud_alert),
        ("duration_text", alert.duration_text),
        ("alert_rate", alert.alert_rate),
        ("creation_delay", alert.creation_delay),
    ]
    .into_iter()
    .find(|(_, value)| !value.is_finite() || *value < 0.0)
}

#[derive(Deserialize)]
struct CatalogFile {
    /// Events known to the catalog without any rule
    #[serde(default)]
    events: Vec<EventId>,
    #[serde(default)]
    rules: Vec<RuleSpec>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSpec {
    event: EventId,
    channel: Channel,
    #[serde(default)]
    alert: Option<Alert>,
    #[serde(default)]
    factory: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::factories::{Telemetry, VehicleParams};
    use crate::core::alerts::model::Priority;
    use tempfile::tempdir;

    const CATALOG_JSON: &str = r#"{
        "events": ["startup"],
        "rules": [
            {
                "event": "doorOpen",
                "channel": "softDisable",
                "alert": {
                    "text1": "TAKE CONTROL IMMEDIATELY",
                    "text2": "Door Open",
                    "status": "userPrompt",
                    "size": "full",
                    "priority": 3,
                    "visual": "steerRequired",
                    "audible": "chimeError",
                    "duration_sound": 0.1,
                    "duration_hud_alert": 2.0,
                    "duration_text": 2.0
                }
            },
            {
                "event": "doorOpen",
                "channel": "noEntry",
                "alert": {
                    "text1": "Automation Unavailable",
                    "text2": "Door Open",
                    "status": "normal",
                    "size": "mid",
                    "priority": 2,
                    "visual": "none",
                    "audible": "chimeError",
                    "duration_sound": 0.4,
                    "duration_hud_alert": 2.0,
                    "duration_text": 3.0
                }
            },
            { "event": "wrongCarMode", "channel": "noEntry", "factory": "wrongCarMode" }
        ]
    }"#;

    #[test]
    fn test_load_from_json() {
        let catalog = EventCatalog::from_json_str(CATALOG_JSON, &FactoryRegistry::builtin()).unwrap();

        assert_eq!(catalog.event_count(), 3);
        assert_eq!(catalog.rule_count(), 3);
        assert!(catalog.contains(&EventId::from("startup")));
        assert!(catalog.has_rule(&"doorOpen".into(), Channel::SoftDisable));
        assert!(!catalog.has_rule(&"doorOpen".into(), Channel::Permanent));

        let channels: Vec<Channel> = catalog.channels(&"doorOpen".into()).collect();
        assert_eq!(channels, vec![Channel::NoEntry, Channel::SoftDisable]);

        assert!(matches!(
            catalog.entry(&"wrongCarMode".into(), Channel::NoEntry),
            Some(CatalogEntry::Computed(_))
        ));
    }

    #[test]
    fn test_duplicate_rule_rejected_by_builder() {
        let mut builder = EventCatalog::builder();
        builder
            .insert("doorOpen", Channel::NoEntry, Alert::no_entry("Door Open"))
            .unwrap();

        let err = builder
            .insert("doorOpen", Channel::NoEntry, Alert::no_entry("Door Ajar"))
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateRule { ref event, channel: Channel::NoEntry } if event.as_str() == "doorOpen"
        ));
    }

    #[test]
    fn test_duplicate_rule_rejected_at_load() {
        let json = r#"{ "rules": [
            { "event": "wrongCarMode", "channel": "noEntry", "factory": "wrongCarMode" },
            { "event": "wrongCarMode", "channel": "noEntry", "factory": "wrongCarMode" }
        ] }"#;
        let result = EventCatalog::from_json_str(json, &FactoryRegistry::builtin());
        assert!(matches!(result, Err(CatalogError::DuplicateRule { .. })));
    }

    #[test]
    fn test_rule_with_both_sources_rejected() {
        let json = CATALOG_JSON.replacen(
            "\"channel\": \"softDisable\",",
            "\"channel\": \"softDisable\", \"factory\": \"noGps\",",
            1,
        );
        let result = EventCatalog::from_json_str(&json, &FactoryRegistry::builtin());
        assert!(matches!(
            result,
            Err(CatalogError::AmbiguousRule { channel: Channel::SoftDisable, .. })
        ));
    }

    #[test]
    fn test_rule_without_source_rejected() {
        let json = r#"{ "rules": [ { "event": "noGps", "channel": "permanent" } ] }"#;
        let result = EventCatalog::from_json_str(json, &FactoryRegistry::builtin());
        assert!(matches!(result, Err(CatalogError::AmbiguousRule { .. })));
    }

    #[test]
    fn test_unexpected_rule_field_rejected() {
        let json = r#"{ "rules": [
            { "event": "noGps", "channel": "permanent", "factory": "noGps", "priority": 3 }
        ] }"#;
        let result = EventCatalog::from_json_str(json, &FactoryRegistry::builtin());
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_negative_durations_rejected_at_load() {
        let json = CATALOG_JSON
            .replacen("\"duration_sound\": 0.1", "\"duration_sound\": -5.0", 1)
            .replacen("\"duration_text\": 2.0", "\"duration_text\": -2.0", 1);
        let result = EventCatalog::from_json_str(&json, &FactoryRegistry::builtin());
        assert!(matches!(
            result,
            Err(CatalogError::InvalidAlert { field: "duration_sound", value, .. }) if value == -5.0
        ));
    }

    #[test]
    fn test_negative_timing_rejected_by_builder() {
        let mut builder = EventCatalog::builder();
        let err = builder
            .insert(
                "noGps",
                Channel::Permanent,
                Alert::normal_permanent("No GPS", "").with_creation_delay(-1.0),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidAlert { field: "creation_delay", channel: Channel::Permanent, .. }
        ));

        let err = builder
            .insert(
                "laneChange",
                Channel::Warning,
                Alert::normal_permanent("Lane Change", "").with_alert_rate(f64::NAN),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidAlert { field: "alert_rate", .. }));
        assert_eq!(builder.build().rule_count(), 0);
    }

    #[test]
    fn test_unknown_factory_rejected() {
        let json = r#"{ "rules": [
            { "event": "noGps", "channel": "permanent", "factory": "noSuchFactory" }
        ] }"#;
        let result = EventCatalog::from_json_str(json, &FactoryRegistry::new());
        assert!(matches!(result, Err(CatalogError::UnknownFactory { ref factory, .. }) if factory == "noSuchFactory"));
    }

    #[test]
    fn test_invalid_priority_is_parse_error() {
        let json = CATALOG_JSON.replacen("\"priority\": 3", "\"priority\": 9", 1);
        let result = EventCatalog::from_json_str(&json, &FactoryRegistry::builtin());
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, CATALOG_JSON).unwrap();

        let catalog = EventCatalog::from_path(&path, &FactoryRegistry::builtin()).unwrap();
        assert_eq!(catalog.rule_count(), 3);

        let missing = EventCatalog::from_path(dir.path().join("missing.json"), &FactoryRegistry::builtin());
        assert!(matches!(missing, Err(CatalogError::Io(_))));
    }

    #[test]
    fn test_entry_evaluation() {
        let mut builder = EventCatalog::builder();
        builder
            .insert("overheat", Channel::SoftDisable, Alert::soft_disable("Device Overheated"))
            .unwrap()
            .insert_factory("speedy", Channel::Warning, |ctx| {
                let mut alert = Alert::no_entry("fast");
                if ctx.is_metric {
                    alert.priority = Priority::High;
                }
                Ok(alert)
            })
            .unwrap();
        let catalog = builder.build();

        let params = VehicleParams::default();
        let telemetry = Telemetry::default();
        let ctx = AlertContext::new(&params, &telemetry, true);

        let fixed = catalog
            .entry(&"overheat".into(), Channel::SoftDisable)
            .unwrap()
            .evaluate(&ctx)
            .unwrap();
        assert_eq!(fixed.text2, "Device Overheated");

        let computed = catalog
            .entry(&"speedy".into(), Channel::Warning)
            .unwrap()
            .evaluate(&ctx)
            .unwrap();
        assert_eq!(computed.priority, Priority::High);
    }
}
