// Occurrence tracker - which events are active this tick and for how long.

use std::collections::HashMap;
use std::sync::Arc;

use super::model::{Channel, EventId};
use crate::core::catalog::EventCatalog;

/// Per-tick event state owned by the control loop.
///
/// Producers `add` events during a tick; the loop resolves alerts and then
/// calls `reset` exactly once. Sticky events are latched: they stay active
/// across every later `reset` without being re-added.
#[derive(Debug, Clone)]
pub struct EventTracker {
    catalog: Arc<EventCatalog>,
    /// Active this tick, in assertion order, no duplicates
    active: Vec<EventId>,
    /// Latched subset of `active`
    sticky: Vec<EventId>,
    /// Consecutive ticks each event was active, not counting the current one
    ticks_active: HashMap<EventId, u32>,
}

impl EventTracker {
    /// Counters start at zero for every event the catalog knows.
    pub fn new(catalog: Arc<EventCatalog>) -> Self {
        let ticks_active = catalog.event_ids().map(|e| (e.clone(), 0)).collect();
        Self {
            catalog,
            active: Vec::new(),
            sticky: Vec::new(),
            ticks_active,
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Record `event` as active for the current tick.
    pub fn add(&mut self, event: impl Into<EventId>) {
        self.assert_event(event.into(), false);
    }

    /// Record `event` as active and latch it across all later ticks.
    pub fn add_sticky(&mut self, event: impl Into<EventId>) {
        self.assert_event(event.into(), true);
    }

    pub fn assert_event(&mut self, event: EventId, sticky: bool) {
        if sticky && !self.sticky.contains(&event) {
            log::debug!("Latching sticky event {event}");
            self.sticky.push(event.clone());
        }
        if !self.active.contains(&event) {
            self.active.push(event);
        }
    }

    /// True if any active event has a rule for `channel`
    pub fn is_active(&self, channel: Channel) -> bool {
        self.active.iter().any(|e| self.catalog.has_rule(e, channel))
    }

    /// End the tick: roll the persistence counters, then keep only sticky events.
    pub fn reset(&mut self) {
        for event in &self.active {
            // Events the catalog never declared get a counter on first sight
            self.ticks_active.entry(event.clone()).or_insert(0);
        }
        for (event, ticks) in self.ticks_active.iter_mut() {
            *ticks = if self.active.contains(event) {
                ticks.saturating_add(1)
            } else {
                0
            };
        }
        self.active.clone_from(&self.sticky);
    }

    /// Active events in assertion order
    pub fn names(&self) -> &[EventId] {
        &self.active
    }

    pub fn contains(&self, event: &EventId) -> bool {
        self.active.contains(event)
    }

    pub fn is_sticky(&self, event: &EventId) -> bool {
        self.sticky.contains(event)
    }

    /// Ticks `event` has been continuously active before the current one.
    /// Unknown events report 0.
    pub fn ticks_active(&self, event: &EventId) -> u32 {
        self.ticks_active.get(event).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
