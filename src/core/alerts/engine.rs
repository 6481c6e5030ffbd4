// Alert engine - resolves active events into eligible alert candidates.

use super::factories::{AlertContext, FactoryError};
use super::model::ResolvedAlert;
use crate::core::config::{sanitize_tick_length, EngineSettings};
use crate::core::events::model::{Channel, EventId};
use crate::core::events::tracker::EventTracker;

/// A factory that failed for one (event, channel) candidate.
/// Other candidates in the same resolution are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveFailure {
    pub event: EventId,
    pub channel: Channel,
    pub error: FactoryError,
}

/// Output of one `resolve` call. Candidates are in (event, channel) visiting
/// order; no sorting is applied.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub alerts: Vec<ResolvedAlert>,
    pub failures: Vec<ResolveFailure>,
}

impl Resolution {
    /// Highest-priority candidate for `channel`; the first one wins ties
    pub fn winner(&self, channel: Channel) -> Option<&ResolvedAlert> {
        self.winner_among(&[channel])
    }

    pub fn winner_among(&self, channels: &[Channel]) -> Option<&ResolvedAlert> {
        self.alerts
            .iter()
            .filter(|alert| channels.contains(&alert.channel))
            .fold(None, |best, alert| match best {
                Some(current) if !alert.outranks(current) => Some(current),
                _ => Some(alert),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// Arbitration over the tracker's active events.
#[derive(Debug, Clone, Copy)]
pub struct AlertEngine {
    /// Fixed control period in seconds
    tick_length: f64,
}

impl AlertEngine {
    /// Invalid tick lengths fall back to the 100 Hz default
    pub fn new(tick_length: f64) -> Self {
        Self {
            tick_length: sanitize_tick_length(tick_length),
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.tick_length_secs)
    }

    pub fn tick_length(&self) -> f64 {
        self.tick_length
    }

    /// Collect every eligible alert for the requested channels.
    ///
    /// An alert is eligible once its event has been active long enough to
    /// cover the alert's creation delay. The delay counter is per event, so
    /// every channel of an event arms on the same tick for equal delays.
    /// Factory failures are reported in `failures` and skipped.
    pub fn resolve(&self, events: &EventTracker, channels: &[Channel], ctx: &AlertContext<'_>) -> Resolution {
        let mut requested = [false; Channel::COUNT];
        let channels: Vec<Channel> = channels
            .iter()
            .copied()
            .filter(|c| !std::mem::replace(&mut requested[c.index()], true))
            .collect();

        let mut resolution = Resolution::default();

        for event in events.names() {
            let Some(rules) = events.catalog().rules(event) else {
                continue;
            };
            let elapsed = self.elapsed(events.ticks_active(event));

            for &channel in &channels {
                let Some(entry) = rules.get(&channel) else {
                    continue;
                };

                let alert = match entry.evaluate(ctx) {
                    Ok(alert) => alert,
                    Err(error) => {
                        log::warn!("Alert factory failed for {event}/{channel}: {error}");
                        resolution.failures.push(ResolveFailure {
                            event: event.clone(),
                            channel,
                            error,
                        });
                        continue;
                    }
                };

                if elapsed < alert.creation_delay {
                    log::trace!(
                        "{event}/{channel} gated: {elapsed:.2}s of {:.2}s",
                        alert.creation_delay
                    );
                    continue;
                }

                resolution
                    .alerts
                    .push(ResolvedAlert::new(alert, event.clone(), channel));
            }
        }

        resolution
    }

    /// Time an event has been active, counting the current tick
    fn elapsed(&self, prior_ticks: u32) -> f64 {
        self.tick_length * f64::from(prior_ticks.saturating_add(1))
    }
}
