// Wire adapter - projects the active event set into records for other processes.
//
// The projection is deliberately lossy on the way back: `from_records` only
// replays event membership. Channel flags are informational for the consumer
// and the receiving tracker re-derives them from its own catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{Channel, EventId};
use super::tracker::EventTracker;

/// One active event as published on the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEventRecord {
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    /// Channels the publishing catalog defines a rule for; absent means false
    #[serde(default)]
    pub flags: BTreeMap<Channel, bool>,
}

impl ExternalEventRecord {
    pub fn has(&self, channel: Channel) -> bool {
        self.flags.get(&channel).copied().unwrap_or(false)
    }
}

impl EventTracker {
    /// One record per active event, in assertion order
    pub fn to_records(&self) -> Vec<ExternalEventRecord> {
        self.names()
            .iter()
            .map(|name| ExternalEventRecord {
                event_id: name.clone(),
                flags: self.catalog().channels(name).map(|c| (c, true)).collect(),
            })
            .collect()
    }

    /// Add every record's event as active (non-sticky). Flags are ignored.
    pub fn add_from_records<'a>(&mut self, records: impl IntoIterator<Item = &'a ExternalEventRecord>) {
        for record in records {
            self.add(record.event_id.clone());
        }
    }
}

pub fn encode_records(records: &[ExternalEventRecord]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(records)
}

pub fn decode_records(bytes: &[u8]) -> serde_json::Result<Vec<ExternalEventRecord>> {
    serde_json::from_slice(bytes)
}
