//! Event Types
//!
//! Everything the simulation reports as it happens: collections, structure
//! claims, storms, sheltering and assists.

use serde::{Deserialize, Serialize};

use crate::{Coord, ResourceKind};

/// Primary event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Resource,
    Claim,
    Storm,
    Movement,
    Cooperation,
}

/// What happened, with the data specific to each occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A single agent collected an arity-1 resource
    ResourceCollected {
        agent_id: String,
        resource_id: usize,
        kind: ResourceKind,
        position: Coord,
        value: u32,
    },
    /// First arrival on a multi-agent resource, waiting for help
    ClaimOpened {
        agent_id: String,
        resource_id: usize,
        position: Coord,
    },
    /// A pending claim was dropped (patience ran out, storm, or displaced)
    ClaimAbandoned {
        agent_id: String,
        resource_id: usize,
        reason: String,
    },
    /// A multi-agent resource was completed; every participant was credited
    StructureCompleted {
        resource_id: usize,
        position: Coord,
        participants: Vec<String>,
        value: u32,
    },
    StormStarted { incursion: u64 },
    StormEnded { incursion: u64 },
    /// An agent reached its base while fleeing
    Sheltered { agent_id: String, position: Coord },
    /// A cooperative agent joined another agent
    Assisted {
        helper_id: String,
        target_id: String,
        position: Coord,
    },
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::ResourceCollected { .. } | EventKind::StructureCompleted { .. } => {
                EventType::Resource
            }
            EventKind::ClaimOpened { .. } | EventKind::ClaimAbandoned { .. } => EventType::Claim,
            EventKind::StormStarted { .. } | EventKind::StormEnded { .. } => EventType::Storm,
            EventKind::Sheltered { .. } => EventType::Movement,
            EventKind::Assisted { .. } => EventType::Cooperation,
        }
    }

}

/// One logged occurrence, stamped with the tick it happened in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g., "evt_00000042")
    pub event_id: String,
    /// Tick during which the event occurred
    pub tick: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(event_id: impl Into<String>, tick: u64, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            tick,
            kind,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// Single-line JSON for the event log.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// `evt_` plus the zero-padded sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_serialization() {
        assert_eq!(serde_json::to_string(&EventType::Resource).unwrap(), r#""resource""#);
        assert_eq!(serde_json::to_string(&EventType::Storm).unwrap(), r#""storm""#);
        assert_eq!(
            serde_json::from_str::<EventType>(r#""cooperation""#).unwrap(),
            EventType::Cooperation
        );
    }

    #[test]
    fn test_event_jsonl() {
        let event = Event::new(
            generate_event_id(1),
            12,
            EventKind::ResourceCollected {
                agent_id: "agent_001".into(),
                resource_id: 3,
                kind: ResourceKind::Metal,
                position: Coord::new(4, 7),
                value: 20,
            },
        );

        let line = event.to_jsonl().unwrap();
        assert!(line.contains(r#""type":"resource_collected""#));
        assert!(line.contains(r#""event_id":"evt_00000001""#));
        assert!(!line.contains('\n'));

        let parsed = Event::from_jsonl(&line).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(parsed.event_type(), EventType::Resource);
    }

    #[test]
    fn test_event_categories() {
        let completed = Event::new(
            "evt_00000002",
            40,
            EventKind::StructureCompleted {
                resource_id: 9,
                position: Coord::new(1, 1),
                participants: vec!["agent_002".into(), "agent_004".into()],
                value: 50,
            },
        );
        assert_eq!(completed.event_type(), EventType::Resource);
        assert!(completed.to_jsonl().unwrap().contains(r#""participants":["agent_002","agent_004"]"#));

        let storm = Event::new("evt_00000003", 30, EventKind::StormStarted { incursion: 1 });
        assert_eq!(storm.event_type(), EventType::Storm);
    }

    #[test]
    fn test_generate_event_id() {
        assert_eq!(generate_event_id(1), "evt_00000001");
        assert_eq!(generate_event_id(42371), "evt_00042371");
    }
}
