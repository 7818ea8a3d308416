//! Event Logger
//!
//! Append-only JSONL event log, plus the queue events wait in until the
//! driver drains them at the end of a tick.

use sim_events::{Event, EventType};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One JSON object per line. A logger without a file only keeps counts.
pub struct EventLogger {
    sink: Option<BufWriter<File>>,
    tally: BTreeMap<EventType, u64>,
}

impl EventLogger {
    /// Truncates `path` and logs into it.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            sink: Some(BufWriter::new(file)),
            tally: BTreeMap::new(),
        })
    }

    pub fn null() -> Self {
        Self {
            sink: None,
            tally: BTreeMap::new(),
        }
    }

    pub fn event_count(&self) -> u64 {
        self.tally.values().sum()
    }

    /// Events logged so far, per category.
    pub fn tally(&self) -> &BTreeMap<EventType, u64> {
        &self.tally
    }

    pub fn log(&mut self, event: &Event) -> io::Result<()> {
        *self.tally.entry(event.event_type()).or_default() += 1;
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };
        serde_json::to_writer(&mut *sink, event)?;
        sink.write_all(b"\n")
    }

    pub fn log_batch(&mut self, events: &[Event]) -> io::Result<()> {
        events.iter().try_for_each(|event| self.log(event))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Event log flush failed: {}", e);
        }
    }
}

/// Events raised during a tick, in the order they happened
#[derive(Debug, Default)]
pub struct PendingEvents {
    queue: Vec<Event>,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_events::{generate_event_id, Coord, EventKind, ResourceKind};
    use std::fs;

    fn collected(sequence: u64) -> Event {
        Event::new(
            generate_event_id(sequence),
            3,
            EventKind::ResourceCollected {
                agent_id: "agent_001".into(),
                resource_id: 4,
                kind: ResourceKind::Crystal,
                position: Coord::new(2, 2),
                value: 10,
            },
        )
    }

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        {
            let mut logger = EventLogger::new(&path).unwrap();
            logger.log_batch(&[collected(1), collected(2)]).unwrap();
            logger
                .log(&Event::new(generate_event_id(3), 4, EventKind::StormStarted { incursion: 1 }))
                .unwrap();
            assert_eq!(logger.event_count(), 3);
            assert_eq!(logger.tally().get(&EventType::Resource), Some(&2));
            assert_eq!(logger.tally().get(&EventType::Storm), Some(&1));
        }

        // dropped logger has flushed
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(Event::from_jsonl(lines[0]).unwrap(), collected(1));
        assert_eq!(Event::from_jsonl(lines[2]).unwrap().event_type(), EventType::Storm);
    }

    #[test]
    fn test_null_logger_counts() {
        let mut logger = EventLogger::null();
        logger.log(&collected(1)).unwrap();
        logger.flush().unwrap();
        assert_eq!(logger.event_count(), 1);
    }

    #[test]
    fn test_pending_events_drain_in_order() {
        let mut pending = PendingEvents::new();
        assert!(pending.is_empty());

        pending.push(collected(1));
        pending.push(collected(2));
        assert_eq!(pending.len(), 2);

        let drained = pending.drain();
        assert_eq!(drained[1].event_id, "evt_00000002");
        assert!(pending.is_empty());
    }
}
