//! TimelineEvents - exactly-once chronological merge of all streams.
//!
//! A min-heap keyed by world timestamp carries one candidate `(stream,
//! index)` per live stream. Popping the minimum and folding in every entry
//! with the exact same world timestamp yields one combined event per
//! instant; every record is visited exactly once.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use contracts::{SensorName, TimelineEvent};

use crate::stream::SensorStream;

/// Heap candidate: the next unvisited record of one stream.
#[derive(Debug, Clone)]
struct HeapEntry {
    world_ts: f64,
    name: SensorName,
    index: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Timestamps are finite (validated at load), so total_cmp agrees with the
// numeric order; name/index break ties deterministically.
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.world_ts
            .total_cmp(&other.world_ts)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Lazy, single-pass, forward-only traversal of the merged timeline.
///
/// Not restartable in place; obtain a fresh instance from
/// [`SensorDataManager::iter_events`](crate::SensorDataManager::iter_events)
/// to traverse again.
#[derive(Debug)]
pub struct TimelineEvents<'a> {
    streams: &'a HashMap<SensorName, SensorStream>,
    heap: BinaryHeap<Reverse<HeapEntry>>,
}

impl<'a> TimelineEvents<'a> {
    pub(crate) fn new(streams: &'a HashMap<SensorName, SensorStream>) -> Self {
        let mut heap = BinaryHeap::with_capacity(streams.len());
        for (name, stream) in streams {
            if let Some(world_ts) = stream.world_timestamp_at(0) {
                heap.push(Reverse(HeapEntry {
                    world_ts,
                    name: name.clone(),
                    index: 0,
                }));
            }
        }
        Self { streams, heap }
    }

    /// Fold one heap entry into the event and queue the stream's successor.
    fn consume(&mut self, entry: HeapEntry, event: &mut TimelineEvent) {
        let Some(stream) = self.streams.get(entry.name.as_str()) else {
            return;
        };
        if let Some(record) = stream.record(entry.index) {
            event.push(entry.name.clone(), record.clone());
        }

        let next = entry.index + 1;
        if let Some(world_ts) = stream.world_timestamp_at(next) {
            self.heap.push(Reverse(HeapEntry {
                world_ts,
                name: entry.name,
                index: next,
            }));
        }
    }
}

impl Iterator for TimelineEvents<'_> {
    type Item = TimelineEvent;

    fn next(&mut self) -> Option<TimelineEvent> {
        let Reverse(first) = self.heap.pop()?;
        let mut event = TimelineEvent::empty(first.world_ts);
        self.consume(first, &mut event);

        // Fold in every further entry landing on the exact same instant.
        while let Some(Reverse(peek)) = self.heap.peek() {
            if peek.world_ts != event.timestamp_ms {
                break;
            }
            let Some(Reverse(entry)) = self.heap.pop() else {
                break;
            };
            self.consume(entry, &mut event);
        }

        Some(event)
    }
}
