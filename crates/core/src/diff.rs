//! Snapshot comparison
//!
//! Entries are matched by key. A rename therefore shows up as a REMOVE of
//! the old key and a CREATE of the new one; no pairing is attempted.

use crate::event::{Event, Op};
use crate::snapshot::Snapshot;

/// Derive the events that turn `old` into `new`
///
/// Ordering: every CREATE/WRITE/CHMOD (in map order) comes before every
/// REMOVE. An entry whose mtime and mode both changed yields two events,
/// WRITE then CHMOD.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Vec<Event> {
    let mut events = Vec::new();

    for (key, meta) in new.iter() {
        match old.get(key) {
            None => events.push(Event::new(meta.path(), Op::CREATE)),
            Some(prev) => {
                if prev.modified() != meta.modified() {
                    events.push(Event::new(meta.path(), Op::WRITE));
                }
                if prev.mode() != meta.mode() {
                    events.push(Event::new(meta.path(), Op::CHMOD));
                }
            }
        }
    }

    for (key, meta) in old.iter() {
        if !new.contains(key) {
            events.push(Event::new(meta.path(), Op::REMOVE));
        }
    }

    events
}
