//! Append-only audit log of committed transitions.
//!
//! One entry is written per committed mutating operation. The log is never
//! consulted by the state machine itself; it exists for external observers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{AccountId, Timestamp};

/// Kind of committed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A pot was funded. Subject is the pot id.
    Created,
    /// A hunter paid for an attempt. Subject is the attempt id.
    Attempted,
    /// The oracle confirmed a success and the pot paid out. Subject is the pot id.
    Solved,
    /// The oracle reported a failure. Subject is the attempt id.
    Failed,
    /// The creator reclaimed an expired pot. Subject is the pot id.
    Expired,
}

impl EventKind {
    /// Snake-case name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Attempted => "attempted",
            EventKind::Solved => "solved",
            EventKind::Failed => "failed",
            EventKind::Expired => "expired",
        }
    }
}

/// An immutable log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the log, assigned on append.
    pub sequence: u64,

    /// Pot or attempt id, depending on `kind`.
    pub subject_id: u64,

    /// What happened.
    pub kind: EventKind,

    /// When the transition committed.
    pub timestamp: Timestamp,

    /// The caller whose operation committed.
    pub actor: AccountId,
}

impl Event {
    /// Create an event. The sequence is assigned by [`EventLog::append`].
    pub fn new(kind: EventKind, subject_id: u64, timestamp: Timestamp, actor: AccountId) -> Self {
        Self {
            sequence: 0,
            subject_id,
            kind,
            timestamp,
            actor,
        }
    }

    /// SHA-256 over the fields in declaration order. Integers are big-endian,
    /// strings are length-prefixed.
    fn leaf_hash(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.sequence.to_be_bytes());
        hasher.update(self.subject_id.to_be_bytes());
        for field in [self.kind.as_str(), self.actor.as_str()] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.update(self.timestamp.to_be_bytes());
        hasher.finalize().to_vec()
    }
}

/// The append-only event sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<Event>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, stamping its sequence number. Returns the stored copy.
    pub fn append(&mut self, mut event: Event) -> Event {
        event.sequence = self.entries.len() as u64;
        self.entries.push(event.clone());
        event
    }

    /// All entries in commit order.
    pub fn entries(&self) -> &[Event] {
        &self.entries
    }

    /// Entries from `sequence` onward.
    pub fn since(&self, sequence: u64) -> &[Event] {
        let start = usize::try_from(sequence)
            .unwrap_or(usize::MAX)
            .min(self.entries.len());
        &self.entries[start..]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hex-encoded SHA-256 Merkle root over the entries.
    pub fn digest(&self) -> String {
        merkle_root(&self.entries)
    }

    /// Whether `digest` matches these entries.
    pub fn verify(&self, digest: &str) -> bool {
        self.digest() == digest
    }
}

/// Merkle root of a sequence of events. An empty sequence hashes to zeros.
pub fn merkle_root(events: &[Event]) -> String {
    if events.is_empty() {
        return "0".repeat(64);
    }

    let mut hashes: Vec<Vec<u8>> = events.iter().map(Event::leaf_hash).collect();

    while hashes.len() > 1 {
        let mut next_level = Vec::with_capacity(hashes.len().div_ceil(2));

        for chunk in hashes.chunks(2) {
            let mut hasher = Sha256::new();
            hasher.update(&chunk[0]);
            // Odd node pairs with itself
            hasher.update(chunk.get(1).unwrap_or(&chunk[0]));
            next_level.push(hasher.finalize().to_vec());
        }

        hashes = next_level;
    }

    hashes
        .first()
        .map(|h| h.iter().map(|b| format!("{:02x}", b)).collect())
        .unwrap_or_else(|| "0".repeat(64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, subject_id: u64) -> Event {
        Event::new(kind, subject_id, 10, AccountId::new("alice"))
    }

    #[test]
    fn test_append_assigns_sequence() {
        let mut log = EventLog::new();
        let first = log.append(event(EventKind::Created, 0));
        let second = log.append(event(EventKind::Attempted, 0));

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1].kind, EventKind::Attempted);
    }

    #[test]
    fn test_since() {
        let mut log = EventLog::new();
        for i in 0..5 {
            log.append(event(EventKind::Created, i));
        }

        assert_eq!(log.since(3).len(), 2);
        assert_eq!(log.since(3)[0].subject_id, 3);
        assert!(log.since(5).is_empty());
        assert!(log.since(u64::MAX).is_empty());
    }

    #[test]
    fn test_empty_digest() {
        assert_eq!(EventLog::new().digest(), "0".repeat(64));
    }

    #[test]
    fn test_digest_detects_tampering() {
        let mut log = EventLog::new();
        log.append(event(EventKind::Created, 0));
        log.append(event(EventKind::Attempted, 0));
        log.append(event(EventKind::Solved, 0));
        let digest = log.digest();
        assert!(log.verify(&digest));

        let mut tampered = log.clone();
        tampered.entries[2].kind = EventKind::Failed;
        assert!(!tampered.verify(&digest));
    }

    #[test]
    fn test_digest_changes_on_append() {
        let mut log = EventLog::new();
        log.append(event(EventKind::Created, 0));
        let before = log.digest();
        log.append(event(EventKind::Expired, 0));
        assert_ne!(before, log.digest());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&EventKind::Attempted).unwrap();
        assert_eq!(json, "\"attempted\"");
    }

    #[test]
    fn test_kind_names_match_serde() {
        let kinds = [
            EventKind::Created,
            EventKind::Attempted,
            EventKind::Solved,
            EventKind::Failed,
            EventKind::Expired,
        ];
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_leaf_hash_covers_every_field() {
        let base = event(EventKind::Created, 0);
        let variants = [
            Event { sequence: 1, ..base.clone() },
            Event { subject_id: 1, ..base.clone() },
            Event { kind: EventKind::Expired, ..base.clone() },
            Event { timestamp: 11, ..base.clone() },
            Event { actor: AccountId::new("bob"), ..base.clone() },
        ];

        for variant in &variants {
            assert_ne!(variant.leaf_hash(), base.leaf_hash());
        }
        assert_eq!(base.leaf_hash(), base.clone().leaf_hash());
    }
}
