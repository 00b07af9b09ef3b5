use std::collections::HashMap;

/// IMAP UID — the only handle usable to re-fetch or flag a message.
pub type Uid = u32;

/// One inbox entry as shown (spoken) to the user.
#[derive(Debug, Clone)]
pub struct MessageSummary {
    /// 1-based display position, dense within a single listing.
    /// Not stable across listings.
    pub index: usize,
    pub uid: Uid,
    pub from: String,
    pub subject: String,
    pub date: String,
}

/// Full message as returned by a fetch. Never cached; every read
/// pays the protocol round trip again.
#[derive(Debug, Clone, Default)]
pub struct FullMessage {
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Ordered, indexed snapshot of message summaries plus the
/// display-index → UID map. Built wholesale; the owning session
/// controller swaps the entire value on each new listing so stale
/// indices can never resolve to a UID from a prior listing.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    entries: Vec<MessageSummary>,
    by_index: HashMap<usize, Uid>,
}

impl Listing {
    /// Build a listing from already-ordered summaries, renumbering
    /// them 1..N in the given order.
    pub fn from_summaries(mut entries: Vec<MessageSummary>) -> Self {
        let mut by_index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.index = i + 1;
            by_index.insert(entry.index, entry.uid);
        }
        Self { entries, by_index }
    }

    pub fn uid_at(&self, index: usize) -> Option<Uid> {
        self.by_index.get(&index).copied()
    }

    pub fn get(&self, pos: usize) -> Option<&MessageSummary> {
        self.entries.get(pos)
    }

    pub fn entries(&self) -> &[MessageSummary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
