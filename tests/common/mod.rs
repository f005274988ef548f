use containment_index::IndexedEntry;

/// A minimal entry used across the integration suite: an id (for bucketing
/// tests, where two entries can share an element set but remain distinct)
/// plus the element set itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub id: u32,
    pub elements: Vec<u32>,
}

impl Entry {
    #[must_use]
    pub fn new(id: u32, elements: impl IntoIterator<Item = u32>) -> Self {
        Self {
            id,
            elements: elements.into_iter().collect(),
        }
    }
}

impl IndexedEntry<u32> for Entry {
    fn elements(&self) -> &[u32] {
        &self.elements
    }
}

/// Sorts by id so set-equality assertions don't depend on an index's
/// (spec-unspecified) iteration order.
#[must_use]
pub fn ids(mut entries: Vec<Entry>) -> std::collections::BTreeSet<u32> {
    entries.sort_by_key(|e| e.id);
    entries.into_iter().map(|e| e.id).collect()
}
