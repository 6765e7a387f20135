//! Ordered document collections with a single active selection
//!
//! Insertion order is display order. The active index is `Some` exactly when
//! the set is non-empty. A generation counter advances whenever the identity
//! of the active document changes, which lets asynchronous loads detect that
//! their result has gone stale.

use crate::{
    document::{DocumentHandle, DocumentId, DocumentKind, GeometryStatus},
    resource::PreviewHandle,
};

/// One document in a set, together with the resources it owns
#[derive(Debug)]
pub struct DocumentEntry {
    pub handle: DocumentHandle,
    pub preview: PreviewHandle,
    pub status: GeometryStatus,
}

impl DocumentEntry {
    pub fn new(handle: DocumentHandle, preview: PreviewHandle) -> Self {
        Self {
            handle,
            preview,
            status: GeometryStatus::Pending,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.handle.id
    }
}

#[derive(Debug)]
pub struct DocumentSet {
    kind: DocumentKind,
    entries: Vec<DocumentEntry>,
    active: Option<usize>,
    generation: u64,
}

impl DocumentSet {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            active: None,
            generation: 0,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&DocumentEntry> {
        self.entries.get(index)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&DocumentEntry> {
        self.active.and_then(|i| self.entries.get(i))
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active().map(DocumentEntry::id)
    }

    /// Counter advanced on every change of the active document
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn position(&self, id: DocumentId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    pub fn entry(&self, id: DocumentId) -> Option<&DocumentEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Append an entry and make it active. Returns its index.
    pub fn add(&mut self, entry: DocumentEntry) -> usize {
        let before = self.active_id();
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        self.active = Some(index);
        self.commit(before);
        index
    }

    /// Make `index` active. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index >= self.entries.len() {
            return;
        }
        let before = self.active_id();
        self.active = Some(index);
        self.commit(before);
    }

    /// Select the entry with the given id, if present
    pub fn select_id(&mut self, id: DocumentId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.select(index);
                true
            }
            None => false,
        }
    }

    /// Step to the next entry, stopping at the last one
    pub fn select_next(&mut self) {
        if let Some(i) = self.active {
            self.select(i + 1);
        }
    }

    /// Step to the previous entry, stopping at the first one
    pub fn select_previous(&mut self) {
        if let Some(i) = self.active.filter(|&i| i > 0) {
            self.select(i - 1);
        }
    }

    /// Remove the entry at `index` and release its preview handle.
    ///
    /// An active index at or after the removed slot moves to the slot just
    /// before it (never below zero). Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<DocumentHandle> {
        if index >= self.entries.len() {
            return None;
        }
        let before = self.active_id();
        let mut entry = self.entries.remove(index);
        entry.preview.release();

        self.active = if self.entries.is_empty() {
            None
        } else {
            self.active
                .map(|a| if a >= index { index.saturating_sub(1) } else { a })
        };
        self.commit(before);

        tracing::debug!(kind = ?self.kind, document = %entry.id(), "Removed document");
        Some(entry.handle)
    }

    /// Replace every entry, releasing the old previews. The first new entry
    /// becomes active. Returns the handles of the replaced entries.
    pub fn replace_all(&mut self, entries: Vec<DocumentEntry>) -> Vec<DocumentHandle> {
        let before = self.active_id();
        let replaced = std::mem::replace(&mut self.entries, entries)
            .into_iter()
            .map(|mut old| {
                old.preview.release();
                old.handle
            })
            .collect();
        self.active = if self.entries.is_empty() { None } else { Some(0) };
        self.commit(before);
        replaced
    }

    pub fn status(&self, id: DocumentId) -> Option<&GeometryStatus> {
        self.entry(id).map(|e| &e.status)
    }

    pub fn set_status(&mut self, id: DocumentId, status: GeometryStatus) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id() == id) {
            entry.status = status;
        }
    }

    fn commit(&mut self, before: Option<DocumentId>) {
        if self.active_id() != before {
            self.generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{document::IdAllocator, resource::PreviewResources};
    use jewelviz_io::MediaType;
    use std::sync::Arc;

    struct Fixture {
        ids: IdAllocator,
        resources: PreviewResources,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ids: IdAllocator::default(),
                resources: PreviewResources::new(),
            }
        }

        fn entry(&mut self, name: &str) -> DocumentEntry {
            let handle = DocumentHandle {
                id: self.ids.next(),
                kind: DocumentKind::Mesh,
                name: name.to_string(),
                media: MediaType::Stl,
                bytes: Arc::from(vec![0u8; 4]),
            };
            DocumentEntry::new(handle, self.resources.acquire())
        }

        fn set_of(&mut self, n: usize) -> DocumentSet {
            let mut set = DocumentSet::new(DocumentKind::Mesh);
            for i in 0..n {
                set.add(self.entry(&format!("m{}.stl", i)));
            }
            set
        }
    }

    #[test]
    fn test_add_activates_new_entry() {
        let mut fx = Fixture::new();
        let mut set = DocumentSet::new(DocumentKind::Mesh);
        assert_eq!(set.active_index(), None);

        assert_eq!(set.add(fx.entry("a.stl")), 0);
        assert_eq!(set.add(fx.entry("b.stl")), 1);
        assert_eq!(set.active_index(), Some(1));
        assert_eq!(set.active().unwrap().handle.name, "b.stl");
        assert_eq!(set.generation(), 2);
    }

    #[test]
    fn test_select_out_of_bounds_is_noop() {
        let mut fx = Fixture::new();
        let mut set = fx.set_of(3);
        set.select(0);
        let generation = set.generation();
        set.select(3);
        set.select(usize::MAX);
        assert_eq!(set.active_index(), Some(0));
        assert_eq!(set.generation(), generation);
    }

    #[test]
    fn test_reselecting_active_keeps_generation() {
        let mut fx = Fixture::new();
        let mut set = fx.set_of(2);
        let generation = set.generation();
        set.select(1);
        assert_eq!(set.generation(), generation);
    }

    #[test]
    fn test_remove_keeps_active_valid_for_every_index() {
        for n in 1..6 {
            for active in 0..n {
                for index in 0..n {
                    let mut fx = Fixture::new();
                    let mut set = fx.set_of(n);
                    set.select(active);
                    let active_id = set.active_id();

                    assert!(set.remove(index).is_some());
                    assert_eq!(set.len(), n - 1);

                    match set.active_index() {
                        None => assert!(set.is_empty()),
                        Some(a) => {
                            assert!(a < set.len());
                            if active >= index {
                                assert_eq!(a, index.saturating_sub(1));
                            } else {
                                assert_eq!(a, active);
                                assert_eq!(set.active_id(), active_id);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_remove_before_active_moves_to_preceding_slot() {
        let mut fx = Fixture::new();
        let mut set = fx.set_of(4);
        set.select(3);
        set.remove(0);
        assert_eq!(set.active_index(), Some(0));

        let mut set = fx.set_of(5);
        set.select(4);
        set.remove(2);
        assert_eq!(set.active_index(), Some(1));
    }

    #[test]
    fn test_remove_out_of_bounds_is_noop() {
        let mut fx = Fixture::new();
        let mut set = fx.set_of(2);
        assert!(set.remove(2).is_none());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_releases_preview() {
        let mut fx = Fixture::new();
        let mut set = fx.set_of(3);
        assert_eq!(fx.resources.live(), 3);
        set.remove(1);
        assert_eq!(fx.resources.live(), 2);
        assert_eq!(fx.resources.released(), 1);

        drop(set);
        assert_eq!(fx.resources.live(), 0);
        assert_eq!(fx.resources.released(), 3);
    }

    #[test]
    fn test_remove_last_entry_clears_active() {
        let mut fx = Fixture::new();
        let mut set = fx.set_of(1);
        let generation = set.generation();
        set.remove(0);
        assert_eq!(set.active_index(), None);
        assert!(set.generation() > generation);
    }

    #[test]
    fn test_arrow_navigation_clamps() {
        let mut fx = Fixture::new();
        let mut set = fx.set_of(3);
        set.select_next();
        assert_eq!(set.active_index(), Some(2));
        set.select_previous();
        set.select_previous();
        set.select_previous();
        assert_eq!(set.active_index(), Some(0));
    }

    #[test]
    fn test_replace_all() {
        let mut fx = Fixture::new();
        let mut set = fx.set_of(3);
        let old_ids: Vec<_> = set.entries().iter().map(DocumentEntry::id).collect();
        let replacement = vec![fx.entry("new.stl")];
        let replaced = set.replace_all(replacement);
        assert_eq!(replaced.iter().map(|h| h.id).collect::<Vec<_>>(), old_ids);
        assert_eq!(set.len(), 1);
        assert_eq!(set.active_index(), Some(0));
        assert_eq!(fx.resources.live(), 1);
    }

    #[test]
    fn test_status_tracking() {
        let mut fx = Fixture::new();
        let mut set = fx.set_of(2);
        let id = set.active_id().unwrap();
        assert_eq!(set.status(id), Some(&GeometryStatus::Pending));
        set.set_status(id, GeometryStatus::Rejected("truncated".into()));
        assert!(set.status(id).unwrap().is_rejected());
    }
}
