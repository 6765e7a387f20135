//! Transient preview resources
//!
//! Each document-set entry owns one [`PreviewHandle`], the equivalent of a
//! short-lived object URL pointing at the document bytes. A handle is released
//! exactly once: explicitly through [`PreviewHandle::release`] or implicitly
//! when dropped. The issuing [`PreviewResources`] registry keeps counters so
//! leaks and double releases can be observed.

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

#[derive(Debug, Default)]
struct Counters {
    minted: AtomicU64,
    live: AtomicUsize,
    released: AtomicUsize,
}

/// Registry issuing preview handles
#[derive(Debug, Clone, Default)]
pub struct PreviewResources {
    counters: Arc<Counters>,
}

impl PreviewResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a new handle
    pub fn acquire(&self) -> PreviewHandle {
        let n = self.counters.minted.fetch_add(1, Ordering::Relaxed) + 1;
        self.counters.live.fetch_add(1, Ordering::Relaxed);
        PreviewHandle {
            url: format!("blob:jewelviz/{}", n),
            counters: Arc::clone(&self.counters),
            released: false,
        }
    }

    /// Handles acquired and not yet released
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::Relaxed)
    }

    /// Total number of releases performed
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::Relaxed)
    }
}

/// Exclusive, releasable reference to a document's bytes
#[derive(Debug)]
pub struct PreviewHandle {
    url: String,
    counters: Arc<Counters>,
    released: bool,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release the handle. Repeated calls are no-ops.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.counters.live.fetch_sub(1, Ordering::Relaxed);
        self.counters.released.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(url = %self.url, "Released preview handle");
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_mints_unique_urls() {
        let resources = PreviewResources::new();
        let a = resources.acquire();
        let b = resources.acquire();
        assert_ne!(a.url(), b.url());
        assert!(a.url().starts_with("blob:jewelviz/"));
        assert_eq!(resources.live(), 2);
    }

    #[test]
    fn test_double_release_is_noop() {
        let resources = PreviewResources::new();
        let mut handle = resources.acquire();
        handle.release();
        handle.release();
        assert!(handle.is_released());
        assert_eq!(resources.live(), 0);
        assert_eq!(resources.released(), 1);

        drop(handle);
        assert_eq!(resources.released(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let resources = PreviewResources::new();
        {
            let _handle = resources.acquire();
            assert_eq!(resources.live(), 1);
        }
        assert_eq!(resources.live(), 0);
        assert_eq!(resources.released(), 1);
    }
}
