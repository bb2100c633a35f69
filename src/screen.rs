//! Keeps the view-model of each mounted screen between requests.
//!
//! Every page load mounts a new screen with its own state. Later htmx
//! requests name the screen in their URL so that handlers operate on the
//! same in-memory list the page was rendered from.

use std::{
    collections::BTreeMap,
    fmt::Display,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::Deserialize;

/// The default number of screens kept per registry.
pub const DEFAULT_MAX_SCREENS: usize = 256;

/// Identifies a mounted screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(u64);

impl Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings for the screen registries.
#[derive(Debug, Clone, Copy)]
pub struct ScreenConfig {
    /// How many screens of one kind to keep before evicting the oldest.
    pub max_screens: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            max_screens: DEFAULT_MAX_SCREENS,
        }
    }
}

/// A handle to a mounted screen's view-model.
///
/// The async mutex lets a handler hold the view-model while it waits on the
/// store, so actions on one screen run one after another.
pub type ScreenHandle<T> = Arc<tokio::sync::Mutex<T>>;

/// A bounded collection of mounted screens of one kind.
#[derive(Debug)]
pub struct ScreenRegistry<T> {
    max_screens: usize,
    next_id: AtomicU64,
    screens: Mutex<BTreeMap<ScreenId, ScreenHandle<T>>>,
}

impl<T> ScreenRegistry<T> {
    /// Create an empty registry holding up to `config.max_screens` screens.
    pub fn new(config: ScreenConfig) -> Self {
        Self {
            max_screens: config.max_screens.max(1),
            next_id: AtomicU64::new(1),
            screens: Mutex::new(BTreeMap::new()),
        }
    }

    /// Store `screen` under a new ID, evicting the oldest screens if the
    /// registry is full.
    pub fn mount(&self, screen: T) -> (ScreenId, ScreenHandle<T>) {
        let id = ScreenId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = Arc::new(tokio::sync::Mutex::new(screen));

        let mut screens = self.lock();
        while screens.len() >= self.max_screens {
            if let Some((evicted, _)) = screens.pop_first() {
                tracing::debug!("evicted screen {evicted}");
            }
        }
        screens.insert(id, handle.clone());
        tracing::debug!("mounted screen {id}");

        (id, handle)
    }

    /// Get the screen with `id`, or `None` if it was never mounted or has
    /// been evicted.
    pub fn get(&self, id: ScreenId) -> Option<ScreenHandle<T>> {
        self.lock().get(&id).cloned()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ScreenId, ScreenHandle<T>>> {
        // The map is only modified by single insert/remove calls, so a
        // poisoned lock still guards a consistent map.
        self.screens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::{ScreenConfig, ScreenRegistry};

    #[tokio::test]
    async fn mounted_screen_can_be_retrieved() {
        let registry = ScreenRegistry::new(ScreenConfig::default());

        let (id, _) = registry.mount(vec![1, 2, 3]);

        let screen = registry.get(id).expect("screen should be mounted");
        assert_eq!(*screen.lock().await, vec![1, 2, 3]);
    }

    #[test]
    fn screens_get_distinct_ids() {
        let registry = ScreenRegistry::new(ScreenConfig::default());

        let (first, _) = registry.mount(());
        let (second, _) = registry.mount(());

        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn oldest_screen_is_evicted_when_full() {
        let registry = ScreenRegistry::new(ScreenConfig { max_screens: 2 });

        let (first, _) = registry.mount("first");
        let (second, _) = registry.mount("second");
        let (third, _) = registry.mount("third");

        assert!(registry.get(first).is_none());
        assert!(registry.get(second).is_some());
        assert!(registry.get(third).is_some());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn evicted_handle_stays_usable_by_its_holder() {
        let registry = ScreenRegistry::new(ScreenConfig { max_screens: 1 });
        let (_, handle) = registry.mount(String::from("kept"));

        registry.mount(String::from("newer"));

        assert_eq!(*handle.lock().await, "kept");
    }
}
