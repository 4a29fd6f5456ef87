//! Resource management (transient preview handles)

use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

/// Tracks transient resources handed out to previews
///
/// Every resource is wrapped in a [`Scoped`] guard. Dropping the guard
/// releases the resource and removes it from the live set, so `live()` is the
/// number of handles that are still held somewhere.
#[derive(Clone, Default)]
pub struct ResourceManager {
    registry: Arc<Mutex<Registry>>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    live: HashMap<u64, String>,
    acquired_total: u64,
    released_total: u64,
}

/// Resource statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceStats {
    pub live: usize,
    pub acquired_total: u64,
    pub released_total: u64,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `resource` and register it under `label`
    pub fn acquire<T>(&self, label: impl Into<String>, resource: T) -> Scoped<T> {
        let label = label.into();
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.acquired_total += 1;
            registry.live.insert(id, label.clone());
            id
        };
        tracing::debug!("Resource acquired: #{} {}", id, label);

        Scoped {
            resource: Some(resource),
            id,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Number of handles not yet released
    pub fn live(&self) -> usize {
        self.registry.lock().live.len()
    }

    /// Labels of the handles not yet released, in acquisition order
    pub fn live_labels(&self) -> Vec<String> {
        let registry = self.registry.lock();
        let mut entries: Vec<_> = registry.live.iter().collect();
        entries.sort_by_key(|(id, _)| **id);
        entries.into_iter().map(|(_, label)| label.clone()).collect()
    }

    pub fn stats(&self) -> ResourceStats {
        let registry = self.registry.lock();
        ResourceStats {
            live: registry.live.len(),
            acquired_total: registry.acquired_total,
            released_total: registry.released_total,
        }
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("stats", &self.stats())
            .finish()
    }
}

/// A resource owned by a [`ResourceManager`] registration
///
/// Released (dropped and unregistered) when the guard goes out of scope.
pub struct Scoped<T> {
    resource: Option<T>,
    id: u64,
    registry: Arc<Mutex<Registry>>,
}

impl<T> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.resource {
            Some(resource) => resource,
            // Only taken in Drop
            None => unreachable!("scoped resource accessed after release"),
        }
    }
}

impl<T> Drop for Scoped<T> {
    fn drop(&mut self) {
        // Release the resource before unregistering it
        drop(self.resource.take());

        let label = {
            let mut registry = self.registry.lock();
            registry.released_total += 1;
            registry.live.remove(&self.id)
        };
        if let Some(label) = label {
            tracing::debug!("Resource released: #{} {}", self.id, label);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Scoped<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scoped")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let resources = ResourceManager::new();
        let a = resources.acquire("a.pdf", 1u32);
        let b = resources.acquire("b.pdf", 2u32);
        assert_eq!(resources.live(), 2);
        assert_eq!(*a + *b, 3);

        drop(a);
        assert_eq!(resources.live_labels(), vec!["b.pdf".to_string()]);

        drop(b);
        assert_eq!(
            resources.stats(),
            ResourceStats {
                live: 0,
                acquired_total: 2,
                released_total: 2
            }
        );
    }

    #[test]
    fn test_clones_share_registry() {
        let resources = ResourceManager::new();
        let other = resources.clone();
        let guard = other.acquire("shared", ());
        assert_eq!(resources.live(), 1);
        drop(guard);
        assert_eq!(resources.live(), 0);
    }

    #[test]
    fn test_release_across_threads() {
        let resources = ResourceManager::new();
        let guard = resources.acquire("moved", vec![0u8; 16]);
        std::thread::spawn(move || drop(guard)).join().unwrap();
        assert_eq!(resources.live(), 0);
    }
}
