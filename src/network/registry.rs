//! Typed arena registries.
//!
//! Entities live in per-kind vectors owned by the network and refer to
//! one another through copyable handles, so a whole network clones as a
//! unit with no shared references between runs.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::models::NodeId;

/// A typed index into one registry.
pub trait Handle: Copy + Eq {
    /// Wraps a raw position.
    fn from_index(index: usize) -> Self;
    /// Raw position in the registry.
    fn index(self) -> usize;
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl Handle for $name {
            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }
    };
}

handle!(
    /// Handle of a station.
    StationIdx
);
handle!(
    /// Handle of a route.
    RouteIdx
);
handle!(
    /// Handle of a depot.
    DepotIdx
);
handle!(
    /// Handle of a train.
    TrainIdx
);

/// Entities of one kind, addressable by handle or by id.
#[derive(Debug, Clone)]
pub struct Registry<H, T> {
    items: Vec<T>,
    ids: HashMap<NodeId, usize>,
    _handle: PhantomData<H>,
}

impl<H, T> Default for Registry<H, T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ids: HashMap::new(),
            _handle: PhantomData,
        }
    }
}

impl<H: Handle, T> Registry<H, T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `item` under `id`. Returns `None` if `id` is taken.
    pub fn insert(&mut self, id: NodeId, item: T) -> Option<H> {
        if self.ids.contains_key(&id) {
            return None;
        }
        let index = self.items.len();
        self.items.push(item);
        self.ids.insert(id, index);
        Some(H::from_index(index))
    }

    /// Handle registered under `id`.
    pub fn lookup(&self, id: NodeId) -> Option<H> {
        self.ids.get(&id).map(|&index| H::from_index(index))
    }

    /// Entity registered under `id`.
    pub fn by_id(&self, id: NodeId) -> Option<&T> {
        self.ids.get(&id).map(|&index| &self.items[index])
    }

    /// Entity behind `handle`.
    ///
    /// Handles are only minted by this registry, so indexing cannot miss.
    pub fn get(&self, handle: H) -> &T {
        &self.items[handle.index()]
    }

    /// Mutable entity behind `handle`.
    pub fn get_mut(&mut self, handle: H) -> &mut T {
        &mut self.items[handle.index()]
    }

    /// Entities with their handles, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (H::from_index(index), item))
    }

    /// Mutable entities, in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.items.iter_mut()
    }

    /// All handles, in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        (0..self.items.len()).map(H::from_index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut registry: Registry<StationIdx, &str> = Registry::new();
        let a = registry.insert(10, "a").unwrap();
        let b = registry.insert(20, "b").unwrap();

        assert_eq!(registry.lookup(20), Some(b));
        assert_eq!(*registry.get(a), "a");
        assert_eq!(registry.by_id(10), Some(&"a"));
        assert_eq!(registry.lookup(30), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry: Registry<DepotIdx, u8> = Registry::new();
        assert!(registry.insert(1, 0).is_some());
        assert!(registry.insert(1, 1).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_iteration_order() {
        let mut registry: Registry<TrainIdx, u32> = Registry::new();
        for id in [5, 3, 9] {
            registry.insert(id, id * 10);
        }
        let values: Vec<u32> = registry.iter().map(|(_, &v)| v).collect();
        assert_eq!(values, vec![50, 30, 90]);

        let handles: Vec<usize> = registry.handles().map(Handle::index).collect();
        assert_eq!(handles, vec![0, 1, 2]);
    }
}
