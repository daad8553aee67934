use std::collections::BTreeSet;

/// Stable identifier of a feature within a [`crate::FeatureSet`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub u64);

/// The set of features currently visible to the renderer.
///
/// Mutated only on the Ready transition (insert) and on destroy (remove),
/// both main-thread only, so no locking is needed. A feature is removed
/// here before its buffers are released: the renderer never observes a
/// registered feature whose buffers are gone.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    ready: BTreeSet<FeatureId>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: FeatureId) {
        self.ready.insert(id);
    }

    pub fn remove(&mut self, id: FeatureId) -> bool {
        self.ready.remove(&id)
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.ready.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    /// Ready features in stable id order.
    pub fn iter(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.ready.iter().copied()
    }
}
