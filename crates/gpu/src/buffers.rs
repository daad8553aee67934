use std::collections::BTreeMap;

/// Identifies a GPU-resident buffer in a deterministic, stable way.
///
/// Handles are small and copyable so they can be stored in per-feature
/// buffer sets and passed around without borrowing the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferHandle(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferInfo {
    /// Floats per vertex attribute (3 for positions/normals, 2 for UVs, ...).
    pub component_width: u32,
    /// Total number of floats uploaded.
    pub len: usize,
}

/// Owner of all GPU-resident buffer records.
///
/// Creation and release both happen on the main thread only. A handle is
/// valid from `create` until the first `release`; releasing it again is a
/// safe no-op (`release` returns `false`), which is what makes feature
/// destruction idempotent.
#[derive(Debug, Default)]
pub struct BufferStore {
    next_id: u64,
    live: BTreeMap<BufferHandle, BufferInfo>,
}

impl BufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, component_width: u32, data: &[f32]) -> BufferHandle {
        debug_assert!(component_width > 0);
        let handle = BufferHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.live.insert(
            handle,
            BufferInfo {
                component_width,
                len: data.len(),
            },
        );
        log::trace!(
            "buffer {:?} created: width={component_width} len={}",
            handle,
            data.len()
        );
        handle
    }

    /// Releases a buffer. Returns `true` exactly once per handle.
    pub fn release(&mut self, handle: BufferHandle) -> bool {
        let released = self.live.remove(&handle).is_some();
        if released {
            log::trace!("buffer {handle:?} released");
        }
        released
    }

    pub fn is_live(&self, handle: BufferHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn info(&self, handle: BufferHandle) -> Option<BufferInfo> {
        self.live.get(&handle).copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
