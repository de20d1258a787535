use std::{
    mem::{self, MaybeUninit},
    ptr,
    sync::atomic::{AtomicPtr, AtomicU32, AtomicUsize, Ordering::*},
};

use crate::error::{Error, Result};

/// Index of a node inside a [`NodeArena`].
pub(crate) type Handle = u32;

/// Tower slot value meaning "no successor".
pub(crate) const NIL: Handle = Handle::MAX;

const FIRST_CHUNK_BITS: u32 = 5;
const FIRST_CHUNK_LEN: usize = 1 << FIRST_CHUNK_BITS;

// chunk `i` holds `FIRST_CHUNK_LEN << i` nodes, so 27 chunks cover every handle below NIL.
const CHUNK_COUNT: usize = 27;

pub(crate) const CAPACITY: usize = FIRST_CHUNK_LEN * ((1 << CHUNK_COUNT) - 1);

pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) tower: Box<[AtomicU32]>,
}

impl<K> Node<K> {
    /// Builds a node whose tower is initialized from `succ`, one slot per level.
    pub(crate) fn new(key: K, succ: &[Handle]) -> Result<Self> {
        assert!(!succ.is_empty());

        let mut tower = Vec::new();
        tower.try_reserve_exact(succ.len())?;
        tower.extend(succ.iter().map(|&h| AtomicU32::new(h)));

        Ok(Self {
            key,
            tower: tower.into_boxed_slice(),
        })
    }

    pub(crate) fn height(&self) -> usize {
        self.tower.len()
    }

    fn mem_usage(&self) -> usize {
        mem::size_of::<AtomicU32>() * self.height()
    }
}

/// Append-only node storage.
///
/// Nodes are placed in chunks of doubling size which are never moved or freed
/// before the arena itself is dropped, so a `&Node` handed out by [`get`](Self::get)
/// stays valid while the single writer keeps appending.
pub(crate) struct NodeArena<K> {
    chunks: [AtomicPtr<MaybeUninit<Node<K>>>; CHUNK_COUNT],
    len: AtomicUsize,
    mem_usage: AtomicUsize,
}

unsafe impl<K: Send> Send for NodeArena<K> {}
unsafe impl<K: Send + Sync> Sync for NodeArena<K> {}

impl<K> NodeArena<K> {
    pub(crate) fn new() -> Self {
        Self {
            chunks: [const { AtomicPtr::new(ptr::null_mut()) }; CHUNK_COUNT],
            len: AtomicUsize::new(0),
            mem_usage: AtomicUsize::new(0),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len.load(Acquire)
    }

    pub(crate) fn mem_usage(&self) -> usize {
        self.mem_usage.load(Relaxed)
    }

    /// Stores `node` and returns its handle.
    ///
    /// # Safety
    ///
    /// Calls must not overlap: at most one thread may push at any time.
    pub(crate) unsafe fn push(&self, node: Node<K>) -> Result<Handle> {
        let index = self.len.load(Relaxed);
        if index >= CAPACITY {
            return Err(Error::ArenaFull(index));
        }

        let (chunk, offset) = locate(index);
        let mut base = self.chunks[chunk].load(Acquire);
        if base.is_null() {
            base = self.alloc_chunk(chunk)?;
        }

        let node_size = mem::size_of::<Node<K>>() + node.mem_usage();
        unsafe {
            (*base.add(offset)).write(node);
        }
        self.mem_usage.fetch_add(node_size, Relaxed);
        self.len.store(index + 1, Release);

        Ok(index as Handle)
    }

    fn alloc_chunk(&self, chunk: usize) -> Result<*mut MaybeUninit<Node<K>>> {
        let chunk_len = FIRST_CHUNK_LEN << chunk;

        let mut mem = Vec::new();
        mem.try_reserve_exact(chunk_len)?;
        mem.resize_with(chunk_len, MaybeUninit::<Node<K>>::uninit);
        let base = Box::into_raw(mem.into_boxed_slice()) as *mut MaybeUninit<Node<K>>;

        tracing::trace!("alloc arena chunk {}, capacity: {}", chunk, chunk_len);
        self.chunks[chunk].store(base, Release);
        self.mem_usage
            .fetch_add(mem::size_of::<Node<K>>() * chunk_len, Relaxed);
        Ok(base)
    }

    pub(crate) fn get(&self, handle: Handle) -> &Node<K> {
        let index = handle as usize;
        // Acquiring `len` makes the node written before it visible.
        assert!(index < self.len(), "dangling handle {handle}");

        let (chunk, offset) = locate(index);
        let base = self.chunks[chunk].load(Acquire);
        unsafe { (*base.add(offset)).assume_init_ref() }
    }
}

impl<K> Default for NodeArena<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for NodeArena<K> {
    fn drop(&mut self) {
        let len = *self.len.get_mut();
        for index in 0..len {
            let (chunk, offset) = locate(index);
            unsafe {
                (*self.chunks[chunk].get_mut().add(offset)).assume_init_drop();
            }
        }

        for (chunk, base) in self.chunks.iter_mut().enumerate() {
            let base = *base.get_mut();
            if base.is_null() {
                break;
            }
            unsafe {
                drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                    base,
                    FIRST_CHUNK_LEN << chunk,
                )));
            }
        }
    }
}

// (chunk, offset in chunk)
fn locate(index: usize) -> (usize, usize) {
    let x = index + FIRST_CHUNK_LEN;
    let chunk = (usize::BITS - 1 - x.leading_zeros() - FIRST_CHUNK_BITS) as usize;
    (chunk, x - (FIRST_CHUNK_LEN << chunk))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_locate() {
        assert_eq!(locate(0), (0, 0));
        assert_eq!(locate(31), (0, 31));
        assert_eq!(locate(32), (1, 0));
        assert_eq!(locate(95), (1, 63));
        assert_eq!(locate(96), (2, 0));
        assert_eq!(locate(CAPACITY - 1), (CHUNK_COUNT - 1, (FIRST_CHUNK_LEN << 26) - 1));
        assert!(CAPACITY <= NIL as usize);
    }

    #[test]
    fn test_push_get() -> anyhow::Result<()> {
        let arena = NodeArena::new();
        for i in 0..1000_u32 {
            let handle = unsafe { arena.push(Node::new(i * 2, &[NIL, i])?)? };
            assert_eq!(handle, i);
        }
        assert_eq!(arena.len(), 1000);

        for i in 0..1000_u32 {
            let node = arena.get(i);
            assert_eq!(node.key, i * 2);
            assert_eq!(node.height(), 2);
            assert_eq!(node.tower[0].load(Ordering::Relaxed), NIL);
            assert_eq!(node.tower[1].load(Ordering::Relaxed), i);
        }
        Ok(())
    }

    #[test]
    fn test_mem_usage() -> anyhow::Result<()> {
        let arena = NodeArena::new();
        assert_eq!(arena.mem_usage(), 0);

        unsafe { arena.push(Node::new(1_u64, &[NIL])?)? };
        let first = arena.mem_usage();
        assert!(first >= mem::size_of::<Node<u64>>() * FIRST_CHUNK_LEN);

        unsafe { arena.push(Node::new(2_u64, &[NIL; 4])?)? };
        assert!(arena.mem_usage() > first);
        Ok(())
    }

    #[test]
    #[should_panic(expected = "dangling handle")]
    fn test_get_unpublished() {
        let arena: NodeArena<u64> = NodeArena::new();
        arena.get(0);
    }

    #[test]
    fn test_drop_nodes() -> anyhow::Result<()> {
        static DROP_COUNTER: AtomicUsize = AtomicUsize::new(0);

        struct DropItem;

        impl Drop for DropItem {
            fn drop(&mut self) {
                DROP_COUNTER.fetch_add(1, Ordering::SeqCst);
            }
        }

        let arena = NodeArena::new();
        for _ in 0..100 {
            unsafe { arena.push(Node::new(DropItem, &[NIL])?)? };
        }
        assert_eq!(DROP_COUNTER.load(Ordering::SeqCst), 0);

        drop(arena);
        assert_eq!(DROP_COUNTER.load(Ordering::SeqCst), 100);
        Ok(())
    }
}
