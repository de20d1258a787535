use std::{
    cmp::Ordering::*,
    fmt,
    iter::FusedIterator,
    mem,
    sync::atomic::{AtomicU32, AtomicUsize, Ordering::*},
};

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    comparator::prelude::*,
    error::{Error, Result},
    node_arena::{Handle, NIL, Node, NodeArena},
    options::{HeightPolicy, ListOptions},
};

pub const MAX_HEIGHT: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeRef {
    Head,
    Node(Handle),
}

struct Writer {
    rng: StdRng,
}

impl Writer {
    fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    // [1, MAX_HEIGHT]
    fn random_height(&mut self, opts: &ListOptions, frontier: usize) -> usize {
        match opts.height_policy {
            HeightPolicy::Geometric => {
                let mut h = 1;
                while h < MAX_HEIGHT && self.rng.random_ratio(1, opts.branching) {
                    h += 1;
                }
                h
            }
            HeightPolicy::ClampToFrontier => {
                let h = self.rng.random_range(1..=MAX_HEIGHT);
                if h > frontier { frontier + 1 } else { h }
            }
        }
    }
}

/// An ordered set of unique keys.
///
/// Any number of threads may read (`has_key`, iterators) while one thread
/// inserts. Readers never block; inserts are serialized by an internal lock.
pub struct SkipList<K, C> {
    height: AtomicUsize,
    head: [AtomicU32; MAX_HEIGHT],
    arena: NodeArena<K>,
    writer: Mutex<Writer>,
    opts: ListOptions,
    c: C,
}

impl<K, C> Default for SkipList<K, C>
where
    C: Comparator<Item = K> + Default,
{
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<K, C> SkipList<K, C>
where
    C: Comparator<Item = K>,
{
    pub fn new(c: C) -> Self {
        Self::with_options(c, ListOptions::default())
    }

    pub fn with_options(c: C, opts: ListOptions) -> Self {
        SkipList {
            height: AtomicUsize::new(1),
            head: [const { AtomicU32::new(NIL) }; MAX_HEIGHT],
            arena: NodeArena::new(),
            writer: Mutex::new(Writer::new(opts.seed)),
            opts,
            c,
        }
    }

    /// Restarts the height generator from `seed`.
    pub fn reseed(&self, seed: u64) {
        self.writer.lock().rng = StdRng::seed_from_u64(seed);
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest level populated by any node, at least 1.
    pub fn max_height(&self) -> usize {
        self.height()
    }

    pub fn mem_usage(&self) -> usize {
        mem::size_of_val(&self.head) + self.arena.mem_usage()
    }

    fn height(&self) -> usize {
        self.height.load(Acquire)
    }

    fn tower(&self, node: NodeRef) -> &[AtomicU32] {
        match node {
            NodeRef::Head => &self.head[..],
            NodeRef::Node(handle) => &self.arena.get(handle).tower[..],
        }
    }

    fn get_next(&self, node: NodeRef, level: usize) -> Option<Handle> {
        let next = self.tower(node)[level].load(Acquire);
        (next != NIL).then_some(next)
    }

    fn key_of(&self, handle: Handle) -> &K {
        &self.arena.get(handle).key
    }

    /// Smallest node with a key `>= key`. When `prev` is given, `prev[level]`
    /// receives the last node before `key` on every level in use.
    fn find_equal_or_greater_node(
        &self,
        key: &K,
        mut prev: Option<&mut [NodeRef; MAX_HEIGHT]>,
    ) -> Option<Handle> {
        let mut cur = NodeRef::Head;
        let mut level = self.height() - 1;

        loop {
            let next = self.get_next(cur, level);
            match next {
                Some(next) if self.c.compare(self.key_of(next), key) == Less => {
                    cur = NodeRef::Node(next);
                }
                _ => {
                    if let Some(prev) = prev.as_deref_mut() {
                        prev[level] = cur;
                    }
                    if level == 0 {
                        return next;
                    }
                    level -= 1;
                }
            }
        }
    }

    /// Last node with a key `< key`, or the head.
    fn find_less_node(&self, key: &K) -> NodeRef {
        let mut cur = NodeRef::Head;
        let mut level = self.height() - 1;

        loop {
            match self.get_next(cur, level) {
                Some(next) if self.c.compare(self.key_of(next), key) == Less => {
                    cur = NodeRef::Node(next);
                }
                _ => {
                    if level == 0 {
                        return cur;
                    }
                    level -= 1;
                }
            }
        }
    }

    fn find_last_node(&self) -> NodeRef {
        let mut cur = NodeRef::Head;
        let mut level = self.height() - 1;

        loop {
            match self.get_next(cur, level) {
                Some(next) => cur = NodeRef::Node(next),
                None => {
                    if level == 0 {
                        return cur;
                    }
                    level -= 1;
                }
            }
        }
    }

    /// Inserts `key`.
    ///
    /// Fails with [`Error::DuplicateKey`] if an equal key is present, or with
    /// an allocation error. The list is unchanged on failure.
    pub fn insert(&self, key: K) -> Result<()> {
        let mut writer = self.writer.lock();

        let mut prev = [NodeRef::Head; MAX_HEIGHT];
        if let Some(next) = self.find_equal_or_greater_node(&key, Some(&mut prev)) {
            if self.c.compare(self.key_of(next), &key) == Equal {
                return Err(Error::DuplicateKey);
            }
        }

        let prev_height = self.height();
        let height = writer.random_height(&self.opts, prev_height);

        // levels above `prev_height` keep the head as predecessor
        let mut succ = [NIL; MAX_HEIGHT];
        for (level, slot) in succ.iter_mut().enumerate().take(height) {
            *slot = self.tower(prev[level])[level].load(Relaxed);
        }

        // SAFETY: pushes are serialized by the writer lock.
        let handle = Node::new(key, &succ[..height])
            .and_then(|node| unsafe { self.arena.push(node) })
            .inspect_err(|e| tracing::error!("insert failed, height: {}, err: {}", height, e))?;

        if height > prev_height {
            tracing::debug!("max height change from {} to {}", prev_height, height);
            self.height.store(height, Release);
        }

        for (level, node) in prev.iter().enumerate().take(height) {
            self.tower(*node)[level].store(handle, Release);
        }

        Ok(())
    }

    pub fn has_key(&self, key: &K) -> bool {
        self.find_equal_or_greater_node(key, None)
            .is_some_and(|next| self.c.compare(self.key_of(next), key) == Equal)
    }

    pub fn first_key(&self) -> Option<&K> {
        self.get_next(NodeRef::Head, 0).map(|h| self.key_of(h))
    }

    pub fn last_key(&self) -> Option<&K> {
        match self.find_last_node() {
            NodeRef::Head => None,
            NodeRef::Node(h) => Some(self.key_of(h)),
        }
    }

    pub fn iter(&self) -> SkipListIter<'_, K, C> {
        SkipListIter::new(self)
    }

    pub fn keys(&self) -> Keys<'_, K, C> {
        Keys::new(self)
    }
}

impl<K, C> fmt::Debug for SkipList<K, C>
where
    K: fmt::Debug,
    C: Comparator<Item = K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl<'a, K, C> IntoIterator for &'a SkipList<K, C>
where
    C: Comparator<Item = K>,
{
    type Item = &'a K;
    type IntoIter = Keys<'a, K, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    BeforeFirst,
    At(Handle),
    PastLast,
}

impl From<Option<Handle>> for Position {
    fn from(node: Option<Handle>) -> Self {
        node.map_or(Position::PastLast, Position::At)
    }
}

impl From<NodeRef> for Position {
    fn from(node: NodeRef) -> Self {
        match node {
            NodeRef::Head => Position::BeforeFirst,
            NodeRef::Node(h) => Position::At(h),
        }
    }
}

/// Cursor over a [`SkipList`].
///
/// Besides being on a key, the cursor can sit before the first key (after
/// `prev` from the first key) or past the last one (after `next` from the last
/// key or a `seek` beyond every key). Both count as not valid.
pub struct SkipListIter<'a, K, C> {
    list: &'a SkipList<K, C>,
    cur: Position,
}

impl<K, C> Clone for SkipListIter<'_, K, C> {
    fn clone(&self) -> Self {
        Self {
            list: self.list,
            cur: self.cur,
        }
    }
}

impl<'a, K, C> SkipListIter<'a, K, C>
where
    C: Comparator<Item = K>,
{
    /// Creates a cursor positioned on the smallest key.
    pub fn new(list: &'a SkipList<K, C>) -> Self {
        let mut iter = SkipListIter {
            list,
            cur: Position::PastLast,
        };
        iter.seek_to_first();
        iter
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.cur, Position::At(_))
    }

    pub fn is_before_first(&self) -> bool {
        self.cur == Position::BeforeFirst
    }

    pub fn is_past_last(&self) -> bool {
        self.cur == Position::PastLast
    }

    pub fn key(&self) -> Result<&'a K> {
        match self.cur {
            Position::At(h) => Ok(self.list.key_of(h)),
            _ => Err(Error::InvalidIterator),
        }
    }

    pub fn next(&mut self) {
        self.cur = match self.cur {
            Position::BeforeFirst => self.list.get_next(NodeRef::Head, 0).into(),
            Position::At(h) => self.list.get_next(NodeRef::Node(h), 0).into(),
            Position::PastLast => Position::PastLast,
        };
    }

    /// Steps back with a fresh search from the head, there are no back links.
    pub fn prev(&mut self) {
        self.cur = match self.cur {
            Position::BeforeFirst => Position::BeforeFirst,
            Position::At(h) => self.list.find_less_node(self.list.key_of(h)).into(),
            Position::PastLast => self.list.find_last_node().into(),
        };
    }

    /// Moves to the first key `>= target`.
    pub fn seek(&mut self, target: &K) {
        self.cur = self.list.find_equal_or_greater_node(target, None).into();
    }

    /// Moves to the last key `<= target`.
    pub fn seek_for_prev(&mut self, target: &K) {
        self.seek(target);
        match self.key() {
            Ok(key) if self.list.c.compare(key, target) == Equal => {}
            _ => self.cur = self.list.find_less_node(target).into(),
        }
    }

    pub fn seek_to_first(&mut self) {
        self.cur = self.list.get_next(NodeRef::Head, 0).into();
    }

    pub fn seek_to_last(&mut self) {
        self.cur = self.list.find_last_node().into();
    }
}

/// Ascending iterator over the keys of a [`SkipList`], also walkable from the back.
pub struct Keys<'a, K, C> {
    list: &'a SkipList<K, C>,
    front: Option<Handle>,
    back: Option<Handle>,
}

impl<'a, K, C> Keys<'a, K, C>
where
    C: Comparator<Item = K>,
{
    fn new(list: &'a SkipList<K, C>) -> Self {
        let front = list.get_next(NodeRef::Head, 0);
        let back = match list.find_last_node() {
            NodeRef::Head => None,
            NodeRef::Node(h) => Some(h),
        };
        Self { list, front, back }
    }

    fn finish(&mut self) {
        self.front = None;
        self.back = None;
    }
}

impl<'a, K, C> Iterator for Keys<'a, K, C>
where
    C: Comparator<Item = K>,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.front?;
        if self.back == Some(cur) {
            self.finish();
        } else {
            self.front = self.list.get_next(NodeRef::Node(cur), 0);
        }
        Some(self.list.key_of(cur))
    }
}

impl<K, C> DoubleEndedIterator for Keys<'_, K, C>
where
    C: Comparator<Item = K>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let cur = self.back?;
        if self.front == Some(cur) {
            self.finish();
        } else {
            self.back = match self.list.find_less_node(self.list.key_of(cur)) {
                NodeRef::Head => None,
                NodeRef::Node(h) => Some(h),
            };
        }
        Some(self.list.key_of(cur))
    }
}

impl<K, C> FusedIterator for Keys<'_, K, C> where C: Comparator<Item = K> {}
