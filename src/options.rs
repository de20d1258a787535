/// How [`SkipList::insert`](crate::skip_list::SkipList::insert) picks a node height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeightPolicy {
    /// Classic geometric heights: grow by one level with probability `1 / branching`.
    #[default]
    Geometric,

    /// Uniform draw in `[1, MAX_HEIGHT]`, clamped to at most one level above the
    /// current frontier. The frontier therefore rises by at most one per insert.
    ClampToFrontier,
}

#[derive(Clone, Copy, Debug)]
pub struct ListOptions {
    pub(crate) height_policy: HeightPolicy,

    pub(crate) branching: u32,

    pub(crate) seed: Option<u64>,
}

impl Default for ListOptions {
    fn default() -> Self {
        SkipListOptions::default().build()
    }
}

#[derive(Debug)]
pub struct SkipListOptions {
    height_policy: HeightPolicy,

    branching: u32,

    seed: Option<u64>,
}

impl Default for SkipListOptions {
    fn default() -> Self {
        Self {
            height_policy: HeightPolicy::Geometric,
            branching: 4,
            seed: None,
        }
    }
}

impl SkipListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Height selection strategy
    pub fn height_policy(&mut self, policy: HeightPolicy) -> &mut Self {
        self.height_policy = policy;
        self
    }

    /// Inverse probability of growing one more level, only used by
    /// [`HeightPolicy::Geometric`]. Values below 2 are raised to 2.
    pub fn branching(&mut self, branching: u32) -> &mut Self {
        self.branching = branching;
        self
    }

    /// Fixed seed for the height generator
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(&self) -> ListOptions {
        ListOptions {
            height_policy: self.height_policy,
            branching: self.branching.max(2),
            seed: self.seed,
        }
    }
}
