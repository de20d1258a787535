//! A concurrent-read skip list over unique keys.
//!
//! ```
//! use effective_skiplist::prelude::*;
//!
//! let list = SkipList::new(DefaultComparator::<u64>::default());
//! for k in [30, 10, 20] {
//!     list.insert(k).unwrap();
//! }
//! assert!(list.has_key(&20));
//!
//! let mut iter = list.iter();
//! iter.seek(&15);
//! assert_eq!(iter.key().unwrap(), &20);
//! iter.prev();
//! assert_eq!(iter.key().unwrap(), &10);
//! ```

mod node_arena;

pub mod comparator;
pub mod error;
pub mod options;
pub mod skip_list;

#[cfg(test)]
mod test_utils;

pub mod prelude {
    #![allow(unused)]

    pub use crate::comparator::prelude::*;
    pub use crate::error::Error;
    pub use crate::options::{HeightPolicy, ListOptions, SkipListOptions};
    pub use crate::skip_list::{Keys, MAX_HEIGHT, SkipList, SkipListIter};
}
