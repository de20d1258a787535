use std::cmp;

mod default_comparator;
mod fn_comparator;

pub mod prelude {
    #![allow(unused)]

    pub use super::Comparator;
    pub use super::default_comparator::DefaultComparator;
    pub use super::fn_comparator::FnComparator;
}

/// Three-way comparison over `Item`.
///
/// Implementations must describe a strict total order. An inconsistent
/// comparator leaves the list in an unspecified order but never makes it unsound.
pub trait Comparator: Send + Sync + Clone {
    type Item;

    fn compare(&self, a: &Self::Item, b: &Self::Item) -> cmp::Ordering;
}
