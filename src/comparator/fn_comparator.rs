use std::{cmp, fmt, marker::PhantomData};

use super::Comparator;

/// Adapts a closure `Fn(&T, &T) -> Ordering` into a [`Comparator`].
pub struct FnComparator<T, F> {
    f: F,
    _marker: PhantomData<fn(&T, &T)>,
}

impl<T, F> FnComparator<T, F>
where
    F: Fn(&T, &T) -> cmp::Ordering,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Comparator for FnComparator<T, F>
where
    F: Fn(&T, &T) -> cmp::Ordering + Send + Sync + Clone,
{
    type Item = T;

    fn compare(&self, a: &Self::Item, b: &Self::Item) -> cmp::Ordering {
        (self.f)(a, b)
    }
}

impl<T, F: Clone> Clone for FnComparator<T, F> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, F> fmt::Debug for FnComparator<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparator")
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering::*;

    use crate::comparator::prelude::*;

    #[test]
    fn reverse_compare() {
        let cmp = FnComparator::new(|a: &u64, b: &u64| b.cmp(a));
        assert_eq!(cmp.compare(&1, &2), Greater);
        assert_eq!(cmp.compare(&2, &1), Less);
        assert_eq!(cmp.clone().compare(&3, &3), Equal);
    }

    #[test]
    fn three_way_compare() {
        // an integer-returning comparator, sign decides the order
        let three_way = |a: &i64, b: &i64| -> i64 { a - b };
        let cmp = FnComparator::new(move |a: &i64, b: &i64| three_way(a, b).cmp(&0));
        assert_eq!(cmp.compare(&-5, &5), Less);
        assert_eq!(cmp.compare(&5, &5), Equal);
    }
}
