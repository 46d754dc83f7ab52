use std::cmp::PartialOrd;
use std::ops::Deref;

/// A pair of elements sorted in increasing order.
///
/// Used as the key of undirected edges and of unordered cluster pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SortedPair<T: PartialOrd>([T; 2]);

impl<T: PartialOrd> SortedPair<T> {
    /// Sorts two elements in increasing order into a new pair.
    pub fn new(element1: T, element2: T) -> Self {
        if element1 > element2 {
            SortedPair([element2, element1])
        } else {
            SortedPair([element1, element2])
        }
    }

    /// The smallest element of this pair.
    #[inline]
    pub fn first(&self) -> &T {
        &self.0[0]
    }

    /// The largest element of this pair.
    #[inline]
    pub fn second(&self) -> &T {
        &self.0[1]
    }
}

impl<T: PartialOrd> Deref for SortedPair<T> {
    type Target = [T; 2];

    fn deref(&self) -> &[T; 2] {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::SortedPair;

    #[test]
    fn pair_is_order_independent() {
        assert_eq!(SortedPair::new(4, 1), SortedPair::new(1, 4));
        let pair = SortedPair::new(7u32, 2);
        assert_eq!((*pair.first(), *pair.second()), (2, 7));
        assert_eq!(*pair, [2, 7]);
    }
}
