use crate::math::Real;
use std::cmp::Ordering;

/// A value paired with a cost, ordered by that cost only.
///
/// `BinaryHeap<WeightedValue<T>>` pops the most expensive entry first. Wrap it in
/// `std::cmp::Reverse` to pop the cheapest one instead.
#[derive(Copy, Clone, Debug)]
pub struct WeightedValue<T> {
    /// The payload.
    pub value: T,
    /// The ordering key.
    pub cost: Real,
}

impl<T> WeightedValue<T> {
    /// Creates a new value packed with a cost.
    #[inline]
    pub fn new(value: T, cost: Real) -> WeightedValue<T> {
        WeightedValue { value, cost }
    }
}

impl<T> PartialEq for WeightedValue<T> {
    #[inline]
    fn eq(&self, other: &WeightedValue<T>) -> bool {
        self.cost.eq(&other.cost)
    }
}

impl<T> Eq for WeightedValue<T> {}

impl<T> PartialOrd for WeightedValue<T> {
    #[inline]
    fn partial_cmp(&self, other: &WeightedValue<T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for WeightedValue<T> {
    #[inline]
    fn cmp(&self, other: &WeightedValue<T>) -> Ordering {
        if self.cost < other.cost {
            Ordering::Less
        } else if self.cost > other.cost {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}
