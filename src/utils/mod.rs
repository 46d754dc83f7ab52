//! Various unsorted geometrical and logical operators.

pub use self::cleanup::remove_unused_points;
pub use self::obb::{center_cov, obb, Obb};
pub use self::sorted_pair::SortedPair;
pub use self::strided::points_from_strided;
pub use self::weighted_value::WeightedValue;

mod cleanup;
pub mod fx_hasher;
pub mod hashmap;
mod obb;
pub mod predicates;
mod sorted_pair;
mod strided;
mod weighted_value;
