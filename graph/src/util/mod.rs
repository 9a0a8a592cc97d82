/// A bounded cache for memoizing pure computations.
pub mod cache;
