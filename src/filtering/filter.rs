//! Filtering traits.

/// immutable, pure filter (2 successive equal inputs -> 2 equal outputs)
///
/// `detect` returns `true` when the filter recognizes the item
/// (for [super::Corruption], when the item looks corrupted).
pub trait Filter<T>: Default {
    fn detect(&self, item: T) -> bool;
}
