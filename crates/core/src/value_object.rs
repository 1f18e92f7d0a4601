//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two instances holding the same attribute
/// values are interchangeable (a `Slug` derived from the same title, a price
/// in minor units). They are immutable; "changing" one means deriving a new
/// value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
