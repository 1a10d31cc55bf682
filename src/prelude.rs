//! Traits which, typically, may be imported without concern: `use argent::prelude::*`.

/// Behaviour for multiple (0 to many) items T to be collected together.
// Needs to be imported in order to implement a custom `Collectable`.
pub trait Collectable<T> {
    /// Add a value to this `Collectable`.
    fn add(&mut self, item: T);

    /// Remove every value from this `Collectable`.
    fn clear(&mut self);
}

/// Behaviour for key/value pairs K/V to be gathered into a map.
// Needs to be imported in order to implement a custom `Associative`.
pub trait Associative<K, V> {
    /// Insert a key/value pair into this `Associative`.
    fn put(&mut self, key: K, value: V);

    /// Remove every entry from this `Associative`.
    fn clear(&mut self);
}
