//! Unique keys for entities.

/// An entity that can name itself with a stable string key.
///
/// The key is a display/deduplication aid only; repositories do not turn it
/// into a database constraint.
pub trait UniquelyIdentified {
    /// Returns a string key able to uniquely identify this value.
    fn unique_key(&self) -> &str;
}
