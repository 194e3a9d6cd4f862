//! Specification pattern for in-memory row filtering
//!
//! A specification is a predicate object over a value. Search predicates
//! implement it so the same composite can be checked against already
//! projected rows, independently of the SQL it renders to.

/// Core specification trait
pub trait Specification<T>: Send + Sync {
    /// Check if the value satisfies this specification
    fn is_satisfied_by(&self, value: &T) -> bool;

    /// Keep only the values that satisfy this specification, preserving order
    fn select<'a, I>(&self, values: I) -> Vec<&'a T>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
        Self: Sized,
    {
        values
            .into_iter()
            .filter(|value| self.is_satisfied_by(value))
            .collect()
    }
}
