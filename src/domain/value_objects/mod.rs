//! Value Objects
//!
//! Immutable value types shared across the domain.

mod hash;

pub use hash::ContentHash;
