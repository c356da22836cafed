//! Shared value types and the crate error type.

/// Complex arithmetic used by the plane formulas.
pub mod complex;
/// Frame indices, rationals and canvas dimensions.
pub mod core;
/// Error taxonomy.
pub mod error;
