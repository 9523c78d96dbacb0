//! Shared primitive types used across the analytics layer.

/// A stable, unique identifier for a venue record.
pub type EntityId = String;

/// Designated Market Area code.
pub type DmaCode = i64;
