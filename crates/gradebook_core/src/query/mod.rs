//! Report query layer.
//!
//! # Responsibility
//! - Expose the ten read-only report questions as functions over an
//!   explicitly passed connection.
//!
//! # Invariants
//! - Absent matches are empty results, not errors.

pub mod report_queries;
