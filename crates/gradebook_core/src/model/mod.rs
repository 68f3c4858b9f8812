//! School domain model.
//!
//! # Responsibility
//! - Define the plain records shared by repository, seeder and queries.
//!
//! # Invariants
//! - Every record is identified by its SQLite row id.
//! - Records are created once and never updated or deleted.

pub mod records;
