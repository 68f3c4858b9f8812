//! Repository layer: write access to the school schema.
//!
//! # Responsibility
//! - Define the batch insert contract the seeder depends on.
//! - Isolate SQLite statement details from seeding orchestration.
//!
//! # Invariants
//! - Repository writes validate inputs before persistence.
//! - One `insert_*` call maps to exactly one committed transaction.

pub mod school_repo;
