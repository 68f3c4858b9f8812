//! Synthetic data seeding.
//!
//! # Responsibility
//! - Generate referentially valid demo data through a seedable source.
//! - Persist it batch by batch through `SchoolRepository`.

pub mod seeder;
pub mod source;
