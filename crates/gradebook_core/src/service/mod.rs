//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate seeding and queries into the report flow.
//! - Keep the CLI decoupled from storage details.

pub mod report_service;
