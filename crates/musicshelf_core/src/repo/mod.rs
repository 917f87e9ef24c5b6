//! Read-only data access over the `music_content` table.
//!
//! # Responsibility
//! - Execute caller SQL and fixed filter queries.
//! - Keep SQL text and bind details inside the core boundary.
//!
//! # Invariants
//! - Nothing in this layer writes to storage or opens transactions.
//! - A query yields either every mapped row or an error, never a prefix.

pub mod track_repo;
