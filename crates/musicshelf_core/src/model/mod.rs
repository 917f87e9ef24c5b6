//! Catalog domain model.
//!
//! # Responsibility
//! - Define the canonical `Track` record shared by every query.
//! - Own the row-to-record boundary so storage quirks stop here.
//!
//! # Invariants
//! - Every song/album/playlist/artist entry maps to exactly one `Track`.
//! - Records are snapshots; nothing here refers back to storage.

pub mod track;
