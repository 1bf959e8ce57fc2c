//! Row and payload types that only the storage layer needs.
//!
//! Entities shared with the rest of the workspace (`Drama`, `Actor`,
//! `Review`) live in `dorama_core`.

pub mod library;

pub use library::{LibraryEntry, LibraryPatch};
