//! Dorama domain core.
//!
//! Pure types and functions shared by every other crate: catalog entities,
//! the watch-status vocabulary, filter/search/pagination rules, image
//! naming, admin filename validation, review validation, and the
//! subprocess runner used by the admin image conversion.
//!
//! Nothing in here talks to the network or to browser-like storage.

pub mod actor;
pub mod catalog;
pub mod drama;
pub mod error;
pub mod naming;
pub mod review;
pub mod scripting;
pub mod session;
pub mod status;
pub mod types;
