//! Local admin server for the dorama catalog.
//!
//! Manages the image directory, overwrites the JSON data file, and runs the
//! image conversion script. Exposed as a library so integration tests and
//! the `dorama-admin` binary build the same router.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
