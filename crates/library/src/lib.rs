//! Client-side state for the dorama catalog.
//!
//! - [`user_data::UserDataManager`] answers "is this drama a favorite, and
//!   what status does it have" for the current session, over a local or a
//!   cloud [`overlay::OverlayStore`].
//! - [`catalog::CatalogManager`] derives the visible page from the item set,
//!   the filter/search/page cursor, and the user data.
//! - [`session::AuthBridge`] performs auth transitions and broadcasts them.
//! - [`app::CatalogApp`] wires everything together and reacts to auth
//!   changes.

pub mod actors;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod overlay;
pub mod reviews;
pub mod session;
pub mod theme;
pub mod user_data;

pub use app::{AppDeps, CatalogApp};
pub use catalog::{CatalogManager, CatalogView};
pub use config::ClientConfig;
pub use error::LibraryError;
pub use user_data::UserDataManager;
