//! Storage boundaries for the dorama catalog.
//!
//! - [`remote`]: row-level table access
//!   ([`RemoteStore`]) and the session-based auth provider
//!   ([`AuthProvider`]).
//! - [`supabase`]: HTTP implementation of both traits against PostgREST
//!   and GoTrue.
//! - [`memory`]: in-process implementation of both traits, used by tests
//!   and offline demos.
//! - [`local`]: synchronous key-value persistence that survives restarts
//!   ([`LocalStorage`]).

pub mod error;
pub mod local;
pub mod memory;
pub mod models;
pub mod remote;
pub mod supabase;

pub use error::StoreError;
pub use local::{FileStorage, LocalStorage, MemoryStorage};
pub use memory::MemoryBackend;
pub use remote::{AuthProvider, Credentials, RemoteStore, SignUpOutcome};
pub use supabase::{SupabaseClient, SupabaseConfig};
