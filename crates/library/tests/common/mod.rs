//! Shared fixtures for library integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use dorama_core::drama::Drama;
use dorama_core::session::AuthUser;
use dorama_db::{AuthProvider, Credentials, MemoryBackend, MemoryStorage};
use dorama_library::config::ClientConfig;
use dorama_library::{AppDeps, UserDataManager};

pub const EMAIL: &str = "mina@example.com";
pub const PASSWORD: &str = "hunter2";

pub fn two_dramas() -> Vec<Drama> {
    vec![
        Drama::new(1, "A", &["Drama"]),
        Drama::new(2, "B", &["Comedy"]),
    ]
}

pub struct Harness {
    pub backend: Arc<MemoryBackend>,
    pub storage: Arc<MemoryStorage>,
}

impl Harness {
    pub fn new(dramas: Vec<Drama>) -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new().with_dramas(dramas)),
            storage: Arc::new(MemoryStorage::new()),
        }
    }

    pub fn user_data(&self) -> UserDataManager {
        UserDataManager::new(self.backend.clone(), self.storage.clone())
    }

    pub fn deps(&self) -> AppDeps {
        AppDeps {
            remote: self.backend.clone(),
            auth: self.backend.clone(),
            storage: self.storage.clone(),
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::from_lookup(|_| None).expect("default config")
    }

    /// Register and sign in directly against the backend.
    pub async fn sign_in(&self) -> AuthUser {
        let user = self.backend.add_account(EMAIL, PASSWORD);
        self.backend
            .sign_in_with_password(&Credentials::new(EMAIL, PASSWORD))
            .await
            .expect("sign in");
        user
    }
}
