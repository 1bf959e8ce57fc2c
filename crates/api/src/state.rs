use std::sync::Arc;

use dorama_core::scripting::PythonExecutor;

use crate::config::AdminConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AdminConfig>,
    /// Runs the image conversion script.
    pub executor: Arc<PythonExecutor>,
}

impl AppState {
    pub fn new(config: AdminConfig) -> Self {
        let executor = PythonExecutor::new(config.python_bin.clone());
        Self {
            config: Arc::new(config),
            executor: Arc::new(executor),
        }
    }
}
