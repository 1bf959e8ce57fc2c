use std::path::PathBuf;

/// Admin server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running from the project root.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory of managed images (default: `assets/img`).
    pub image_dir: PathBuf,
    /// JSON array file overwritten by `save-json` (default: `data/dramas.json`).
    pub data_file: PathBuf,
    /// Image conversion script (default: `scripts/optimize_images.py`).
    pub convert_script: PathBuf,
    /// Interpreter used to run the conversion script (default: `python3`).
    pub python_bin: String,
    /// Conversion timeout in seconds (default: `600`).
    pub convert_timeout_secs: u64,
}

impl AdminConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                       |
    /// |------------------------|-------------------------------|
    /// | `HOST`                 | `0.0.0.0`                     |
    /// | `PORT`                 | `3000`                        |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                          |
    /// | `IMAGE_DIR`            | `assets/img`                  |
    /// | `DATA_FILE`            | `data/dramas.json`            |
    /// | `CONVERT_SCRIPT`       | `scripts/optimize_images.py`  |
    /// | `PYTHON_BIN`           | `python3`                     |
    /// | `CONVERT_TIMEOUT_SECS` | `600`                         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let convert_timeout_secs: u64 = std::env::var("CONVERT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("CONVERT_TIMEOUT_SECS must be a valid u64");

        let path_var = |key: &str, default: &str| -> PathBuf {
            std::env::var(key).unwrap_or_else(|_| default.into()).into()
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            image_dir: path_var("IMAGE_DIR", "assets/img"),
            data_file: path_var("DATA_FILE", "data/dramas.json"),
            convert_script: path_var("CONVERT_SCRIPT", "scripts/optimize_images.py"),
            python_bin: std::env::var("PYTHON_BIN").unwrap_or_else(|_| "python3".into()),
            convert_timeout_secs,
        }
    }
}
