/// Errors from the remote store, the auth provider, or local persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("Remote store error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A row or payload could not be (de)serialized.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The auth provider rejected the credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Local persistence could not be read or written.
    #[error("Local storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}
