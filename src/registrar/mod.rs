pub mod vercel;

use async_trait::async_trait;

pub use vercel::HttpRegistrar;

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrarError {
    /// The registrar answered and refused the request. The message is shown to the user.
    Rejected(String),
    /// The registrar could not be reached or answered with something unreadable.
    Transport(String),
}

impl std::fmt::Display for RegistrarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrarError::Rejected(msg) => write!(f, "Registrar rejected request: {msg}"),
            RegistrarError::Transport(msg) => write!(f, "Registrar unavailable: {msg}"),
        }
    }
}

impl std::error::Error for RegistrarError {}

/// External service that claims and releases custom domains for the platform.
#[async_trait]
pub trait DomainRegistrar: Send + Sync {
    /// Claim `domain`. Returns the registrar's confirmation object untouched.
    async fn add_domain(&self, domain: &str) -> Result<serde_json::Value, RegistrarError>;

    async fn remove_domain(&self, domain: &str) -> Result<(), RegistrarError>;
}
