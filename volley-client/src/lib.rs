use thiserror::Error;
use volley_schema::SchemaError;

pub mod api;
pub mod auth;
pub mod config;
pub mod retry;
pub mod transport;

pub use api::{ApiClient, ListQuery, Resource};
pub use auth::{AuthTransport, RefreshEndpoint, Session, TokenRefresher, Tokens};
pub use config::{ClientConfig, ConfigError};
pub use retry::RetryTransport;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("not authenticated")]
    Unauthorized,

    #[error(transparent)]
    Validation(#[from] SchemaError),

    #[error("failed to serialize/deserialize message")]
    Serde(#[from] serde_json::Error),
}

impl ClientError {
    /// Connection failures and server-side errors may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

type RetryingHttp = RetryTransport<HttpTransport>;

pub type HttpApiClient = ApiClient<AuthTransport<RetryingHttp, RefreshEndpoint<RetryingHttp>>>;

/// Builds the standard decorated transport: retries wrap the raw HTTP calls and
/// authentication wraps the retries.
pub fn connect(config: &ClientConfig, session: Session) -> Result<HttpApiClient, ClientError> {
    let http = HttpTransport::new(config)?;
    let retrying = RetryTransport::new(http, config.max_retries, config.retry_backoff);
    let refresher = RefreshEndpoint::new(retrying.clone());
    let transport = AuthTransport::new(retrying, refresher, session.clone());
    Ok(ApiClient::new(transport, session))
}
