use thiserror::Error;

/// Failures surfaced by the RPC client.
///
/// Only the 409 session-refresh path is recovered internally; everything else
/// propagates to the caller.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("session handshake exhausted its retry budget")]
    TooManyRetries,
    #[error("daemon answered 409 without a usable session id header")]
    MissingSessionToken,
    #[error("daemon requires authorization")]
    AuthorizationRequired,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("daemon rejected the request: {0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
