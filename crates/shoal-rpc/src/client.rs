//! The session-authenticated RPC core and the public client handle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::RpcError;
use crate::protocol::{RpcRequest, SESSION_ID_HEADER};
use crate::watch::WatchRegistry;

/// Attempts allowed per logical call; each 409 consumes one.
const SESSION_ATTEMPTS: u32 = 2;

/// Low-level connection to the daemon: one fixed endpoint, one cached
/// session token shared by every request issued through this core. The token
/// is only ever written inside the 409-handling branch of [`RpcCore::call`]
/// and is never persisted.
pub(crate) struct RpcCore {
    http: reqwest::Client,
    endpoint: Url,
    auth: Option<(String, Option<String>)>,
    session_id: Mutex<Option<String>>,
}

impl RpcCore {
    fn connect(endpoint: &str) -> Result<Self, RpcError> {
        let mut raw = endpoint.trim().to_string();
        if raw.is_empty() {
            return Err(RpcError::InvalidEndpoint("endpoint cannot be empty".into()));
        }
        if !raw.starts_with("http://") && !raw.starts_with("https://") {
            raw = format!("http://{raw}");
        }
        let mut endpoint = Url::parse(&raw)
            .map_err(|err| RpcError::InvalidEndpoint(format!("{raw}: {err}")))?;

        // Userinfo in the URL becomes basic auth on every request.
        let auth = if endpoint.username().is_empty() {
            None
        } else {
            let auth = (
                endpoint.username().to_string(),
                endpoint.password().map(str::to_string),
            );
            let _ = endpoint.set_username("");
            let _ = endpoint.set_password(None);
            Some(auth)
        };

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            endpoint,
            auth,
            session_id: Mutex::new(None),
        })
    }

    pub(crate) fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one request, transparently refreshing the session token on 409.
    ///
    /// The re-issue after a 409 is strictly sequential: the second attempt is
    /// only built once the first response has been read.
    pub(crate) async fn call(&self, request: &RpcRequest) -> Result<Value, RpcError> {
        for _ in 0..SESSION_ATTEMPTS {
            let mut builder = self.http.post(self.endpoint.clone()).json(request);
            if let Some((user, password)) = &self.auth {
                builder = builder.basic_auth(user, password.as_deref());
            }
            let session_id = self.session_id.lock().unwrap().clone();
            if let Some(id) = session_id {
                builder = builder.header(SESSION_ID_HEADER, id);
            }

            let response = builder.send().await?;
            let status = response.status();

            if status == StatusCode::CONFLICT {
                let token = response
                    .headers()
                    .get(SESSION_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
                    .ok_or(RpcError::MissingSessionToken)?;
                debug!(method = request.method, "daemon issued a new session id");
                *self.session_id.lock().unwrap() = Some(token);
                continue;
            }

            if status == StatusCode::UNAUTHORIZED {
                return Err(RpcError::AuthorizationRequired);
            }

            if status.is_success() {
                return Ok(response.json().await?);
            }

            return Err(RpcError::RequestFailed(status_text(status)));
        }

        Err(RpcError::TooManyRetries)
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| status.to_string())
}

/// Client for a remote torrent daemon.
///
/// Cheap to clone; clones share the endpoint, the session token, and the
/// watch registry.
#[derive(Clone)]
pub struct TransmissionClient {
    core: Arc<RpcCore>,
    watches: Arc<WatchRegistry>,
}

impl TransmissionClient {
    /// Build a client for the given RPC endpoint. Accepts a bare host:port,
    /// a full URL, or a URL with userinfo for daemons behind basic auth.
    pub fn connect(endpoint: &str) -> Result<Self, RpcError> {
        let core = Arc::new(RpcCore::connect(endpoint)?);
        let watches = Arc::new(WatchRegistry::new(core.clone()));
        Ok(Self { core, watches })
    }

    pub fn endpoint(&self) -> &Url {
        self.core.endpoint()
    }

    /// The raw RPC primitive: send a request, get the decoded response body.
    ///
    /// No shape validation happens here; the typed wrappers layer that on.
    pub async fn call(&self, request: &RpcRequest) -> Result<Value, RpcError> {
        self.core.call(request).await
    }

    pub(crate) fn core(&self) -> &Arc<RpcCore> {
        &self.core
    }

    pub(crate) fn watches(&self) -> &WatchRegistry {
        &self.watches
    }
}
