//! Transparent forwarding of dashboard requests to the daemon.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::Response;
use tracing::{debug, warn};

use crate::GatewayContext;

/// Upper bound on a forwarded body; torrent files stay well under this.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Hop-by-hop headers never forwarded in either direction.
const HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

pub async fn proxy(
    State(ctx): State<GatewayContext>,
    request: Request,
) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", ctx.upstream, path_and_query);
    debug!(method = %parts.method, %target, "forwarding request");

    let mut headers = parts.headers;
    for name in HOP_HEADERS {
        headers.remove(*name);
    }

    let upstream = ctx
        .http
        .request(parts.method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|err| {
            warn!(error = %err, %target, "upstream request failed");
            StatusCode::BAD_GATEWAY
        })?;

    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    for name in HOP_HEADERS {
        headers.remove(*name);
    }
    let bytes = upstream.bytes().await.map_err(|err| {
        warn!(error = %err, %target, "upstream body read failed");
        StatusCode::BAD_GATEWAY
    })?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
