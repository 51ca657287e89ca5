//! Typed wrappers over [`TransmissionClient::call`], one per daemon
//! operation. Mutations nudge the watch registry so watchers of the touched
//! torrents refresh without waiting for their next tick.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::client::{RpcCore, TransmissionClient};
use crate::error::RpcError;
use crate::model::{
    AddResult, AddedTorrent, SessionSettings, Torrent, TorrentDetails,
};
use crate::protocol::{detail_fields, RpcRequest, LIST_FIELDS};
use crate::watch::{WatchCallback, WatchHandle};

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct TorrentRows<T> {
    torrents: Vec<T>,
}

#[derive(Deserialize)]
struct AddArguments {
    #[serde(rename = "torrent-added", default)]
    added: Option<AddedTorrent>,
    #[serde(rename = "torrent-duplicate", default)]
    duplicate: Option<AddedTorrent>,
}

fn invalid(err: serde_json::Error) -> RpcError {
    RpcError::InvalidResponse(err.to_string())
}

/// Unwrap the `{result, arguments}` envelope, surfacing a non-success
/// `result` string as a rejection.
pub(crate) fn decode_arguments<T: DeserializeOwned>(value: Value) -> Result<T, RpcError> {
    let envelope: Envelope = serde_json::from_value(value).map_err(invalid)?;
    if let Some(result) = envelope.result {
        if result != "success" {
            return Err(RpcError::Rejected(result));
        }
    }
    serde_json::from_value(envelope.arguments).map_err(invalid)
}

/// Detail lookup shared by [`TransmissionClient::torrent_details`] and the
/// watch poll tasks.
pub(crate) async fn fetch_details(
    core: &Arc<RpcCore>,
    ids: &[i64],
) -> Result<Vec<TorrentDetails>, RpcError> {
    let fields = detail_fields();
    let value = core.call(&RpcRequest::torrent_get(Some(ids), &fields)).await?;
    let rows: TorrentRows<TorrentDetails> = decode_arguments(value)?;
    Ok(rows.torrents)
}

impl TransmissionClient {
    /// List every torrent the daemon tracks.
    pub async fn torrents(&self) -> Result<Vec<Torrent>, RpcError> {
        let value = self.call(&RpcRequest::torrent_get(None, LIST_FIELDS)).await?;
        let rows: TorrentRows<Torrent> = decode_arguments(value)?;
        Ok(rows.torrents)
    }

    /// Full detail rows for the given torrents.
    pub async fn torrent_details(&self, ids: &[i64]) -> Result<Vec<TorrentDetails>, RpcError> {
        fetch_details(self.core(), ids).await
    }

    pub async fn session(&self) -> Result<SessionSettings, RpcError> {
        let value = self.call(&RpcRequest::session_get()).await?;
        decode_arguments(value)
    }

    pub async fn set_session(&self, key: &str, value: Value) -> Result<(), RpcError> {
        let body = self.call(&RpcRequest::session_set(key, value)).await?;
        decode_arguments::<Value>(body)?;
        Ok(())
    }

    pub async fn start_torrents(&self, ids: &[i64]) -> Result<(), RpcError> {
        let body = self.call(&RpcRequest::torrent_start(ids)).await?;
        decode_arguments::<Value>(body)?;
        self.watches().notify(ids);
        Ok(())
    }

    pub async fn stop_torrents(&self, ids: &[i64]) -> Result<(), RpcError> {
        let body = self.call(&RpcRequest::torrent_stop(ids)).await?;
        decode_arguments::<Value>(body)?;
        self.watches().notify(ids);
        Ok(())
    }

    /// Add a torrent file, URL, or magnet link.
    pub async fn add_link(&self, link: &str) -> Result<AddResult, RpcError> {
        let body = self.call(&RpcRequest::torrent_add(link)).await?;
        let arguments: AddArguments = decode_arguments(body)?;
        if let Some(added) = arguments.added {
            Ok(AddResult::Added(added))
        } else if let Some(duplicate) = arguments.duplicate {
            Ok(AddResult::Duplicate(duplicate))
        } else {
            Err(RpcError::InvalidResponse(
                "torrent-add reply named neither torrent-added nor torrent-duplicate".into(),
            ))
        }
    }

    pub async fn move_torrents(&self, ids: &[i64], location: &str) -> Result<(), RpcError> {
        let body = self
            .call(&RpcRequest::torrent_set_location(ids, location))
            .await?;
        decode_arguments::<Value>(body)?;
        self.watches().notify(ids);
        Ok(())
    }

    pub async fn rename_path(&self, id: i64, path: &str, name: &str) -> Result<(), RpcError> {
        let body = self
            .call(&RpcRequest::torrent_rename_path(id, path, name))
            .await?;
        decode_arguments::<Value>(body)?;
        self.watches().notify(&[id]);
        Ok(())
    }

    pub async fn remove_torrents(&self, ids: &[i64], delete_local_data: bool) -> Result<(), RpcError> {
        let body = self
            .call(&RpcRequest::torrent_remove(ids, delete_local_data))
            .await?;
        decode_arguments::<Value>(body)?;
        Ok(())
    }

    /// Poll the given torrents' details every `every`, delivering each batch
    /// to `callback`. The first fetch fires immediately. Returns a handle for
    /// [`TransmissionClient::unwatch`].
    pub fn watch_torrents(
        &self,
        ids: &[i64],
        every: Duration,
        callback: WatchCallback,
    ) -> WatchHandle {
        self.watches().watch(ids, every, callback)
    }

    /// Cancel a watch. An in-flight fetch is not aborted, but its result is
    /// dropped rather than delivered.
    pub fn unwatch(&self, handle: WatchHandle) {
        self.watches().unwatch(handle);
    }

    /// Trigger an immediate out-of-band refresh of every watch whose id set
    /// intersects `ids`.
    pub fn notify_torrents(&self, ids: &[i64]) {
        self.watches().notify(ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_success_yields_arguments() {
        let rows: TorrentRows<Torrent> = decode_arguments(json!({
            "result": "success",
            "arguments": { "torrents": [{ "id": 1, "name": "a" }] },
        }))
        .expect("decode envelope");
        assert_eq!(rows.torrents.len(), 1);
        assert_eq!(rows.torrents[0].id, 1);
    }

    #[test]
    fn envelope_error_result_is_a_rejection() {
        let err = decode_arguments::<Value>(json!({
            "result": "invalid argument",
            "arguments": {},
        }))
        .unwrap_err();
        assert!(matches!(err, RpcError::Rejected(reason) if reason == "invalid argument"));
    }

    #[test]
    fn envelope_without_result_is_tolerated() {
        let value: Value = decode_arguments(json!({ "arguments": { "ok": true } }))
            .expect("decode bare envelope");
        assert_eq!(value["ok"], json!(true));
    }

    #[test]
    fn add_reply_distinguishes_duplicates() {
        let arguments: AddArguments = decode_arguments(json!({
            "result": "success",
            "arguments": {
                "torrent-duplicate": { "id": 9, "hashString": "ff", "name": "dup" },
            },
        }))
        .expect("decode add reply");
        assert!(arguments.added.is_none());
        assert_eq!(arguments.duplicate.expect("duplicate").id, 9);
    }
}
