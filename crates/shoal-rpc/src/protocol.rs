//! Request building for the daemon's JSON-RPC vocabulary.
//!
//! Method names, argument keys, and field lists are the daemon's external
//! contract and are passed through verbatim.

use serde::Serialize;
use serde_json::{json, Value};

/// Header carrying the session token. The daemon echoes the replacement
/// token under the same name on 409 replies; header lookup is
/// case-insensitive.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Fields requested for torrent list rows.
pub const LIST_FIELDS: &[&str] = &[
    "activityDate",
    "addedDate",
    "bandwidthPriority",
    "comment",
    "corruptEver",
    "creator",
    "dateCreated",
    "desiredAvailable",
    "doneDate",
    "downloadDir",
    "downloadedEver",
    "downloadLimit",
    "downloadLimited",
    "editDate",
    "error",
    "errorString",
    "eta",
    "etaIdle",
    "file-count",
    "hashString",
    "haveUnchecked",
    "haveValid",
    "honorsSessionLimits",
    "id",
    "isFinished",
    "isPrivate",
    "isStalled",
    "leftUntilDone",
    "magnetLink",
    "manualAnnounceTime",
    "maxConnectedPeers",
    "metadataPercentComplete",
    "name",
    "peer-limit",
    "peers",
    "peersConnected",
    "peersGettingFromUs",
    "peersSendingToUs",
    "percentDone",
    "pieceCount",
    "pieceSize",
    "primary-mime-type",
    "queuePosition",
    "rateDownload",
    "rateUpload",
    "recheckProgress",
    "secondsDownloading",
    "secondsSeeding",
    "seedIdleLimit",
    "seedIdleMode",
    "seedRatioLimit",
    "seedRatioMode",
    "sizeWhenDone",
    "startDate",
    "status",
    "totalSize",
    "torrentFile",
    "trackerStats",
    "uploadedEver",
    "uploadLimit",
    "uploadLimited",
    "uploadRatio",
    "webseedsSendingToUs",
];

/// Fields requested on top of [`LIST_FIELDS`] for detail rows.
pub const DETAIL_EXTRA_FIELDS: &[&str] = &[
    "files",
    "fileStats",
    "labels",
    "peersFrom",
    "pieces",
    "priorities",
    "trackers",
    "wanted",
    "webseeds",
];

/// Fields requested from `session-get`.
pub const SESSION_FIELDS: &[&str] = &[
    "alt-speed-down",
    "alt-speed-enabled",
    "alt-speed-time-begin",
    "alt-speed-time-enabled",
    "alt-speed-time-end",
    "alt-speed-time-day",
    "alt-speed-up",
    "blocklist-url",
    "blocklist-enabled",
    "blocklist-size",
    "cache-size-mb",
    "config-dir",
    "download-dir",
    "download-queue-size",
    "download-queue-enabled",
    "dht-enabled",
    "encryption",
    "idle-seeding-limit",
    "idle-seeding-limit-enabled",
    "incomplete-dir",
    "incomplete-dir-enabled",
    "lpd-enabled",
    "peer-limit-global",
    "peer-limit-per-torrent",
    "pex-enabled",
    "peer-port",
    "peer-port-random-on-start",
    "port-forwarding-enabled",
    "queue-stalled-enabled",
    "queue-stalled-minutes",
    "rename-partial-files",
    "rpc-version",
    "rpc-version-minimum",
    "script-torrent-done-filename",
    "script-torrent-done-enabled",
    "seedRatioLimit",
    "seedRatioLimited",
    "seed-queue-size",
    "seed-queue-enabled",
    "speed-limit-down",
    "speed-limit-down-enabled",
    "speed-limit-up",
    "speed-limit-up-enabled",
    "start-added-torrents",
    "trash-original-torrent-files",
    "units",
    "utp-enabled",
    "version",
];

/// Detail rows ask for the list fields plus the per-torrent extras.
pub fn detail_fields() -> Vec<&'static str> {
    LIST_FIELDS
        .iter()
        .chain(DETAIL_EXTRA_FIELDS)
        .copied()
        .collect()
}

/// One JSON-RPC request: a method name from the daemon's vocabulary plus an
/// opaque argument mapping.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub method: &'static str,
    pub arguments: Value,
}

impl RpcRequest {
    pub fn torrent_get(ids: Option<&[i64]>, fields: &[&str]) -> Self {
        let mut arguments = json!({ "fields": fields });
        if let Some(ids) = ids {
            arguments["ids"] = json!(ids);
        }
        Self {
            method: "torrent-get",
            arguments,
        }
    }

    pub fn torrent_start(ids: &[i64]) -> Self {
        Self {
            method: "torrent-start",
            arguments: json!({ "ids": ids }),
        }
    }

    pub fn torrent_stop(ids: &[i64]) -> Self {
        Self {
            method: "torrent-stop",
            arguments: json!({ "ids": ids }),
        }
    }

    /// Add a local or remote torrent file, or a magnet link.
    pub fn torrent_add(filename: &str) -> Self {
        Self {
            method: "torrent-add",
            arguments: json!({ "filename": filename }),
        }
    }

    pub fn torrent_set_location(ids: &[i64], location: &str) -> Self {
        Self {
            method: "torrent-set-location",
            arguments: json!({ "ids": ids, "location": location, "move": true }),
        }
    }

    /// Rename a path inside a single torrent; the daemon only accepts one
    /// torrent per rename.
    pub fn torrent_rename_path(id: i64, path: &str, name: &str) -> Self {
        Self {
            method: "torrent-rename-path",
            arguments: json!({ "ids": [id], "path": path, "name": name }),
        }
    }

    pub fn torrent_remove(ids: &[i64], delete_local_data: bool) -> Self {
        Self {
            method: "torrent-remove",
            arguments: json!({ "ids": ids, "delete-local-data": delete_local_data }),
        }
    }

    pub fn session_get() -> Self {
        Self {
            method: "session-get",
            arguments: json!({ "fields": SESSION_FIELDS }),
        }
    }

    pub fn session_set(key: &str, value: Value) -> Self {
        Self {
            method: "session-set",
            arguments: json!({ key: value }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torrent_get_with_ids_carries_both_keys() {
        let request = RpcRequest::torrent_get(Some(&[5, 7]), LIST_FIELDS);
        assert_eq!(request.method, "torrent-get");
        assert_eq!(request.arguments["ids"], json!([5, 7]));
        assert_eq!(
            request.arguments["fields"].as_array().map(Vec::len),
            Some(LIST_FIELDS.len())
        );
    }

    #[test]
    fn torrent_get_without_ids_omits_the_key() {
        let request = RpcRequest::torrent_get(None, LIST_FIELDS);
        assert!(request.arguments.get("ids").is_none());
    }

    #[test]
    fn detail_fields_extend_the_list_fields() {
        let fields = detail_fields();
        assert_eq!(fields.len(), LIST_FIELDS.len() + DETAIL_EXTRA_FIELDS.len());
        assert!(fields.contains(&"files"));
        assert!(fields.contains(&"rateDownload"));
    }

    #[test]
    fn remove_spells_the_delete_flag_in_kebab_case() {
        let request = RpcRequest::torrent_remove(&[3], true);
        assert_eq!(request.arguments["delete-local-data"], json!(true));
    }

    #[test]
    fn session_set_uses_the_key_as_argument_name() {
        let request = RpcRequest::session_set("speed-limit-down", json!(100));
        assert_eq!(request.arguments, json!({ "speed-limit-down": 100 }));
    }
}
