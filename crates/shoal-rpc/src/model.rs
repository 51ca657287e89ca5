//! Typed views of the daemon's responses.
//!
//! Rows are decoded at the client boundary so upstream field renames show up
//! as [`RpcError::InvalidResponse`](crate::error::RpcError) instead of
//! surfacing much later as missing data. Every struct defaults its fields:
//! daemons across versions omit the odd field and a list view should not
//! fail wholesale over one of them.

use serde::Deserialize;

/// Daemon status codes for a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentStatus {
    Stopped,
    CheckWait,
    Check,
    DownloadWait,
    Download,
    SeedWait,
    Seed,
}

impl TorrentStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Stopped),
            1 => Some(Self::CheckWait),
            2 => Some(Self::Check),
            3 => Some(Self::DownloadWait),
            4 => Some(Self::Download),
            5 => Some(Self::SeedWait),
            6 => Some(Self::Seed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::CheckWait => "queued to check",
            Self::Check => "checking",
            Self::DownloadWait => "queued to download",
            Self::Download => "downloading",
            Self::SeedWait => "queued to seed",
            Self::Seed => "seeding",
        }
    }
}

/// One torrent list row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Torrent {
    pub id: i64,
    pub name: String,
    pub hash_string: String,
    pub status: i64,
    pub error: i64,
    pub error_string: String,
    pub activity_date: i64,
    pub added_date: i64,
    pub done_date: i64,
    pub date_created: i64,
    pub edit_date: i64,
    pub start_date: i64,
    pub bandwidth_priority: i64,
    pub comment: String,
    pub creator: String,
    pub corrupt_ever: i64,
    pub desired_available: i64,
    pub download_dir: String,
    pub downloaded_ever: i64,
    pub download_limit: i64,
    pub download_limited: bool,
    pub eta: i64,
    pub eta_idle: i64,
    #[serde(rename = "file-count")]
    pub file_count: i64,
    pub have_unchecked: i64,
    pub have_valid: i64,
    pub honors_session_limits: bool,
    pub is_finished: bool,
    pub is_private: bool,
    pub is_stalled: bool,
    pub left_until_done: i64,
    pub magnet_link: String,
    pub manual_announce_time: i64,
    pub max_connected_peers: i64,
    pub metadata_percent_complete: f64,
    #[serde(rename = "peer-limit")]
    pub peer_limit: i64,
    pub peers: Vec<Peer>,
    pub peers_connected: i64,
    pub peers_getting_from_us: i64,
    pub peers_sending_to_us: i64,
    pub percent_done: f64,
    pub piece_count: i64,
    pub piece_size: i64,
    #[serde(rename = "primary-mime-type")]
    pub primary_mime_type: String,
    pub queue_position: i64,
    pub rate_download: i64,
    pub rate_upload: i64,
    pub recheck_progress: f64,
    pub seconds_downloading: i64,
    pub seconds_seeding: i64,
    pub seed_idle_limit: i64,
    pub seed_idle_mode: i64,
    pub seed_ratio_limit: f64,
    pub seed_ratio_mode: i64,
    pub size_when_done: i64,
    pub total_size: i64,
    pub torrent_file: String,
    pub tracker_stats: Vec<TrackerStat>,
    pub uploaded_ever: i64,
    pub upload_limit: i64,
    pub upload_limited: bool,
    pub upload_ratio: f64,
    pub webseeds_sending_to_us: i64,
}

/// One torrent detail row: a list row plus the per-file and per-peer data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TorrentDetails {
    #[serde(flatten)]
    pub summary: Torrent,
    pub files: Vec<TorrentFile>,
    pub file_stats: Vec<FileStat>,
    pub labels: Vec<String>,
    pub peers_from: PeersFrom,
    /// Base64 bitfield of completed pieces.
    pub pieces: String,
    pub priorities: Vec<i64>,
    pub trackers: Vec<Tracker>,
    pub wanted: Vec<i64>,
    pub webseeds: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TorrentFile {
    pub name: String,
    pub length: i64,
    pub bytes_completed: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileStat {
    pub bytes_completed: i64,
    pub wanted: bool,
    pub priority: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Peer {
    pub address: String,
    pub client_name: String,
    pub client_is_choked: bool,
    pub client_is_interested: bool,
    pub flag_str: String,
    pub is_downloading_from: bool,
    pub is_encrypted: bool,
    pub is_incoming: bool,
    #[serde(rename = "isUTP")]
    pub is_utp: bool,
    pub is_uploading_to: bool,
    pub peer_is_choked: bool,
    pub peer_is_interested: bool,
    pub port: i64,
    pub progress: f64,
    pub rate_to_client: i64,
    pub rate_to_peer: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PeersFrom {
    #[serde(rename = "fromCache")]
    pub from_cache: i64,
    #[serde(rename = "fromDht")]
    pub from_dht: i64,
    #[serde(rename = "fromIncoming")]
    pub from_incoming: i64,
    #[serde(rename = "fromLpd")]
    pub from_lpd: i64,
    #[serde(rename = "fromLtep")]
    pub from_ltep: i64,
    #[serde(rename = "fromPex")]
    pub from_pex: i64,
    #[serde(rename = "fromTracker")]
    pub from_tracker: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tracker {
    pub id: i64,
    pub announce: String,
    pub scrape: String,
    pub tier: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerStat {
    pub id: i64,
    pub host: String,
    pub announce: String,
    pub announce_state: i64,
    pub download_count: i64,
    pub has_announced: bool,
    pub has_scraped: bool,
    pub is_backup: bool,
    pub last_announce_peer_count: i64,
    pub last_announce_result: String,
    pub last_announce_succeeded: bool,
    pub last_announce_time: i64,
    pub leecher_count: i64,
    pub scrape: String,
    pub scrape_state: i64,
    pub seeder_count: i64,
    pub tier: i64,
}

/// Daemon session settings, as returned by `session-get`. Wire names are
/// kebab-case with two legacy camelCase holdouts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionSettings {
    pub alt_speed_down: i64,
    pub alt_speed_enabled: bool,
    pub alt_speed_time_begin: i64,
    pub alt_speed_time_enabled: bool,
    pub alt_speed_time_end: i64,
    pub alt_speed_time_day: i64,
    pub alt_speed_up: i64,
    pub blocklist_url: String,
    pub blocklist_enabled: bool,
    pub blocklist_size: i64,
    pub cache_size_mb: i64,
    pub config_dir: String,
    pub download_dir: String,
    pub download_queue_size: i64,
    pub download_queue_enabled: bool,
    pub dht_enabled: bool,
    pub encryption: String,
    pub idle_seeding_limit: i64,
    pub idle_seeding_limit_enabled: bool,
    pub incomplete_dir: String,
    pub incomplete_dir_enabled: bool,
    pub lpd_enabled: bool,
    pub peer_limit_global: i64,
    pub peer_limit_per_torrent: i64,
    pub pex_enabled: bool,
    pub peer_port: i64,
    pub peer_port_random_on_start: bool,
    pub port_forwarding_enabled: bool,
    pub queue_stalled_enabled: bool,
    pub queue_stalled_minutes: i64,
    pub rename_partial_files: bool,
    pub rpc_version: i64,
    pub rpc_version_minimum: i64,
    pub script_torrent_done_filename: String,
    pub script_torrent_done_enabled: bool,
    #[serde(rename = "seedRatioLimit")]
    pub seed_ratio_limit: f64,
    #[serde(rename = "seedRatioLimited")]
    pub seed_ratio_limited: bool,
    pub seed_queue_size: i64,
    pub seed_queue_enabled: bool,
    pub speed_limit_down: i64,
    pub speed_limit_down_enabled: bool,
    pub speed_limit_up: i64,
    pub speed_limit_up_enabled: bool,
    pub start_added_torrents: bool,
    pub trash_original_torrent_files: bool,
    pub units: SessionUnits,
    pub utp_enabled: bool,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionUnits {
    pub speed_units: Vec<String>,
    pub speed_bytes: i64,
    pub size_units: Vec<String>,
    pub size_bytes: i64,
    pub memory_units: Vec<String>,
    pub memory_bytes: i64,
}

/// The torrent handle echoed back by `torrent-add`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddedTorrent {
    pub id: i64,
    pub hash_string: String,
    pub name: String,
}

/// Outcome of `torrent-add`: the daemon distinguishes a fresh add from a
/// torrent it already tracks.
#[derive(Debug, Clone)]
pub enum AddResult {
    Added(AddedTorrent),
    Duplicate(AddedTorrent),
}

impl AddResult {
    pub fn torrent(&self) -> &AddedTorrent {
        match self {
            Self::Added(torrent) | Self::Duplicate(torrent) => torrent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn torrent_row_decodes_camel_and_kebab_names() {
        let torrent: Torrent = serde_json::from_value(json!({
            "id": 42,
            "name": "ubuntu.iso",
            "hashString": "deadbeef",
            "status": 4,
            "file-count": 3,
            "peer-limit": 50,
            "primary-mime-type": "application/octet-stream",
            "rateDownload": 1024,
            "percentDone": 0.5,
            "trackerStats": [{ "seederCount": 12, "host": "tracker.example" }],
        }))
        .expect("decode torrent row");

        assert_eq!(torrent.id, 42);
        assert_eq!(torrent.file_count, 3);
        assert_eq!(torrent.peer_limit, 50);
        assert_eq!(torrent.rate_download, 1024);
        assert_eq!(torrent.tracker_stats[0].seeder_count, 12);
        assert_eq!(TorrentStatus::from_code(torrent.status), Some(TorrentStatus::Download));
    }

    #[test]
    fn detail_row_keeps_summary_and_extras() {
        let details: TorrentDetails = serde_json::from_value(json!({
            "id": 7,
            "name": "album",
            "pieceSize": 4,
            "files": [
                { "name": "album/a.flac", "length": 10, "bytesCompleted": 10 },
                { "name": "album/b.flac", "length": 6, "bytesCompleted": 0 },
            ],
            "fileStats": [
                { "bytesCompleted": 10, "wanted": true, "priority": 0 },
                { "bytesCompleted": 0, "wanted": false, "priority": 0 },
            ],
            "peersFrom": { "fromDht": 3 },
            "wanted": [1, 0],
        }))
        .expect("decode detail row");

        assert_eq!(details.summary.id, 7);
        assert_eq!(details.files.len(), 2);
        assert_eq!(details.files[0].bytes_completed, 10);
        assert!(!details.file_stats[1].wanted);
        assert_eq!(details.peers_from.from_dht, 3);
        assert_eq!(details.wanted, vec![1, 0]);
    }

    #[test]
    fn session_settings_keep_the_camel_case_holdouts() {
        let settings: SessionSettings = serde_json::from_value(json!({
            "download-dir": "/srv/torrents",
            "rpc-version": 17,
            "seedRatioLimit": 2.5,
            "seedRatioLimited": true,
            "units": { "speed-units": ["kB/s", "MB/s"], "speed-bytes": 1000 },
        }))
        .expect("decode session settings");

        assert_eq!(settings.download_dir, "/srv/torrents");
        assert_eq!(settings.rpc_version, 17);
        assert_eq!(settings.seed_ratio_limit, 2.5);
        assert!(settings.seed_ratio_limited);
        assert_eq!(settings.units.speed_bytes, 1000);
    }

    #[test]
    fn unknown_status_codes_map_to_none() {
        assert_eq!(TorrentStatus::from_code(7), None);
        assert_eq!(TorrentStatus::from_code(-1), None);
    }
}
