//! Asynchronous client for a Transmission-compatible torrent daemon.
//!
//! The daemon hands out an anti-CSRF session token on first contact and
//! answers 409 to any request made without it; [`TransmissionClient::call`]
//! performs that handshake transparently with a bounded retry budget. On top
//! of the raw call sit typed wrappers for the daemon's RPC vocabulary and a
//! watch registry that polls torrent details on an interval and can be nudged
//! out-of-band after mutations.

pub mod client;
pub mod error;
pub mod model;
mod ops;
pub mod protocol;
pub mod watch;

pub use client::TransmissionClient;
pub use error::RpcError;
pub use model::{
    AddResult, AddedTorrent, SessionSettings, Torrent, TorrentDetails, TorrentStatus,
};
pub use protocol::{RpcRequest, SESSION_ID_HEADER};
pub use watch::{WatchCallback, WatchHandle, DEFAULT_WATCH_INTERVAL};
