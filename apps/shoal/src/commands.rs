//! Implementations of the CLI subcommands.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

use shoal_rpc::{AddResult, TorrentDetails, TorrentStatus, TransmissionClient, WatchCallback};

use crate::fmt::{count_seeds, format_bytes, format_duration, format_rate};
use crate::progress::ProgressLog;
use crate::settings::Settings;
use crate::tree;

fn status_label(code: i64) -> &'static str {
    TorrentStatus::from_code(code)
        .map(TorrentStatus::label)
        .unwrap_or("unknown")
}

pub async fn list(client: &TransmissionClient) -> Result<()> {
    let mut torrents = client.torrents().await?;
    torrents.sort_by_key(|torrent| torrent.queue_position);

    println!(
        "{:>5}  {:<20} {:>7}  {:>14} {:>14}  name",
        "id", "status", "done", "down", "up"
    );
    for torrent in &torrents {
        println!(
            "{:>5}  {:<20} {:>6.1}%  {:>14} {:>14}  {}",
            torrent.id,
            status_label(torrent.status),
            torrent.percent_done * 100.0,
            format_rate(torrent.rate_download as f64),
            format_rate(torrent.rate_upload as f64),
            torrent.name,
        );
    }
    println!("{} torrents", torrents.len());
    Ok(())
}

pub async fn details(
    client: &TransmissionClient,
    settings: &Settings,
    ids: &[i64],
    files: bool,
) -> Result<()> {
    let torrents = client.torrent_details(ids).await?;
    if torrents.is_empty() {
        bail!("no torrents match {ids:?}");
    }

    for details in &torrents {
        let torrent = &details.summary;
        println!("{} ({})", torrent.name, torrent.hash_string);
        println!("  status:    {}", status_label(torrent.status));
        println!("  location:  {}", settings.map_path(&torrent.download_dir));
        println!(
            "  size:      {} ({:.1}% done)",
            format_bytes(torrent.size_when_done as f64),
            torrent.percent_done * 100.0
        );
        println!(
            "  rates:     {} down, {} up (ratio {:.2})",
            format_rate(torrent.rate_download as f64),
            format_rate(torrent.rate_upload as f64),
            torrent.upload_ratio
        );
        println!(
            "  peers:     {} connected, {} seeds via trackers",
            torrent.peers_connected,
            count_seeds(&torrent.tracker_stats)
        );
        if torrent.eta >= 0 {
            println!("  eta:       {}", format_duration(torrent.eta));
        }
        if torrent.error != 0 {
            println!("  error:     {}", torrent.error_string);
        }
        if files {
            let file_tree = tree::build_tree(&details.files, torrent.piece_size);
            let mut out = String::new();
            tree::render(&file_tree, &mut out, 1);
            print!("{out}");
        }
    }
    Ok(())
}

pub async fn start(client: &TransmissionClient, ids: &[i64]) -> Result<()> {
    client.start_torrents(ids).await?;
    println!("started {ids:?}");
    Ok(())
}

pub async fn stop(client: &TransmissionClient, ids: &[i64]) -> Result<()> {
    client.stop_torrents(ids).await?;
    println!("stopped {ids:?}");
    Ok(())
}

pub async fn add(client: &TransmissionClient, link: &str) -> Result<()> {
    match client.add_link(link).await? {
        AddResult::Added(torrent) => println!("added {} (id {})", torrent.name, torrent.id),
        AddResult::Duplicate(torrent) => {
            println!("already present: {} (id {})", torrent.name, torrent.id);
        }
    }
    Ok(())
}

pub async fn move_torrents(
    client: &TransmissionClient,
    ids: &[i64],
    location: &str,
) -> Result<()> {
    client.move_torrents(ids, location).await?;
    println!("moving {ids:?} to {location}");
    Ok(())
}

pub async fn rename(client: &TransmissionClient, id: i64, path: &str, name: &str) -> Result<()> {
    client.rename_path(id, path, name).await?;
    println!("renamed {path} to {name}");
    Ok(())
}

pub async fn remove(client: &TransmissionClient, ids: &[i64], delete_data: bool) -> Result<()> {
    client.remove_torrents(ids, delete_data).await?;
    if delete_data {
        println!("removed {ids:?} and deleted local data");
    } else {
        println!("removed {ids:?}");
    }
    Ok(())
}

pub async fn session(client: &TransmissionClient) -> Result<()> {
    let session = client.session().await?;
    println!(
        "daemon version: {} (rpc {})",
        session.version, session.rpc_version
    );
    println!("download dir:   {}", session.download_dir);
    if session.incomplete_dir_enabled {
        println!("incomplete dir: {}", session.incomplete_dir);
    }
    println!("peer port:      {}", session.peer_port);
    println!(
        "speed limits:   down {} up {}",
        speed_limit(session.speed_limit_down, session.speed_limit_down_enabled),
        speed_limit(session.speed_limit_up, session.speed_limit_up_enabled),
    );
    if session.seed_ratio_limited {
        println!("seed ratio:     {}", session.seed_ratio_limit);
    }
    Ok(())
}

fn speed_limit(kbps: i64, enabled: bool) -> String {
    if enabled {
        format!("{}/s", format_bytes((kbps * 1000) as f64))
    } else {
        "off".to_string()
    }
}

pub async fn session_set(client: &TransmissionClient, key: &str, raw: &str) -> Result<()> {
    // Numbers and booleans pass through typed; anything else is a string.
    let value =
        serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    client.set_session(key, value).await?;
    println!("set {key} = {raw}");
    Ok(())
}

pub async fn watch(
    client: &TransmissionClient,
    settings: &mut Settings,
    ids: Vec<i64>,
    interval: u64,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let callback: WatchCallback = Arc::new(move |torrents| {
        let _ = tx.send(torrents);
    });
    let handle = client.watch_torrents(&ids, Duration::from_secs(interval), callback);

    println!("watching {ids:?} every {interval}s; ctrl-c to stop");
    let mut log = ProgressLog::new();
    let mut dirty = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            batch = rx.recv() => match batch {
                Some(torrents) => dirty |= report(&mut log, settings, &torrents),
                None => break,
            },
        }
    }

    client.unwatch(handle);
    if dirty {
        if let Err(err) = settings.save() {
            warn!(error = %err, "failed to persist observed rates");
        }
    }
    Ok(())
}

fn report(log: &mut ProgressLog, settings: &mut Settings, torrents: &[TorrentDetails]) -> bool {
    let down: i64 = torrents.iter().map(|d| d.summary.rate_download).sum();
    let up: i64 = torrents.iter().map(|d| d.summary.rate_upload).sum();
    let wanted: i64 = torrents.iter().map(|d| d.summary.size_when_done).sum();
    let left: i64 = torrents.iter().map(|d| d.summary.left_until_done).sum();

    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as f64)
        .unwrap_or_default();

    let mut line = format!(
        "{} down, {} up",
        format_rate(down as f64),
        format_rate(up as f64)
    );
    if wanted > 0 {
        let fraction = (wanted - left) as f64 / wanted as f64;
        log.push(now_ms, fraction);
        line.push_str(&format!(", {:.1}% done", fraction * 100.0));
        if fraction < 1.0 {
            if let Some(eta_ms) = log.estimated_completion(None) {
                let remaining = ((eta_ms - now_ms) / 1000.0).round() as i64;
                if remaining > 0 {
                    line.push_str(&format!(", ~{} left", format_duration(remaining)));
                }
            }
        }
    }
    println!("{line}");

    settings.record_rates(down, up)
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    name: String,
    link: String,
    #[serde(default)]
    magnet: Option<String>,
    size: String,
    seeds: u32,
    leeches: u32,
}

pub async fn search(search_url: &str, term: &str) -> Result<()> {
    let url = format!("{}/search", search_url.trim_end_matches('/'));
    let hits: Vec<SearchHit> = reqwest::Client::new()
        .get(url)
        .query(&[("search", term)])
        .send()
        .await
        .context("search gateway unreachable")?
        .error_for_status()
        .context("search gateway rejected the query")?
        .json()
        .await
        .context("search gateway answered malformed JSON")?;

    for hit in &hits {
        println!(
            "{:>10}  {} (seeds {}, leeches {})",
            hit.size, hit.name, hit.seeds, hit.leeches
        );
        println!("            {}", hit.magnet.as_deref().unwrap_or(&hit.link));
    }
    println!("{} results", hits.len());
    Ok(())
}

pub fn mappings_list(settings: &Settings) {
    if settings.path_mappings.is_empty() {
        println!("no mappings configured");
        return;
    }
    for mapping in &settings.path_mappings {
        println!("{} -> {}", mapping.base, mapping.path);
    }
}

pub fn mappings_add(settings: &mut Settings, base: String, path: String) -> Result<()> {
    settings.add_mapping(base.clone(), path.clone())?;
    settings.save()?;
    println!("mapped {base} -> {path}");
    Ok(())
}

pub fn mappings_remove(settings: &mut Settings, base: &str) -> Result<()> {
    if !settings.remove_mapping(base) {
        bail!("no mapping for {base}");
    }
    settings.save()?;
    println!("removed mapping for {base}");
    Ok(())
}
