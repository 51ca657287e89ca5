//! Server-side scraping of a torrent index's search results.
//!
//! The index only serves HTML, so rows are pulled out of its result table
//! and each result's detail page is fetched for the magnet link. Anything
//! that does not match the expected markup fails the whole response; the
//! dashboard treats that as "search unavailable".

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use futures::future;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::GatewayContext;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub name: String,
    pub link: String,
    pub magnet: Option<String>,
    pub size: String,
    pub seeds: u32,
    pub leeches: u32,
}

struct Row {
    name: String,
    link: String,
    size: String,
    seeds: u32,
    leeches: u32,
}

static TBODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<tbody>(.*?)</tbody>").unwrap());
static ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").unwrap());
static NAME_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<a\s+href="(/torrent/[^"]+)"[^>]*>(.*?)</a>"#).unwrap());
static SEEDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<td class="coll-2[^"]*">([0-9,]+)</td>"#).unwrap());
static LEECHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<td class="coll-3[^"]*">([0-9,]+)</td>"#).unwrap());
static SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<td class="coll-4[^"]*">([^<]*)"#).unwrap());
static MAGNET: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="(magnet:[^"]+)""#).unwrap());

type SearchRejection = (StatusCode, &'static str);

const UPSTREAM_PARSE_ERROR: SearchRejection = (
    StatusCode::INTERNAL_SERVER_ERROR,
    "unable to parse upstream response",
);

/// GET /search?search=term - Scrape the index's first result page.
pub async fn search(
    State(ctx): State<GatewayContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>, SearchRejection> {
    let url = format!("{}/search/{}/1/", ctx.search_base, query.search);
    let html = fetch_page(&ctx, &url).await.ok_or(UPSTREAM_PARSE_ERROR)?;
    let rows = parse_rows(&html, &ctx.search_base).ok_or(UPSTREAM_PARSE_ERROR)?;
    debug!(count = rows.len(), term = %query.search, "scraped search rows");

    let magnets = future::join_all(rows.iter().map(|row| fetch_magnet(&ctx, &row.link))).await;

    let results = rows
        .into_iter()
        .zip(magnets)
        .map(|(row, magnet)| SearchResult {
            name: row.name,
            link: row.link,
            magnet,
            size: row.size,
            seeds: row.seeds,
            leeches: row.leeches,
        })
        .collect();
    Ok(Json(results))
}

async fn fetch_page(ctx: &GatewayContext, url: &str) -> Option<String> {
    match ctx.http.get(url).send().await {
        Ok(response) if response.status().is_success() => response.text().await.ok(),
        Ok(response) => {
            warn!(status = %response.status(), url, "index answered non-success");
            None
        }
        Err(err) => {
            warn!(error = %err, url, "index fetch failed");
            None
        }
    }
}

async fn fetch_magnet(ctx: &GatewayContext, link: &str) -> Option<String> {
    let html = fetch_page(ctx, link).await?;
    extract_magnet(&html)
}

/// The result table is the page's only `<tbody>`; anything else means the
/// index changed its markup and the page cannot be trusted.
fn parse_rows(html: &str, base: &str) -> Option<Vec<Row>> {
    let mut bodies = TBODY.captures_iter(html);
    let tbody = bodies.next()?.get(1)?.as_str();
    if bodies.next().is_some() {
        return None;
    }

    let mut rows = Vec::new();
    for row in ROW.captures_iter(tbody) {
        let row = row.get(1)?.as_str();
        let name_link = NAME_LINK.captures(row)?;
        rows.push(Row {
            link: format!("{}{}", base, name_link.get(1)?.as_str()),
            name: decode_entities(name_link.get(2)?.as_str()),
            seeds: parse_count(SEEDS.captures(row)?.get(1)?.as_str())?,
            leeches: parse_count(LEECHES.captures(row)?.get(1)?.as_str())?,
            size: decode_entities(SIZE.captures(row)?.get(1)?.as_str().trim()),
        });
    }
    Some(rows)
}

fn extract_magnet(html: &str) -> Option<String> {
    MAGNET
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|href| decode_entities(href.as_str()))
}

fn parse_count(raw: &str) -> Option<u32> {
    raw.replace(',', "").parse().ok()
}

/// The handful of entities the index actually emits. `&amp;` goes last so
/// double-escaped sequences decode one level only.
fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <table>
        <tbody>
        <tr>
            <td class="coll-1 name"><a class="icon" href="/sub/6/0/"><i></i></a><a href="/torrent/100/ubuntu-22-04/">Ubuntu 22.04 &amp; extras</a></td>
            <td class="coll-2 seeds">1,204</td>
            <td class="coll-3 leeches">37</td>
            <td class="coll-date">Apr. 21st</td>
            <td class="coll-4 size mob-user">3.6 GB<span class="seeds">1,204</span></td>
        </tr>
        <tr>
            <td class="coll-1 name"><a class="icon" href="/sub/6/0/"><i></i></a><a href="/torrent/101/debian-12/">Debian 12</a></td>
            <td class="coll-2 seeds">88</td>
            <td class="coll-3 leeches">5</td>
            <td class="coll-date">Jun. 10th</td>
            <td class="coll-4 size mob-user">650.1 MB<span class="seeds">88</span></td>
        </tr>
        </tbody>
        </table>
    "#;

    #[test]
    fn rows_are_scraped_with_decoded_names() {
        let rows = parse_rows(PAGE, "https://index.example").expect("parse rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Ubuntu 22.04 & extras");
        assert_eq!(rows[0].link, "https://index.example/torrent/100/ubuntu-22-04/");
        assert_eq!(rows[0].seeds, 1204);
        assert_eq!(rows[0].leeches, 37);
        assert_eq!(rows[0].size, "3.6 GB");
        assert_eq!(rows[1].name, "Debian 12");
    }

    #[test]
    fn a_page_without_a_result_table_does_not_parse() {
        assert!(parse_rows("<html><body>blocked</body></html>", "x").is_none());
    }

    #[test]
    fn a_page_with_two_tables_does_not_parse() {
        let html = "<tbody><tr></tr></tbody><tbody><tr></tr></tbody>";
        assert!(parse_rows(html, "x").is_none());
    }

    #[test]
    fn a_malformed_row_fails_the_whole_page() {
        let html = r#"<tbody><tr><td class="coll-1 name">no link here</td></tr></tbody>"#;
        assert!(parse_rows(html, "x").is_none());
    }

    #[test]
    fn magnet_links_are_found_and_decoded() {
        let html = r#"<a id="dl" href="magnet:?xt=urn:btih:ff&amp;dn=ubuntu">Magnet</a>"#;
        assert_eq!(
            extract_magnet(html).as_deref(),
            Some("magnet:?xt=urn:btih:ff&dn=ubuntu")
        );
        assert!(extract_magnet("<a href=\"/torrent/1/x/\">x</a>").is_none());
    }

    #[test]
    fn counts_tolerate_thousands_separators() {
        assert_eq!(parse_count("1,204"), Some(1204));
        assert_eq!(parse_count("88"), Some(88));
        assert_eq!(parse_count("n/a"), None);
    }
}
