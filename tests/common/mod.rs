//! Common test utilities for sailor integration tests
//!
//! One wiremock server stands in for all three services:
//! - OMDb under `/omdb/`
//! - Jackett under `/api/v2.0`
//! - qBittorrent under `/api/v2`

#![allow(dead_code)]

use sailor::config::StorageBackend;
use sailor::{Config, Event, RangeOrchestrator};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Size of the 720p release every search returns
pub const REFERENCE_SIZE: u64 = 734_003_200;

/// Configuration pointing every adapter at `server`, storing state under `dir`
pub fn test_config(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();

    config.library.shows_root = dir.join("shows");
    config.library.movies_root = dir.join("movies");

    config.providers.omdb.base_url = format!("{}/omdb/", server.uri());
    config.providers.omdb.api_key = "omdb-key".into();
    config.providers.jackett.base_url = format!("{}/api/v2.0", server.uri());
    config.providers.jackett.api_key = "jackett-key".into();
    config.providers.qbittorrent.base_url = format!("{}/api/v2", server.uri());
    config.providers.qbittorrent.username = "admin".into();
    config.providers.qbittorrent.password = "adminadmin".into();
    config.providers.request_timeout = Duration::from_secs(5);

    config.persistence.backend = StorageBackend::JsonFiles;
    config.persistence.state_dir = dir.join("state");

    config
}

/// Mount OMDb responses for a show with `seasons` seasons of `episodes` episodes
pub async fn mount_omdb_show(server: &MockServer, title: &str, official: &str, seasons: u32, episodes: u32) {
    for season in 1..=seasons {
        let list: Vec<_> = (1..=episodes)
            .map(|e| json!({ "Title": format!("Episode {}", e), "Episode": e.to_string() }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/omdb/"))
            .and(query_param("t", title))
            .and(query_param("Season", season.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": official,
                "Season": season.to_string(),
                "totalSeasons": seasons.to_string(),
                "Episodes": list,
                "Response": "True"
            })))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/omdb/"))
        .and(query_param("t", title))
        .and(query_param_is_missing("Season"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Title": official,
            "Year": "2005–2013",
            "totalSeasons": seasons.to_string(),
            "Response": "True"
        })))
        .mount(server)
        .await;
}

/// Mount a Jackett search offering an exact size match and a triple-size, better-seeded release
pub async fn mount_jackett(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2.0/indexers/all/results"))
        .and(query_param("apikey", "jackett-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Results": [
                {
                    "Title": "release.1080p",
                    "Size": REFERENCE_SIZE * 3,
                    "Seeders": 300,
                    "MagnetUri": "magnet:?xt=urn:btih:big"
                },
                {
                    "Title": "release.720p",
                    "Size": REFERENCE_SIZE,
                    "Seeders": 40,
                    "MagnetUri": "magnet:?xt=urn:btih:match"
                }
            ]
        })))
        .mount(server)
        .await;
}

/// Mount qBittorrent login and add endpoints that accept everything
pub async fn mount_qbittorrent(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v2/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "SID=integration; HttpOnly; path=/")
                .set_body_string("Ok."),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/torrents/add"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Ok."))
        .mount(server)
        .await;
}

/// Bodies of every `torrents/add` request received so far
pub async fn added_torrents(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/api/v2/torrents/add")
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

/// Wait until no dispatch task is running
pub async fn wait_for_dispatches(orchestrator: &RangeOrchestrator) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while orchestrator.dispatches_in_flight() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("dispatch tasks did not finish");
}

/// Wait for the first event matching `predicate`
pub async fn wait_for_event<F>(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    predicate: F,
) -> Event
where
    F: Fn(&Event) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
