//! Shared test helpers: in-process fakes for the three collaborators.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, ProviderError, Result};
use crate::orchestrator::RangeOrchestrator;
use crate::providers::{DownloadBackend, MetadataProvider, ProviderResult, Providers, SearchProvider};
use crate::store::MemoryStore;
use crate::types::{CandidateSource, Event, SeriesInfo};

/// Metadata for series whose seasons all share one episode count unless overridden
#[derive(Default)]
pub(crate) struct FakeMetadata {
    series: HashMap<String, SeriesInfo>,
    seasons: HashMap<(String, u32), u32>,
    failing_seasons: Vec<u32>,
}

impl FakeMetadata {
    pub(crate) fn with_series(mut self, title: &str, official: &str, year: &str, seasons: u32, episodes: u32) -> Self {
        self.series.insert(
            title.to_string(),
            SeriesInfo {
                official_title: official.to_string(),
                year: year.to_string(),
                total_seasons: Some(seasons),
            },
        );
        for season in 1..=seasons {
            self.seasons.insert((title.to_string(), season), episodes);
        }
        self
    }

    pub(crate) fn with_season(mut self, title: &str, season: u32, episodes: u32) -> Self {
        self.seasons.insert((title.to_string(), season), episodes);
        self
    }

    pub(crate) fn with_unknown_season_count(mut self, title: &str, official: &str) -> Self {
        self.series.insert(
            title.to_string(),
            SeriesInfo {
                official_title: official.to_string(),
                year: "2019".to_string(),
                total_seasons: None,
            },
        );
        self
    }

    pub(crate) fn failing_season(mut self, season: u32) -> Self {
        self.failing_seasons.push(season);
        self
    }
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    async fn series(&self, title: &str) -> ProviderResult<SeriesInfo> {
        self.series
            .get(title)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("series '{}'", title)))
    }

    async fn season_episode_count(&self, title: &str, season: u32) -> ProviderResult<u32> {
        if self.failing_seasons.contains(&season) {
            return Err(ProviderError::Transport("connection reset".into()));
        }
        self.seasons
            .get(&(title.to_string(), season))
            .copied()
            .ok_or_else(|| ProviderError::NotFound(format!("season {}", season)))
    }

    fn name(&self) -> &'static str {
        "fake-metadata"
    }
}

/// Search returning two candidates per query unless told the query has none
#[derive(Default)]
pub(crate) struct FakeSearch {
    pub(crate) queries: Mutex<Vec<String>>,
    empty_queries: Vec<String>,
    fixed: Option<Vec<CandidateSource>>,
}

impl FakeSearch {
    pub(crate) fn without_results_for(mut self, query: &str) -> Self {
        self.empty_queries.push(query.to_string());
        self
    }

    pub(crate) fn returning(mut self, candidates: Vec<CandidateSource>) -> Self {
        self.fixed = Some(candidates);
        self
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str) -> ProviderResult<Vec<CandidateSource>> {
        self.queries.lock().unwrap().push(query.to_string());

        if self.empty_queries.iter().any(|q| q == query) {
            return Ok(Vec::new());
        }
        if let Some(fixed) = &self.fixed {
            return Ok(fixed.clone());
        }

        Ok(vec![
            CandidateSource {
                title: format!("{} 720p", query),
                size_bytes: 700_000_000,
                seeders: 10,
                locator: format!("magnet:?dn={}&q=720", query),
            },
            CandidateSource {
                title: format!("{} 1080p", query),
                size_bytes: 1_400_000_000,
                seeders: 50,
                locator: format!("magnet:?dn={}&q=1080", query),
            },
        ])
    }

    fn name(&self) -> &'static str {
        "fake-search"
    }
}

/// Backend recording every start call
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub(crate) started: Mutex<Vec<(String, Option<PathBuf>)>>,
    reject: bool,
}

impl FakeBackend {
    pub(crate) fn rejecting() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub(crate) fn started(&self) -> Vec<(String, Option<PathBuf>)> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadBackend for FakeBackend {
    async fn start(&self, locator: &str, save_path: Option<&Path>) -> Result<()> {
        if self.reject {
            return Err(Error::BackendRejected("Fails.".into()));
        }
        self.started
            .lock()
            .unwrap()
            .push((locator.to_string(), save_path.map(Path::to_path_buf)));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake-backend"
    }
}

/// Handles on the fakes behind a test orchestrator
pub(crate) struct TestHarness {
    pub(crate) orchestrator: RangeOrchestrator,
    pub(crate) store: MemoryStore,
    pub(crate) search: Arc<FakeSearch>,
    pub(crate) backend: Arc<FakeBackend>,
}

/// Config with library roots that do not depend on the host
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.library.shows_root = PathBuf::from("/library/shows");
    config.library.movies_root = PathBuf::from("/library/movies");
    config
}

/// The Office: 3 seasons of 10 episodes
pub(crate) fn office_metadata() -> FakeMetadata {
    FakeMetadata::default().with_series("the office", "The Office", "2005", 3, 10)
}

pub(crate) async fn create_test_orchestrator_with(
    metadata: FakeMetadata,
    search: FakeSearch,
    backend: FakeBackend,
    store: MemoryStore,
) -> TestHarness {
    let search = Arc::new(search);
    let backend = Arc::new(backend);

    let providers = Providers {
        metadata: Arc::new(metadata),
        search: search.clone(),
        backend: backend.clone(),
    };

    let orchestrator = RangeOrchestrator::with_store(test_config(), Arc::new(store.clone()), providers)
        .await
        .unwrap();

    TestHarness {
        orchestrator,
        store,
        search,
        backend,
    }
}

/// Orchestrator over The Office with default fakes and an empty memory store
pub(crate) async fn create_test_orchestrator() -> TestHarness {
    create_test_orchestrator_with(
        office_metadata(),
        FakeSearch::default(),
        FakeBackend::default(),
        MemoryStore::new(),
    )
    .await
}

/// Wait for the first event matching `predicate`, failing after two seconds
pub(crate) async fn wait_for_event<F>(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    predicate: F,
) -> Event
where
    F: Fn(&Event) -> bool,
{
    let deadline = tokio::time::sleep(Duration::from_secs(2));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            received = rx.recv() => {
                let event = received.expect("event channel closed");
                if predicate(&event) {
                    return event;
                }
            }
            _ = &mut deadline => panic!("timed out waiting for event"),
        }
    }
}

/// Wait until no dispatch task is running
pub(crate) async fn wait_for_idle_dispatch(orchestrator: &RangeOrchestrator) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while orchestrator.dispatches_in_flight() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("dispatch tasks did not finish");
}
