//! Sequential download driver: range submission, completion signals and dispatch.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use crate::error::{Error, Result};
use crate::store::{MAPPINGS_KEY, QUEUE_KEY};
use crate::types::{
    CandidateSource, ClearOutcome, CompletionOutcome, DriverState, Durability, EpisodeWorkItem,
    Event, MediaType, RangeRequest, RangeSubmission, SingleDownload, SingleDownloadRequest,
};

use super::RangeOrchestrator;
use super::episodes::generate_episodes;
use super::mappings::sanitize_dir_name;
use super::selection::select_best_candidate;

impl RangeOrchestrator {
    /// Start a range-download campaign
    ///
    /// Expands the request into episodes. When the driver is idle the first
    /// episode is dispatched right away on a background task and the rest are
    /// queued. When a campaign is already running every episode is queued
    /// behind it, so there is never more than one transfer in flight.
    ///
    /// # Errors
    ///
    /// Only [`Error::MetadataUnavailable`] and [`Error::InvalidRange`] are
    /// returned. Dispatch problems surface as [`Event::DispatchFailed`].
    pub async fn submit_range(&self, request: RangeRequest) -> Result<RangeSubmission> {
        let generated =
            generate_episodes(self.providers.metadata.as_ref(), &self.mappings, &request).await?;

        self.report_durability(MAPPINGS_KEY, generated.mapping.durability);

        let official_title = generated.mapping.value.official_title.clone();
        let mut items = generated.items;
        let episodes = items.len();

        if items.is_empty() {
            tracing::info!(title = %official_title, "Range produced no episodes, nothing to do");
            return Ok(RangeSubmission::default());
        }

        let submission = {
            let mut state = self.driver.lock().await;

            if *state == DriverState::Idle {
                let first = items.remove(0);
                let queued = items.len();
                let durability = self.queue.extend(items).await;
                self.report_durability(QUEUE_KEY, durability);

                *state = DriverState::Dispatching;
                self.spawn_dispatch(first);

                RangeSubmission {
                    started_count: 1,
                    queued_count: queued,
                }
            } else {
                tracing::info!(
                    state = ?*state,
                    episodes,
                    "Campaign already running, queueing whole range behind it"
                );
                let durability = self.queue.extend(items).await;
                self.report_durability(QUEUE_KEY, durability);

                RangeSubmission {
                    started_count: 0,
                    queued_count: episodes,
                }
            }
        };

        tracing::info!(
            title = %official_title,
            started = submission.started_count,
            queued = submission.queued_count,
            "Episode range download started"
        );

        self.emit_event(Event::CampaignStarted {
            official_title,
            episodes,
            queued: submission.queued_count,
        });

        Ok(submission)
    }

    /// Advance the campaign after the backend reports a finished transfer
    ///
    /// The signal carries no identity: whatever finished, the next queued
    /// episode is dispatched. An episode whose dispatch failed is therefore
    /// skipped over by the next completion of any other transfer.
    pub async fn notify_completion(&self) -> CompletionOutcome {
        let mut state = self.driver.lock().await;

        tracing::info!(state = ?*state, "Torrent finished callback received");
        self.emit_event(Event::CompletionReceived { state: *state });

        match self.queue.pop().await {
            Some(popped) => {
                self.report_durability(QUEUE_KEY, popped.durability);
                let item = popped.value;
                let remaining = self.queue.len().await;

                tracing::info!(
                    season = item.season,
                    episode = item.episode,
                    title = %item.official_title,
                    remaining,
                    "Starting next episode download"
                );

                let outcome = CompletionOutcome::Dispatched {
                    season: item.season,
                    episode: item.episode,
                    remaining,
                };

                *state = DriverState::Dispatching;
                self.spawn_dispatch(item);
                outcome
            }
            None => {
                if *state != DriverState::Idle {
                    tracing::info!("Queue drained, campaign finished");
                }
                *state = DriverState::Idle;
                self.emit_event(Event::QueueDrained);
                CompletionOutcome::Idle
            }
        }
    }

    /// Drop every queued episode
    ///
    /// A transfer already handed to the backend is not affected.
    pub async fn clear_queue(&self) -> ClearOutcome {
        let _state = self.driver.lock().await;
        let outcome = self.queue.clear().await;
        self.report_durability(QUEUE_KEY, outcome.durability);

        tracing::info!(removed = outcome.removed, "Queue cleared");
        self.emit_event(Event::QueueCleared {
            removed: outcome.removed,
        });
        outcome
    }

    /// Search the configured provider, best-seeded first
    pub async fn search(&self, query: &str) -> Result<Vec<CandidateSource>> {
        let mut candidates = self.providers.search.search(query).await?;
        candidates.sort_by(|a, b| b.seeders.cmp(&a.seeders));
        Ok(candidates)
    }

    /// Hand one locator straight to the backend, outside any campaign
    ///
    /// Movies go to the movie root. Shows go to their mapped directory when
    /// the title resolves through metadata; otherwise, and when no media type
    /// is given, the backend's default location is used.
    pub async fn start_single(&self, request: SingleDownloadRequest) -> Result<SingleDownload> {
        let save_path = match (request.media_type, request.title.as_deref()) {
            (Some(MediaType::Movie), _) => Some(self.config.movies_root().clone()),
            (Some(MediaType::Show), Some(title)) => {
                match self.providers.metadata.series(title).await {
                    Ok(series) => {
                        let mapping = self
                            .mappings
                            .resolve(title, &series.official_title, &series.year)
                            .await;
                        self.report_durability(MAPPINGS_KEY, mapping.durability);
                        Some(self.config.shows_root().join(&mapping.value.safe_dir_name))
                    }
                    Err(e) => {
                        tracing::warn!(
                            title,
                            error = %e,
                            "Metadata lookup failed, using backend default location"
                        );
                        None
                    }
                }
            }
            _ => None,
        };

        self.providers
            .backend
            .start(&request.locator, save_path.as_deref())
            .await?;

        tracing::info!(save_path = ?save_path, "Single torrent download started");
        Ok(SingleDownload { save_path })
    }

    /// Library directory an episode is saved to
    pub(crate) async fn save_path_for(&self, item: &EpisodeWorkItem) -> PathBuf {
        match item.media_type {
            MediaType::Movie => self.config.movies_root().clone(),
            MediaType::Show => {
                let dir = match self
                    .mappings
                    .find_by_official_title(&item.official_title)
                    .await
                {
                    Some(mapping) => mapping.safe_dir_name,
                    None => sanitize_dir_name(&item.official_title),
                };
                self.config.shows_root().join(dir)
            }
        }
    }

    /// Run a dispatch on a background task
    ///
    /// The caller has already moved the driver to `Dispatching`. A successful
    /// dispatch waits for the next completion signal. A failed one with
    /// nothing queued behind it returns to `Idle`, since no transfer is
    /// running that could ever signal completion.
    fn spawn_dispatch(&self, item: EpisodeWorkItem) {
        let orchestrator = self.clone();
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            let started = match orchestrator.dispatch(&item).await {
                Ok((candidate, save_path)) => {
                    tracing::info!(
                        season = item.season,
                        episode = item.episode,
                        candidate = %candidate.title,
                        seeders = candidate.seeders,
                        save_path = %save_path.display(),
                        "Episode dispatched"
                    );
                    orchestrator.emit_event(Event::EpisodeDispatched {
                        season: item.season,
                        episode: item.episode,
                        official_title: item.official_title.clone(),
                        candidate: candidate.title,
                        seeders: candidate.seeders,
                        save_path: Some(save_path),
                    });
                    true
                }
                Err(e) => {
                    tracing::warn!(
                        season = item.season,
                        episode = item.episode,
                        title = %item.official_title,
                        error = %e,
                        "Episode dispatch failed"
                    );
                    orchestrator.emit_event(Event::DispatchFailed {
                        season: item.season,
                        episode: item.episode,
                        official_title: item.official_title.clone(),
                        error: e.to_string(),
                    });
                    false
                }
            };

            {
                let mut state = orchestrator.driver.lock().await;
                if *state == DriverState::Dispatching {
                    *state = if !started && orchestrator.queue.is_empty().await {
                        tracing::info!("Nothing in flight and queue empty, driver idle");
                        DriverState::Idle
                    } else {
                        DriverState::AwaitingCompletion
                    };
                }
            }
            orchestrator.in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Search, select and start one episode; no lock is held
    async fn dispatch(&self, item: &EpisodeWorkItem) -> Result<(CandidateSource, PathBuf)> {
        let query = item.search_query();
        let candidates = self.providers.search.search(&query).await?;

        let best = select_best_candidate(&candidates, item.reference_size)
            .cloned()
            .ok_or_else(|| Error::NoCandidates {
                query: query.clone(),
            })?;

        let save_path = self.save_path_for(item).await;
        self.providers
            .backend
            .start(&best.locator, Some(&save_path))
            .await?;

        Ok((best, save_path))
    }

    fn report_durability(&self, key: &str, durability: Durability) {
        if durability == Durability::InMemoryOnly {
            let error = Error::PersistFailure {
                key: key.to_string(),
                reason: "state is held in memory only".to_string(),
            };
            self.emit_event(Event::PersistenceDegraded {
                key: key.to_string(),
                error: error.to_string(),
            });
        }
    }
}
