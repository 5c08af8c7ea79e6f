//! Episode list generation for a season/episode range.

use crate::providers::MetadataProvider;
use crate::types::{EpisodeWorkItem, Persisted, RangeRequest, ShowMapping};
use crate::{Error, Result};

use super::mappings::ShowMappingStore;

/// Output of [`generate_episodes`]
#[derive(Clone, Debug)]
pub struct GeneratedRange {
    /// Mapping resolved for the series, with the durability of its write
    pub mapping: Persisted<ShowMapping>,
    /// Work items in strictly ascending (season, episode) order
    pub items: Vec<EpisodeWorkItem>,
}

/// Expand a range request into concrete episodes
///
/// Bounds default to the whole series: seasons `1..=total_seasons`, every
/// episode. `min_episode` only narrows the first season in range and
/// `max_episode` only the last one. A season whose episode count cannot be
/// fetched is skipped with a warning.
///
/// # Errors
///
/// - [`Error::MetadataUnavailable`] when the series lookup fails
/// - [`Error::InvalidRange`] when the clamped season range is empty
pub async fn generate_episodes(
    metadata: &dyn MetadataProvider,
    mappings: &ShowMappingStore,
    request: &RangeRequest,
) -> Result<GeneratedRange> {
    let series = metadata
        .series(&request.title)
        .await
        .map_err(|e| Error::MetadataUnavailable {
            title: request.title.clone(),
            reason: e.to_string(),
        })?;

    let mapping = mappings
        .resolve(&request.title, &series.official_title, &series.year)
        .await;
    tracing::info!(
        user_title = %mapping.value.user_title,
        official_title = %mapping.value.official_title,
        dir = %mapping.value.safe_dir_name,
        "Using show mapping"
    );

    let total_seasons = series.total_seasons.unwrap_or(1);
    let bounds = request.bounds;

    let min_season = bounds.min_season.unwrap_or(1).max(1);
    let max_season = bounds.max_season.unwrap_or(total_seasons).min(total_seasons);
    let min_episode = bounds.min_episode.unwrap_or(1);
    let max_episode = bounds.max_episode.filter(|&e| e > 0);

    if min_season > max_season {
        return Err(Error::InvalidRange {
            min_season,
            max_season,
        });
    }

    let mut items = Vec::new();

    for season in min_season..=max_season {
        let count = match metadata.season_episode_count(&request.title, season).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(season, error = %e, "Could not get season info, skipping");
                continue;
            }
        };

        let first = if season == min_season && min_episode > 1 {
            min_episode
        } else {
            1
        };

        let last = match max_episode {
            Some(max) if season == max_season && max <= count => max,
            _ => count,
        };

        if first > count {
            tracing::warn!(
                season,
                episodes = count,
                first_requested = first,
                "Season has fewer episodes than requested start, skipping"
            );
            continue;
        }
        let last = last.min(count);

        items.extend((first..=last).map(|episode| EpisodeWorkItem {
            season,
            episode,
            search_title: request.title.clone(),
            official_title: series.official_title.clone(),
            year: request.year.clone(),
            media_type: request.media_type,
            reference_size: request.reference_size,
        }));
    }

    tracing::info!(
        title = %series.official_title,
        min_season,
        max_season,
        episodes = items.len(),
        "Generated episode list"
    );

    Ok(GeneratedRange { mapping, items })
}
