//! Fetch orchestration.
//!
//! Pages through the genre listing, then fans out to the character list of
//! every anime and the detail record of every kept character. Upstream
//! failures degrade to missing items; nothing here fails the whole run.

use crate::api::{AnimeEntry, AnimeListQuery, JikanClient, MAX_PAGE_SIZE};
use futures::stream::{self, StreamExt};
use shared::config::DatasetConfig;
use shared::{AnimeRecord, CharacterRecord};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What to fetch
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub genre_id: u32,
    pub anime_limit: usize,
    pub character_limit: usize,
    pub include_characters: bool,
    pub order_by: Option<String>,
    pub sort: Option<String>,
    pub sfw: Option<bool>,
    /// Anime whose characters are fetched at the same time; `None` fetches all at once
    pub max_concurrent_anime: Option<usize>,
}

impl From<&DatasetConfig> for FetchOptions {
    fn from(config: &DatasetConfig) -> Self {
        Self {
            genre_id: config.genre_id,
            anime_limit: config.anime_limit,
            character_limit: config.character_limit,
            include_characters: config.include_characters,
            order_by: config.order_by.clone(),
            sort: config.sort.clone(),
            sfw: config.sfw,
            max_concurrent_anime: config.max_concurrent_anime,
        }
    }
}

/// Statistics for a fetch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub pages_requested: usize,
    pub anime_fetched: usize,
    pub duplicate_anime: usize,
    pub character_lists_failed: usize,
    pub characters_fetched: usize,
    pub characters_skipped: usize,
}

/// Everything collected in one run, in encounter order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub anime: Vec<AnimeRecord>,
    pub characters: Vec<CharacterRecord>,
    pub stats: FetchStats,
}

/// Characters collected for one anime
#[derive(Debug, Default)]
struct CharacterBatch {
    characters: Vec<CharacterRecord>,
    skipped: usize,
    list_failed: bool,
}

/// Drives pagination and per-item fan-out against the Jikan API
pub struct DatasetFetcher {
    client: Arc<JikanClient>,
    options: FetchOptions,
}

impl DatasetFetcher {
    pub fn new(client: Arc<JikanClient>, options: FetchOptions) -> Self {
        Self { client, options }
    }

    /// Fetch the anime list and, if enabled, their characters
    pub async fn run(&self) -> Dataset {
        let mut stats = FetchStats::default();

        info!(
            genre_id = self.options.genre_id,
            limit = self.options.anime_limit,
            "Fetching anime list"
        );
        let anime = self.fetch_anime_list(&mut stats).await;
        stats.anime_fetched = anime.len();

        let characters = if self.options.include_characters {
            info!(
                anime = anime.len(),
                per_anime = self.options.character_limit,
                "Fetching characters"
            );
            self.fetch_all_characters(&anime, &mut stats).await
        } else {
            Vec::new()
        };
        stats.characters_fetched = characters.len();

        Dataset {
            anime,
            characters,
            stats,
        }
    }

    /// Page through the genre listing until the limit is reached
    ///
    /// Stops at the first empty page or failed request, keeping whatever was
    /// already collected. Never returns more than `anime_limit` records, and
    /// never the same `mal_id` twice: shrinking `limit` on the last page
    /// shifts the upstream offset, so that page can overlap earlier ones.
    pub async fn fetch_anime_list(&self, stats: &mut FetchStats) -> Vec<AnimeRecord> {
        let limit = self.options.anime_limit;
        let mut anime = Vec::with_capacity(limit);
        let mut seen = HashSet::with_capacity(limit);
        let mut page = 1;

        while anime.len() < limit {
            let remaining = limit - anime.len();
            let query = AnimeListQuery {
                genre_id: self.options.genre_id,
                page,
                limit: remaining.min(MAX_PAGE_SIZE),
                order_by: self.options.order_by.clone(),
                sort: self.options.sort.clone(),
                sfw: self.options.sfw,
            };

            stats.pages_requested += 1;
            let response = match self.client.list_anime(&query).await {
                Ok(response) => response,
                Err(e) => {
                    error!(
                        page = page,
                        fetched = anime.len(),
                        error = %e,
                        "Failed to fetch anime page, keeping partial results"
                    );
                    break;
                }
            };

            if response.data.is_empty() {
                info!(page = page, "No more anime available");
                break;
            }

            let received = response.data.len();
            let has_next_page = response
                .pagination
                .as_ref()
                .and_then(|p| p.has_next_page)
                .unwrap_or(true);

            for record in response.data.into_iter().map(AnimeEntry::into_record) {
                if anime.len() >= limit {
                    break;
                }
                if !seen.insert(record.mal_id) {
                    debug!(mal_id = record.mal_id, page = page, "Skipping duplicate anime");
                    stats.duplicate_anime += 1;
                    continue;
                }
                debug!(
                    mal_id = record.mal_id,
                    title = %record.title,
                    title_japanese = %record.title_japanese,
                    source = %record.source,
                    producers = %record.producers,
                    licensors = %record.licensors,
                    "Anime"
                );
                anime.push(record);
            }

            info!(
                page = page,
                received = received,
                total = anime.len(),
                "Fetched anime page"
            );

            if !has_next_page {
                break;
            }
            page += 1;
        }

        anime
    }

    /// Fetch characters for every anime, preserving anime order
    async fn fetch_all_characters(
        &self,
        anime: &[AnimeRecord],
        stats: &mut FetchStats,
    ) -> Vec<CharacterRecord> {
        let concurrency = self
            .options
            .max_concurrent_anime
            .unwrap_or(anime.len())
            .max(1);

        let batches: Vec<CharacterBatch> = stream::iter(
            anime
                .iter()
                .map(|record| self.fetch_characters(record.mal_id)),
        )
        .buffered(concurrency)
        .collect()
        .await;

        let mut characters = Vec::new();
        for batch in batches {
            if batch.list_failed {
                stats.character_lists_failed += 1;
            }
            stats.characters_skipped += batch.skipped;
            characters.extend(batch.characters);
        }
        characters
    }

    /// Fetch the kept characters of one anime with their details
    async fn fetch_characters(&self, anime_id: u32) -> CharacterBatch {
        let mut batch = CharacterBatch::default();

        let entries = match self.client.anime_characters(anime_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(anime_id = anime_id, error = %e, "Failed to fetch characters for anime");
                batch.list_failed = true;
                return batch;
            }
        };

        let available = entries.len();
        let kept: Vec<_> = entries
            .into_iter()
            .take(self.options.character_limit)
            .collect();
        info!(
            anime_id = anime_id,
            kept = kept.len(),
            available = available,
            limit = self.options.character_limit,
            "Fetched characters for anime"
        );

        for entry in kept {
            let character_id = entry.character.mal_id;
            match self.client.character(character_id).await {
                Ok(details) => batch.characters.push(entry.into_record(anime_id, details)),
                Err(e) => {
                    warn!(
                        anime_id = anime_id,
                        character_id = character_id,
                        error = %e,
                        "Failed to fetch character details, skipping"
                    );
                    batch.skipped += 1;
                }
            }
        }

        batch
    }
}
