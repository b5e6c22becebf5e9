//! Isekai dataset library for fetching anime and character metadata from
//! MyAnimeList via the Jikan API v4 and exporting it as CSV.

pub mod api;
pub mod export;
pub mod fetcher;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, JikanClient, RateLimiter};
pub use export::{write_anime_csv, write_characters_csv};
pub use fetcher::{Dataset, DatasetFetcher, FetchOptions, FetchStats};
