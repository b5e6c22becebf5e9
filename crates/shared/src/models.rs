//! Data models for the dataset.
//!
//! Records are built once per run from API payloads and never mutated
//! afterwards. Missing upstream values follow a fixed contract: text fields
//! are empty strings, numeric fields are `None`.

use serde::{Deserialize, Serialize};

/// Separator used when a list of names is folded into one text field
pub const LIST_SEPARATOR: &str = ", ";

/// Anime metadata from MyAnimeList
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub mal_id: u32,

    // Titles
    pub title: String,
    pub title_english: String,
    pub title_japanese: String,

    // Classification
    pub anime_type: String, // TV, Movie, OVA, etc.
    pub source: String,
    pub status: String,
    pub rating: String,

    // Metrics
    pub episodes: Option<u32>,
    pub score: Option<f64>,
    pub scored_by: Option<u32>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub members: Option<u32>,
    pub favorites: Option<u32>,

    // Dates
    pub aired_from: String,
    pub aired_to: String,
    pub season: String,
    pub year: Option<u32>,

    pub duration: String,
    pub synopsis: String,

    // Joined name lists
    pub producers: String,
    pub licensors: String,
    pub studios: String,
    pub genres: String,
    pub themes: String,
}

/// Character of a fetched anime, enriched with its detail record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub mal_id: u32,
    /// Anime the character was fetched for
    pub anime_mal_id: u32,
    pub name: String,
    pub name_kanji: String,
    pub nicknames: String,
    pub about: String,
    /// Upstream role string ("Main", "Supporting", ...), not validated
    pub role: String,
    pub favorites: Option<u32>,
    /// `"<name> (<language>)"` entries joined with [`LIST_SEPARATOR`]
    pub voice_actors: String,
}

/// Join names into a single field
pub fn join_names<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter(|name| !name.as_ref().is_empty())
        .map(|name| name.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(["Isekai", "Fantasy"]), "Isekai, Fantasy");
        assert_eq!(join_names(Vec::<String>::new()), "");
        assert_eq!(join_names(["Isekai", "", "Drama"]), "Isekai, Drama");
    }

    #[test]
    fn test_record_defaults() {
        let anime = AnimeRecord::default();
        assert_eq!(anime.title, "");
        assert_eq!(anime.score, None);

        let character = CharacterRecord::default();
        assert_eq!(character.voice_actors, "");
        assert_eq!(character.favorites, None);
    }
}
