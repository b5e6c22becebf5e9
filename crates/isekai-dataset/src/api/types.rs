//! Jikan API v4 response types.
//!
//! Only the fields the dataset uses are modelled. Everything except ids is
//! optional so that a sparse or null upstream field never fails a record.

use serde::Deserialize;
use shared::{join_names, AnimeRecord, CharacterRecord};

/// List wrapper; a missing `data` key reads as an empty page
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Single-object wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct ItemResponse<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Pagination metadata
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub last_visible_page: u32,
    /// Absent when the upstream omits it; read as "maybe more"
    #[serde(default)]
    pub has_next_page: Option<bool>,
}

/// MAL entity (genre, studio, producer, etc.)
#[derive(Debug, Clone, Deserialize)]
pub struct MalEntity {
    #[serde(default)]
    pub name: Option<String>,
}

/// Entry of the `/anime` search listing
#[derive(Debug, Clone, Deserialize)]
pub struct AnimeEntry {
    pub mal_id: u32,

    pub title: Option<String>,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,

    #[serde(rename = "type")]
    pub anime_type: Option<String>,
    pub source: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub aired: Option<Aired>,
    pub duration: Option<String>,
    pub rating: Option<String>,

    pub score: Option<f64>,
    pub scored_by: Option<u32>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub members: Option<u32>,
    pub favorites: Option<u32>,

    pub synopsis: Option<String>,
    pub season: Option<String>,
    pub year: Option<u32>,

    pub producers: Option<Vec<MalEntity>>,
    pub licensors: Option<Vec<MalEntity>>,
    pub studios: Option<Vec<MalEntity>>,
    pub genres: Option<Vec<MalEntity>>,
    pub themes: Option<Vec<MalEntity>>,
}

/// Aired dates
#[derive(Debug, Clone, Deserialize)]
pub struct Aired {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Entry of `/anime/{id}/characters`
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterEntry {
    pub character: CharacterSummary,
    pub role: Option<String>,
    pub voice_actors: Option<Vec<VoiceActor>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CharacterSummary {
    pub mal_id: u32,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceActor {
    pub person: Option<Person>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub name: Option<String>,
}

/// Body of `/characters/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterDetails {
    pub mal_id: u32,
    pub name: Option<String>,
    pub name_kanji: Option<String>,
    pub nicknames: Option<Vec<String>>,
    pub favorites: Option<u32>,
    pub about: Option<String>,
}

fn entity_names(entities: &Option<Vec<MalEntity>>) -> String {
    join_names(
        entities
            .iter()
            .flatten()
            .filter_map(|entity| entity.name.as_deref()),
    )
}

impl VoiceActor {
    /// `"<name> (<language>)"`, or just the name when the language is absent
    fn label(&self) -> Option<String> {
        let name = self.person.as_ref()?.name.as_deref()?;
        match self.language.as_deref() {
            Some(language) if !language.is_empty() => Some(format!("{} ({})", name, language)),
            _ => Some(name.to_string()),
        }
    }
}

impl AnimeEntry {
    /// Convert the listing entry into a dataset record
    pub fn into_record(self) -> AnimeRecord {
        let producers = entity_names(&self.producers);
        let licensors = entity_names(&self.licensors);
        let studios = entity_names(&self.studios);
        let genres = entity_names(&self.genres);
        let themes = entity_names(&self.themes);
        let (aired_from, aired_to) = match self.aired {
            Some(aired) => (aired.from.unwrap_or_default(), aired.to.unwrap_or_default()),
            None => (String::new(), String::new()),
        };

        AnimeRecord {
            mal_id: self.mal_id,
            title: self.title.unwrap_or_default(),
            title_english: self.title_english.unwrap_or_default(),
            title_japanese: self.title_japanese.unwrap_or_default(),
            anime_type: self.anime_type.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
            episodes: self.episodes,
            score: self.score,
            scored_by: self.scored_by,
            rank: self.rank,
            popularity: self.popularity,
            members: self.members,
            favorites: self.favorites,
            aired_from,
            aired_to,
            season: self.season.unwrap_or_default(),
            year: self.year,
            duration: self.duration.unwrap_or_default(),
            synopsis: self.synopsis.unwrap_or_default(),
            producers,
            licensors,
            studios,
            genres,
            themes,
        }
    }
}

impl CharacterEntry {
    /// Combine the per-anime summary with the character's detail record
    pub fn into_record(self, anime_mal_id: u32, details: CharacterDetails) -> CharacterRecord {
        let voice_actors = join_names(
            self.voice_actors
                .iter()
                .flatten()
                .filter_map(VoiceActor::label),
        );
        let nicknames = join_names(details.nicknames.iter().flatten());
        let name = self
            .character
            .name
            .or(details.name)
            .unwrap_or_default();

        CharacterRecord {
            mal_id: self.character.mal_id,
            anime_mal_id,
            name,
            name_kanji: details.name_kanji.unwrap_or_default(),
            nicknames,
            about: details.about.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            favorites: details.favorites,
            voice_actors,
        }
    }
}
