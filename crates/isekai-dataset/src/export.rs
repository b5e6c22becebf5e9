//! CSV export of the collected records.
//!
//! Column sets are fixed. The header row is always written, even for an
//! empty dataset, and missing numeric values become blank cells.

use anyhow::{Context, Result};
use shared::{AnimeRecord, CharacterRecord};
use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const ANIME_COLUMNS: [&str; 22] = [
    "mal_id",
    "title",
    "title_english",
    "synopsis",
    "type",
    "episodes",
    "status",
    "aired_from",
    "aired_to",
    "score",
    "scored_by",
    "rank",
    "popularity",
    "members",
    "favorites",
    "studios",
    "genres",
    "themes",
    "duration",
    "rating",
    "season",
    "year",
];

pub const CHARACTER_COLUMNS: [&str; 9] = [
    "mal_id",
    "name",
    "name_kanji",
    "nicknames",
    "about",
    "role",
    "anime_mal_id",
    "favorites",
    "voice_actors",
];

fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Flatten an anime into [`ANIME_COLUMNS`] order
pub fn anime_row(anime: &AnimeRecord) -> [String; 22] {
    [
        anime.mal_id.to_string(),
        anime.title.clone(),
        anime.title_english.clone(),
        anime.synopsis.clone(),
        anime.anime_type.clone(),
        cell(anime.episodes),
        anime.status.clone(),
        anime.aired_from.clone(),
        anime.aired_to.clone(),
        cell(anime.score),
        cell(anime.scored_by),
        cell(anime.rank),
        cell(anime.popularity),
        cell(anime.members),
        cell(anime.favorites),
        anime.studios.clone(),
        anime.genres.clone(),
        anime.themes.clone(),
        anime.duration.clone(),
        anime.rating.clone(),
        anime.season.clone(),
        cell(anime.year),
    ]
}

/// Flatten a character into [`CHARACTER_COLUMNS`] order
pub fn character_row(character: &CharacterRecord) -> [String; 9] {
    [
        character.mal_id.to_string(),
        character.name.clone(),
        character.name_kanji.clone(),
        character.nicknames.clone(),
        character.about.clone(),
        character.role.clone(),
        character.anime_mal_id.to_string(),
        cell(character.favorites),
        character.voice_actors.clone(),
    ]
}

/// Write a header and rows to any writer, returning the number of data rows
pub fn write_rows<W, R, I>(writer: W, header: &[&str], rows: I) -> Result<usize>
where
    W: Write,
    R: AsRef<[String]>,
    I: IntoIterator<Item = R>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(header)
        .context("Failed to write CSV header")?;

    let mut count = 0;
    for row in rows {
        csv_writer
            .write_record(row.as_ref())
            .context("Failed to write CSV row")?;
        count += 1;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(count)
}

fn write_file<R, I>(path: &Path, header: &[&str], rows: I) -> Result<usize>
where
    R: AsRef<[String]>,
    I: IntoIterator<Item = R>,
{
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_rows(file, header, rows).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the anime CSV
pub fn write_anime_csv(path: impl AsRef<Path>, anime: &[AnimeRecord]) -> Result<usize> {
    let path = path.as_ref();
    let rows = write_file(path, &ANIME_COLUMNS, anime.iter().map(anime_row))?;
    info!(path = %path.display(), rows = rows, "Anime data saved");
    Ok(rows)
}

/// Write the character CSV
pub fn write_characters_csv(path: impl AsRef<Path>, characters: &[CharacterRecord]) -> Result<usize> {
    let path = path.as_ref();
    let rows = write_file(path, &CHARACTER_COLUMNS, characters.iter().map(character_row))?;
    info!(path = %path.display(), rows = rows, "Character data saved");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_anime() -> AnimeRecord {
        AnimeRecord {
            mal_id: 37430,
            title: "Tensei shitara Slime Datta Ken".to_string(),
            synopsis: "A salaryman, \"reborn\" as a slime,\nbuilds a nation.".to_string(),
            anime_type: "TV".to_string(),
            episodes: Some(24),
            score: Some(8.14),
            genres: "Isekai, Fantasy".to_string(),
            year: Some(2018),
            ..Default::default()
        }
    }

    #[test]
    fn test_anime_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("anime.csv");

        let rows = write_anime_csv(&path, &[sample_anime()])?;
        assert_eq!(rows, 1);

        let mut reader = csv::Reader::from_path(&path)?;
        let header: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        assert_eq!(header, ANIME_COLUMNS);

        let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
        assert_eq!(records.len(), 1);
        let row = &records[0];
        assert_eq!(&row[0], "37430");
        assert_eq!(&row[3], "A salaryman, \"reborn\" as a slime,\nbuilds a nation.");
        assert_eq!(&row[5], "24");
        assert_eq!(&row[9], "8.14");
        assert_eq!(&row[11], "");
        assert_eq!(&row[16], "Isekai, Fantasy");
        assert_eq!(&row[21], "2018");

        Ok(())
    }

    #[test]
    fn test_header_written_without_rows() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let anime_path = temp_dir.path().join("anime.csv");
        let character_path = temp_dir.path().join("characters.csv");

        assert_eq!(write_anime_csv(&anime_path, &[])?, 0);
        assert_eq!(write_characters_csv(&character_path, &[])?, 0);

        assert_eq!(std::fs::read_to_string(&anime_path)?, format!("{}\n", ANIME_COLUMNS.join(",")));
        assert_eq!(
            std::fs::read_to_string(&character_path)?,
            "mal_id,name,name_kanji,nicknames,about,role,anime_mal_id,favorites,voice_actors\n"
        );

        Ok(())
    }

    #[test]
    fn test_character_row_layout() -> Result<()> {
        let character = CharacterRecord {
            mal_id: 7,
            anime_mal_id: 37430,
            name: "Tempest, Rimuru".to_string(),
            name_kanji: "リムル＝テンペスト".to_string(),
            role: "Main".to_string(),
            voice_actors: "Okasaki, Miho (Japanese)".to_string(),
            ..Default::default()
        };

        let mut buffer = Vec::new();
        write_rows(&mut buffer, &CHARACTER_COLUMNS, [character_row(&character)])?;

        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let row = reader.records().next().unwrap()?;
        assert_eq!(&row[1], "Tempest, Rimuru");
        assert_eq!(&row[2], "リムル＝テンペスト");
        assert_eq!(&row[6], "37430");
        assert_eq!(&row[7], "");
        assert_eq!(&row[8], "Okasaki, Miho (Japanese)");

        Ok(())
    }

    #[test]
    fn test_unwritable_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("anime.csv");
        assert!(write_anime_csv(&path, &[sample_anime()]).is_err());
    }
}
