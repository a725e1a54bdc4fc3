//! Structures de données décrivant les médias affichés dans fzf
//!
//! Ces objets sont fournis par le catalogue (client de l'API média) et sont
//! en lecture seule pour le cache de prévisualisation. Ils se désérialisent
//! depuis le JSON du catalogue ; tous les champs facultatifs ont une valeur
//! par défaut.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Titres d'un média dans les différentes langues
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaTitle {
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub romaji: Option<String>,
    #[serde(default)]
    pub native: Option<String>,
}

impl MediaTitle {
    /// Titre affiché : anglais, sinon romaji, sinon natif
    pub fn display(&self) -> Option<&str> {
        [&self.english, &self.romaji, &self.native]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|t| !t.trim().is_empty())
    }
}

/// État de diffusion d'un média
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    Finished,
    Releasing,
    NotYetReleased,
    Cancelled,
    Hiatus,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Finished => "FINISHED",
            Self::Releasing => "RELEASING",
            Self::NotYetReleased => "NOT_YET_RELEASED",
            Self::Cancelled => "CANCELLED",
            Self::Hiatus => "HIATUS",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// Format de publication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFormat {
    Tv,
    TvShort,
    Movie,
    Special,
    Ova,
    Ona,
    Music,
    Manga,
    Novel,
    OneShot,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tv => "TV",
            Self::TvShort => "TV_SHORT",
            Self::Movie => "MOVIE",
            Self::Special => "SPECIAL",
            Self::Ova => "OVA",
            Self::Ona => "ONA",
            Self::Music => "MUSIC",
            Self::Manga => "MANGA",
            Self::Novel => "NOVEL",
            Self::OneShot => "ONE_SHOT",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// Statut du média dans la liste de l'utilisateur
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserListStatus {
    Current,
    Planning,
    Completed,
    Dropped,
    Paused,
    Repeating,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for UserListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Current => "CURRENT",
            Self::Planning => "PLANNING",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
            Self::Paused => "PAUSED",
            Self::Repeating => "REPEATING",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// Suivi de l'utilisateur pour un média
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserStatus {
    #[serde(default)]
    pub status: Option<UserListStatus>,
    /// Dernier épisode vu
    #[serde(default)]
    pub progress: Option<u32>,
}

/// Date partielle (l'API peut ne connaître que l'année, ou l'année et le mois)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FuzzyDate {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
}

impl FuzzyDate {
    /// Date complète si les trois composantes sont connues et valides
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }
}

/// Prochain épisode programmé
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiringSchedule {
    pub episode: u32,
    /// Date de diffusion (timestamp Unix dans le JSON)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub airing_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaTag {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Studio {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverImage {
    pub large: String,
    #[serde(default)]
    pub medium: Option<String>,
}

/// Épisode disponible en streaming
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamingEpisode {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Représente un média du catalogue
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    /// Identifiant dans le catalogue
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: MediaTitle,
    #[serde(default)]
    pub status: Option<MediaStatus>,
    #[serde(default)]
    pub format: Option<MediaFormat>,
    /// Nombre total d'épisodes (inconnu pour les séries en cours)
    #[serde(default)]
    pub episodes: Option<u32>,
    /// Durée d'un épisode en minutes
    #[serde(default)]
    pub duration: Option<u32>,
    /// Score moyen sur 100
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(default)]
    pub favourites: Option<u64>,
    #[serde(default)]
    pub popularity: Option<u64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<MediaTag>,
    #[serde(default)]
    pub studios: Vec<Studio>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Synopsis, peut contenir du HTML
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<FuzzyDate>,
    #[serde(default)]
    pub end_date: Option<FuzzyDate>,
    #[serde(default)]
    pub next_airing: Option<AiringSchedule>,
    #[serde(default)]
    pub user_status: Option<UserStatus>,
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
    /// Épisodes en streaming indexés par identifiant d'épisode (ex: `"1"`)
    #[serde(default)]
    pub streaming_episodes: HashMap<String, StreamingEpisode>,
}

impl MediaItem {
    /// URL de la couverture en grand format
    pub fn cover_url(&self) -> Option<&str> {
        self.cover_image
            .as_ref()
            .map(|c| c.large.as_str())
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_item() {
        let item: MediaItem = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(item.title.display(), None);
        assert!(item.genres.is_empty());
        assert!(item.next_airing.is_none());
        assert_eq!(item.cover_url(), None);
    }

    #[test]
    fn test_deserialize_full_item() {
        let json = r#"{
            "id": 1,
            "title": {"english": "Cowboy Bebop", "romaji": "Cowboy Bebop"},
            "status": "FINISHED",
            "format": "TV",
            "episodes": 26,
            "average_score": 86.0,
            "genres": ["Action", "Sci-Fi"],
            "tags": [{"name": "Space"}],
            "studios": [{"name": "Sunrise"}, {"name": null}],
            "start_date": {"year": 1998, "month": 4, "day": 3},
            "next_airing": {"episode": 5, "airing_at": 1700000000},
            "user_status": {"status": "COMPLETED", "progress": 26},
            "cover_image": {"large": "https://example.com/cover.png"},
            "streaming_episodes": {"1": {"title": "Asteroid Blues"}}
        }"#;

        let item: MediaItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.title.display(), Some("Cowboy Bebop"));
        assert_eq!(item.status, Some(MediaStatus::Finished));
        assert_eq!(item.format.unwrap().to_string(), "TV");
        assert_eq!(item.studios.len(), 2);
        assert_eq!(item.next_airing.as_ref().unwrap().airing_at.timestamp(), 1_700_000_000);
        assert_eq!(
            item.start_date.unwrap().to_naive(),
            NaiveDate::from_ymd_opt(1998, 4, 3)
        );
        assert_eq!(item.cover_url(), Some("https://example.com/cover.png"));
    }

    #[test]
    fn test_unknown_enum_values() {
        let item: MediaItem =
            serde_json::from_str(r#"{"status": "SOMETHING_NEW", "format": "WEIRD"}"#).unwrap();
        assert_eq!(item.status, Some(MediaStatus::Unknown));
        assert_eq!(item.format, Some(MediaFormat::Unknown));
    }

    #[test]
    fn test_display_title_fallbacks() {
        let title = MediaTitle {
            english: Some("  ".to_string()),
            romaji: Some("Shingeki no Kyojin".to_string()),
            native: None,
        };
        assert_eq!(title.display(), Some("Shingeki no Kyojin"));
    }
}
