//! Rendu des fiches texte à partir des templates
//!
//! Chaque valeur issue du catalogue passe par [`shell_safe`] avant d'être
//! insérée : le texte rendu est évalué par le shell de fzf et ne doit pas
//! pouvoir y exécuter quoi que ce soit.

use crate::format::{
    clean_html, format_date, format_duration, format_list, format_next_episode, format_number,
    format_score, shell_safe, strip_control, NOT_AVAILABLE,
};
use crate::models::MediaItem;
use crate::template::{substitute, Placeholders};

/// Statut affiché quand le média n'est pas dans la liste de l'utilisateur
pub const NOT_ON_LIST: &str = "NOT_ON_LIST";
const NO_DESCRIPTION: &str = "No description available.";

/// Placeholders remplis par [`render_item_info`]
pub const INFO_PLACEHOLDERS: &[&str] = &[
    "TITLE",
    "STATUS",
    "FORMAT",
    "NEXT_EPISODE",
    "EPISODES",
    "DURATION",
    "SCORE",
    "FAVOURITES",
    "POPULARITY",
    "GENRES",
    "TAGS",
    "STUDIOS",
    "SYNONYMNS",
    "USER_STATUS",
    "USER_PROGRESS",
    "START_DATE",
    "END_DATE",
    "SYNOPSIS",
];

/// Placeholders remplis par [`render_episode_info`]
pub const EPISODE_INFO_PLACEHOLDERS: &[&str] = &[
    "TITLE",
    "NEXT_EPISODE",
    "DURATION",
    "STATUS",
    "EPISODES",
    "USER_STATUS",
    "USER_PROGRESS",
    "START_DATE",
    "END_DATE",
];

/// Identité d'un épisode pour le cache : `"<titre>_Episode_<n>"`
pub fn episode_identity(item: &MediaItem, episode: &str) -> String {
    format!("{}{}", episode_prefix(item), episode)
}

/// Préfixe commun aux identités des épisodes d'un média
///
/// Sans caractère de contrôle, pour que le script recalcule la même clé.
pub fn episode_prefix(item: &MediaItem) -> String {
    format!(
        "{}_Episode_",
        strip_control(item.title.display().unwrap_or(NOT_AVAILABLE))
    )
}

/// Épisode résolu : identité, titre affiché et vignette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodePreview {
    pub identity: String,
    pub title: String,
    /// Vignette de l'épisode, à défaut couverture du média
    pub thumbnail: Option<String>,
}

impl EpisodePreview {
    pub fn resolve(episode: &str, item: &MediaItem) -> Self {
        let streaming = item.streaming_episodes.get(episode);

        let title = streaming
            .and_then(|s| s.title.as_deref())
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Episode {episode}"));

        let thumbnail = streaming
            .and_then(|s| s.thumbnail.as_deref())
            .filter(|t| !t.is_empty())
            .or_else(|| item.cover_url())
            .map(str::to_string);

        Self {
            identity: episode_identity(item, episode),
            title,
            thumbnail,
        }
    }
}

fn user_status(item: &MediaItem) -> String {
    item.user_status
        .as_ref()
        .and_then(|u| u.status)
        .map_or_else(|| NOT_ON_LIST.to_string(), |s| s.to_string())
}

fn user_progress(item: &MediaItem) -> String {
    match item.user_status.as_ref().and_then(|u| u.progress) {
        Some(progress) => format!("Episode {progress}"),
        None => "0".to_string(),
    }
}

fn display<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// Champs communs aux deux fiches, avant échappement
fn common_values(item: &MediaItem) -> Vec<(&'static str, String)> {
    vec![
        ("STATUS", display(item.status)),
        ("EPISODES", display(item.episodes)),
        ("NEXT_EPISODE", format_next_episode(item.next_airing.as_ref())),
        ("DURATION", format_duration(item.duration)),
        ("USER_STATUS", user_status(item)),
        ("USER_PROGRESS", user_progress(item)),
        ("START_DATE", format_date(item.start_date.as_ref())),
        ("END_DATE", format_date(item.end_date.as_ref())),
    ]
}

fn escaped(values: Vec<(&'static str, String)>) -> Placeholders {
    values
        .into_iter()
        .map(|(name, value)| (name, shell_safe(&value)))
        .collect()
}

/// Valeurs de la fiche d'un média, déjà échappées
pub fn item_info_values(item: &MediaItem) -> Placeholders {
    let synopsis = item
        .description
        .as_deref()
        .map(clean_html)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let mut values = common_values(item);
    values.extend([
        ("TITLE", display(item.title.display())),
        ("FORMAT", display(item.format)),
        ("SCORE", format_score(item.average_score)),
        ("FAVOURITES", format_number(item.favourites)),
        ("POPULARITY", format_number(item.popularity)),
        ("GENRES", format_list(&item.genres)),
        ("TAGS", format_list(item.tags.iter().map(|t| t.name.as_str()))),
        (
            "STUDIOS",
            format_list(item.studios.iter().filter_map(|s| s.name.as_deref())),
        ),
        ("SYNONYMNS", format_list(&item.synonyms)),
        ("SYNOPSIS", synopsis),
    ]);
    escaped(values)
}

/// Valeurs de la fiche d'un épisode, déjà échappées
pub fn episode_info_values(title: &str, item: &MediaItem) -> Placeholders {
    let mut values = common_values(item);
    values.push(("TITLE", title.to_string()));
    escaped(values)
}

/// Rend la fiche d'un média avec le template `template`
pub fn render_item_info(item: &MediaItem, template: &str) -> String {
    substitute(template, &item_info_values(item))
}

/// Rend la fiche de l'épisode `title` du média `item`
pub fn render_episode_info(title: &str, item: &MediaItem, template: &str) -> String {
    substitute(template, &episode_info_values(title, item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoverImage, MediaTitle, StreamingEpisode};

    fn bebop() -> MediaItem {
        MediaItem {
            title: MediaTitle {
                english: Some("Cowboy Bebop".to_string()),
                ..Default::default()
            },
            cover_image: Some(CoverImage {
                large: "https://example.com/cover.png".to_string(),
                medium: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_placeholder_sets_are_complete() {
        let item = bebop();
        let values = item_info_values(&item);
        assert_eq!(values.len(), INFO_PLACEHOLDERS.len());
        assert!(INFO_PLACEHOLDERS.iter().all(|p| values.contains_key(p)));

        let values = episode_info_values("Episode 1", &item);
        assert_eq!(values.len(), EPISODE_INFO_PLACEHOLDERS.len());
        assert!(EPISODE_INFO_PLACEHOLDERS.iter().all(|p| values.contains_key(p)));
    }

    #[test]
    fn test_episode_resolution_fallbacks() {
        let mut item = bebop();
        let resolved = EpisodePreview::resolve("3", &item);
        assert_eq!(resolved.identity, "Cowboy Bebop_Episode_3");
        assert_eq!(resolved.title, "Episode 3");
        assert_eq!(resolved.thumbnail.as_deref(), Some("https://example.com/cover.png"));

        item.streaming_episodes.insert(
            "3".to_string(),
            StreamingEpisode {
                title: Some("Honky Tonk Women".to_string()),
                thumbnail: Some("https://example.com/ep3.jpg".to_string()),
            },
        );
        let resolved = EpisodePreview::resolve("3", &item);
        assert_eq!(resolved.title, "Honky Tonk Women");
        assert_eq!(resolved.thumbnail.as_deref(), Some("https://example.com/ep3.jpg"));
    }

    #[test]
    fn test_episode_prefix_has_no_control_characters() {
        let mut item = bebop();
        item.title.english = Some("Cowboy\tBebop\n".to_string());

        assert_eq!(episode_prefix(&item), "Cowboy Bebop _Episode_");
        assert_eq!(
            EpisodePreview::resolve("1", &item).identity,
            "Cowboy Bebop _Episode_1"
        );
        // Le shell retrouve exactement le préfixe utilisé pour la clé
        assert_eq!(shell_safe(&episode_prefix(&item)), episode_prefix(&item));
    }

    #[test]
    fn test_user_status_defaults() {
        let item = bebop();
        let values = item_info_values(&item);
        assert_eq!(values["USER_STATUS"], "NOT_ON_LIST");
        assert_eq!(values["USER_PROGRESS"], "0");
        assert_eq!(values["SYNOPSIS"], "No description available.");
        assert_eq!(values["NEXT_EPISODE"], "N/A");
    }
}
