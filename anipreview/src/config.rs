//! Paramètres typés de la prévisualisation

use crate::error::{PreviewError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Contenu affiché dans le panneau de prévisualisation fzf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewMode {
    /// Image et fiche texte
    #[default]
    Full,
    /// Image seule
    Image,
    /// Fiche texte seule
    Text,
    /// Aucune prévisualisation, rien n'est mis en cache
    None,
}

impl PreviewMode {
    pub fn wants_images(&self) -> bool {
        matches!(self, Self::Full | Self::Image)
    }

    pub fn wants_text(&self) -> bool {
        matches!(self, Self::Full | Self::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Image => "image",
            Self::Text => "text",
            Self::None => "none",
        }
    }
}

impl fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreviewMode {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "image" => Ok(Self::Image),
            "text" => Ok(Self::Text),
            "none" => Ok(Self::None),
            other => Err(PreviewError::Configuration(format!(
                "unknown preview mode '{other}' (expected full, image, text or none)"
            ))),
        }
    }
}

/// Configuration complète d'une construction de prévisualisation
///
/// Construite à partir d'`aniconfig` via [`crate::PreviewConfigExt`], ou
/// directement (tests, intégrations).
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    pub mode: PreviewMode,
    /// Commande d'affichage des images (`chafa`, `icat`...)
    pub image_renderer: String,
    /// Shell qui exécute le script de prévisualisation
    pub shell: String,
    /// Couleur des titres et clés, au format `"R,G,B"`
    pub header_color: String,
    /// Couleur des séparateurs, au format `"R,G,B"`
    pub separator_color: String,
    /// Séparateur imposé, `None` pour celui de la plateforme
    pub path_separator: Option<String>,
    /// Racine du cache, qui contiendra `previews/images` et `previews/info`
    pub cache_root: PathBuf,
    /// Répertoire de templates personnalisés
    pub template_dir: Option<PathBuf>,
    pub image_workers: usize,
    pub text_workers: usize,
    /// Taille du pool de fiches lors d'un remplissage d'épisodes
    pub episode_workers: usize,
    /// Taille du pool d'images lors d'un remplissage d'épisodes
    pub episode_image_workers: usize,
    pub fetch_timeout: Duration,
    /// Taille maximale d'une image téléchargée, en octets
    pub max_image_bytes: usize,
    /// Réécrit les fiches texte même si elles existent déjà
    pub force_text_refresh: bool,
}

impl PreviewConfig {
    /// Configuration par défaut enracinée dans `cache_root`
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            mode: PreviewMode::Full,
            image_renderer: "chafa".to_string(),
            shell: "bash".to_string(),
            header_color: "215,0,95".to_string(),
            separator_color: "208,208,208".to_string(),
            path_separator: None,
            cache_root: cache_root.into(),
            template_dir: None,
            image_workers: 5,
            text_workers: 10,
            episode_workers: 5,
            episode_image_workers: 2,
            fetch_timeout: anicache::DEFAULT_FETCH_TIMEOUT,
            max_image_bytes: anicache::DEFAULT_MAX_IMAGE_BYTES,
            force_text_refresh: false,
        }
    }

    /// Séparateur de chemin écrit dans le script
    pub fn path_separator(&self) -> &str {
        self.path_separator
            .as_deref()
            .unwrap_or(std::path::MAIN_SEPARATOR_STR)
    }

    /// Tailles des pools (images, fiches) d'un remplissage d'épisodes
    ///
    /// Le pool d'images reste strictement plus petit que celui des fiches
    /// dès que ce dernier dépasse 1.
    pub fn episode_pools(&self) -> (usize, usize) {
        let text = self.episode_workers.max(1);
        let image = self
            .episode_image_workers
            .min(self.image_workers)
            .min(text.saturating_sub(1))
            .max(1);
        (image, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_mode_parsing() {
        assert_eq!("full".parse::<PreviewMode>().unwrap(), PreviewMode::Full);
        assert_eq!(" Text ".parse::<PreviewMode>().unwrap(), PreviewMode::Text);
        assert!(matches!(
            "both".parse::<PreviewMode>(),
            Err(PreviewError::Configuration(_))
        ));
    }

    #[test]
    fn test_preview_mode_flags() {
        assert!(PreviewMode::Full.wants_images() && PreviewMode::Full.wants_text());
        assert!(PreviewMode::Image.wants_images() && !PreviewMode::Image.wants_text());
        assert!(!PreviewMode::Text.wants_images() && PreviewMode::Text.wants_text());
        assert!(!PreviewMode::None.wants_images() && !PreviewMode::None.wants_text());
    }

    #[test]
    fn test_path_separator_default() {
        let mut config = PreviewConfig::new("/tmp/cache");
        assert_eq!(config.path_separator(), std::path::MAIN_SEPARATOR_STR);

        config.path_separator = Some("\\".to_string());
        assert_eq!(config.path_separator(), "\\");
    }

    #[test]
    fn test_episode_pools() {
        let mut config = PreviewConfig::new("/tmp/cache");
        assert_eq!(config.episode_pools(), (2, 5));

        config.episode_image_workers = 8;
        assert_eq!(config.episode_pools(), (4, 5));

        config.image_workers = 1;
        assert_eq!(config.episode_pools(), (1, 5));

        config.episode_workers = 1;
        config.episode_image_workers = 0;
        assert_eq!(config.episode_pools(), (1, 1));
    }
}
