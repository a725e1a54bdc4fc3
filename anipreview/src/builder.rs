//! Construction du script de prévisualisation fzf
//!
//! Un appel prépare le cache, lance son remplissage en arrière-plan et
//! retourne aussitôt le script. Le script lit le cache au moment où fzf
//! l'exécute et tolère les entrées pas encore écrites.

use crate::ansi::{true_fg, RESET};
use crate::config::{PreviewConfig, PreviewMode};
use crate::error::Result;
use crate::format::shell_safe;
use crate::models::MediaItem;
use crate::render::episode_prefix;
use crate::template::{substitute, Placeholders, Templates};
use crate::worker::{CachePopulator, PreviewJob};
use anicache::CacheLayout;
use std::sync::Arc;
use tracing::{debug, warn};

/// Prépare les prévisualisations d'un menu fzf
#[derive(Debug, Clone)]
pub struct PreviewBuilder {
    config: PreviewConfig,
    layout: CacheLayout,
    templates: Arc<Templates>,
}

impl PreviewBuilder {
    /// Crée un constructeur, en chargeant les templates personnalisés s'il y en a
    pub fn new(config: PreviewConfig) -> Result<Self> {
        let templates = Templates::load(config.template_dir.as_deref())?;
        Ok(Self::with_templates(config, templates))
    }

    pub fn with_templates(config: PreviewConfig, templates: Templates) -> Self {
        Self {
            layout: CacheLayout::new(&config.cache_root),
            templates: Arc::new(templates),
            config,
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Travaux de remplissage pour un menu de médias
    ///
    /// `titles[i]` est la ligne affichée par fzf pour `items[i]`.
    pub fn item_jobs(&self, items: &[MediaItem], titles: &[String]) -> Vec<PreviewJob> {
        if items.len() != titles.len() {
            warn!(
                items = items.len(),
                titles = titles.len(),
                "Item and title counts differ, extra entries are ignored"
            );
        }
        items
            .iter()
            .zip(titles)
            .map(|(item, title)| PreviewJob::for_item(title, Arc::new(item.clone())))
            .collect()
    }

    /// Travaux de remplissage pour un menu d'épisodes de `item`
    pub fn episode_jobs(&self, episodes: &[String], item: &MediaItem) -> Vec<PreviewJob> {
        let item = Arc::new(item.clone());
        episodes
            .iter()
            .map(|episode| PreviewJob::for_episode(episode, item.clone()))
            .collect()
    }

    /// Remplisseur dimensionné pour un menu de médias
    pub fn item_populator(&self) -> Result<CachePopulator> {
        Ok(CachePopulator::new(
            self.layout.clone(),
            self.templates.clone(),
            &self.config,
            self.config.image_workers,
            self.config.text_workers,
        )?)
    }

    /// Remplisseur dimensionné pour un menu d'épisodes
    pub fn episode_populator(&self) -> Result<CachePopulator> {
        let (image_workers, text_workers) = self.config.episode_pools();
        Ok(CachePopulator::new(
            self.layout.clone(),
            self.templates.clone(),
            &self.config,
            image_workers,
            text_workers,
        )?)
    }

    /// Lance le remplissage pour un menu de médias et retourne le script
    ///
    /// Seule la création des répertoires du cache peut échouer. Les erreurs
    /// du remplissage sont journalisées et jamais remontées.
    pub fn build_item_preview(&self, items: &[MediaItem], titles: &[String]) -> Result<String> {
        self.layout.ensure_dirs()?;
        if self.config.mode != PreviewMode::None {
            let jobs = self.item_jobs(items, titles);
            debug!(entries = jobs.len(), "Starting item preview cache population");
            self.item_populator()?.spawn(jobs);
        }
        Ok(self.preview_script(""))
    }

    /// Lance le remplissage pour un menu d'épisodes et retourne le script
    pub fn build_episode_preview(&self, episodes: &[String], item: &MediaItem) -> Result<String> {
        self.layout.ensure_dirs()?;
        if self.config.mode != PreviewMode::None {
            let jobs = self.episode_jobs(episodes, item);
            debug!(entries = jobs.len(), "Starting episode preview cache population");
            self.episode_populator()?.spawn(jobs);
        }
        Ok(self.preview_script(&episode_prefix(item)))
    }

    /// Valeurs du script de prévisualisation
    pub fn preview_values(&self, prefix: &str) -> Placeholders {
        let header = true_fg(&self.config.header_color, true);
        let rule = true_fg(&self.config.separator_color, true);
        let path = |p: std::path::PathBuf| shell_safe(&p.to_string_lossy());

        Placeholders::from([
            ("SHELL", shell_safe(&self.config.shell)),
            ("PREVIEW_MODE", self.config.mode.to_string()),
            ("IMAGE_RENDERER", shell_safe(&self.config.image_renderer)),
            ("IMAGE_CACHE_PATH", path(self.layout.images_dir())),
            ("INFO_CACHE_PATH", path(self.layout.info_dir())),
            ("PATH_SEP", shell_safe(self.config.path_separator())),
            ("C_TITLE", header.clone()),
            ("C_KEY", header.clone()),
            ("C_VALUE", header),
            ("C_RULE", rule),
            ("RESET", RESET.to_string()),
            ("PREFIX", shell_safe(prefix)),
        ])
    }

    fn preview_script(&self, prefix: &str) -> String {
        substitute(&self.templates.preview, &self.preview_values(prefix))
    }
}

/// Construit le script d'un menu de médias avec `config`
pub fn build_item_preview(
    items: &[MediaItem],
    titles: &[String],
    config: &PreviewConfig,
) -> Result<String> {
    PreviewBuilder::new(config.clone())?.build_item_preview(items, titles)
}

/// Construit le script d'un menu d'épisodes avec `config`
pub fn build_episode_preview(
    episodes: &[String],
    item: &MediaItem,
    config: &PreviewConfig,
) -> Result<String> {
    PreviewBuilder::new(config.clone())?.build_episode_preview(episodes, item)
}
