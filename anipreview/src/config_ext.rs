//! Extension pour construire la configuration de prévisualisation depuis aniconfig
//!
//! Ce module fournit le trait `PreviewConfigExt` qui ajoute à
//! `aniconfig::Config` la lecture typée des paramètres de prévisualisation.

use crate::config::{PreviewConfig, PreviewMode};
use aniconfig::Config;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Trait d'extension pour gérer la prévisualisation dans aniconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use aniconfig::get_config;
/// use anipreview::{PreviewBuilder, PreviewConfigExt};
///
/// let config = get_config();
/// let builder = PreviewBuilder::new(config.get_preview_config()?)?;
/// ```
pub trait PreviewConfigExt {
    /// Mode de prévisualisation (default: "full")
    fn get_preview_kind(&self) -> Result<PreviewMode>;

    /// Définit le mode de prévisualisation
    fn set_preview_kind(&self, mode: PreviewMode) -> Result<()>;

    /// Rassemble tous les paramètres de prévisualisation
    ///
    /// Les tailles de pool nulles sont ramenées à 1.
    fn get_preview_config(&self) -> Result<PreviewConfig>;
}

impl PreviewConfigExt for Config {
    fn get_preview_kind(&self) -> Result<PreviewMode> {
        Ok(self.get_preview_mode()?.parse()?)
    }

    fn set_preview_kind(&self, mode: PreviewMode) -> Result<()> {
        self.set_preview_mode(mode.to_string())
    }

    fn get_preview_config(&self) -> Result<PreviewConfig> {
        let mut config = PreviewConfig::new(self.get_cache_root()?);

        config.mode = self.get_preview_kind()?;
        config.image_renderer = self.get_image_renderer()?;
        config.shell = self.get_shell()?;
        config.header_color = self.get_header_color()?;
        config.separator_color = self.get_separator_color()?;
        config.path_separator = self.get_path_separator()?;
        config.template_dir = self.get_template_dir()?.map(PathBuf::from);
        config.image_workers = self.get_image_workers()?.max(1);
        config.text_workers = self.get_text_workers()?.max(1);
        config.episode_workers = self.get_episode_workers()?.max(1);
        config.episode_image_workers = self.get_episode_image_workers()?.max(1);
        config.fetch_timeout = Duration::from_secs(self.get_fetch_timeout_secs()?.max(1) as u64);
        config.max_image_bytes = self.get_max_image_bytes()?.max(1);
        config.force_text_refresh = self.get_force_text_refresh()?;

        Ok(config)
    }
}
