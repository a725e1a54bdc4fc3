//! # anipreview - Prévisualisations fzf adossées à un cache disque
//!
//! Cette crate prépare le panneau de prévisualisation des menus fzf d'AniFzf :
//! pour chaque entrée du menu, une image et une fiche texte sont écrites dans
//! le cache en arrière-plan, pendant que fzf exécute un script qui les lit.
//!
//! ## Architecture
//!
//! ```text
//! PreviewBuilder::build_item_preview(items, titles)
//!   ├─ CacheLayout::ensure_dirs          (seule erreur remontée)
//!   ├─ CachePopulator::spawn(jobs)       (détaché, jamais attendu)
//!   │    ├─ image : Fetcher ──► images/<sha256>.png
//!   │    └─ fiche : render_item_info ──► info/<sha256>
//!   └─ substitute(preview.template.sh)  ──► script retourné à fzf
//! ```
//!
//! Les clés sont le SHA-256 de l'identité de l'entrée (le titre affiché, ou
//! `"<titre>_Episode_<n>"`) : le script recalcule la même clé à partir de la
//! ligne sélectionnée.
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use anipreview::{MediaItem, PreviewBuilder, PreviewConfig};
//!
//! # fn main() -> anipreview::Result<()> {
//! let config = PreviewConfig::new("/tmp/anifzf");
//! let builder = PreviewBuilder::new(config)?;
//!
//! let items: Vec<MediaItem> = Vec::new();
//! let titles: Vec<String> = Vec::new();
//! let script = builder.build_item_preview(&items, &titles)?;
//! println!("{script}");
//! # Ok(())
//! # }
//! ```

pub mod ansi;
pub mod builder;
pub mod config;
pub mod config_ext;
pub mod error;
pub mod format;
pub mod models;
pub mod render;
pub mod template;
pub mod worker;

pub use builder::{build_episode_preview, build_item_preview, PreviewBuilder};
pub use config::{PreviewConfig, PreviewMode};
pub use config_ext::PreviewConfigExt;
pub use error::{PreviewError, Result};
pub use models::{
    AiringSchedule, CoverImage, FuzzyDate, MediaFormat, MediaItem, MediaStatus, MediaTag,
    MediaTitle, StreamingEpisode, Studio, UserListStatus, UserStatus,
};
pub use render::{render_episode_info, render_item_info, EpisodePreview};
pub use template::{substitute, Templates};
pub use worker::{CachePopulator, InfoSource, PopulationReport, PreviewJob};
