//! Remplissage du cache de prévisualisation en arrière-plan
//!
//! Un remplissage reçoit une liste de [`PreviewJob`] et, pour chacun :
//! - télécharge l'image si elle n'est pas déjà en cache ;
//! - rend et écrit la fiche texte (sauf si elle existe et que le
//!   rafraîchissement forcé est désactivé).
//!
//! Les téléchargements et les écritures de fiches ont chacun leur pool,
//! borné par un sémaphore. Une tâche qui échoue est journalisée et comptée,
//! sans interrompre les autres.
//!
//! ```text
//! populate(jobs)
//!   ├─ image absente  ──► [pool images] Fetcher::fetch_to ──► images/<clé>.png
//!   └─ fiche à écrire ──► [pool textes] render + write_atomic ──► info/<clé>
//! ```

use crate::config::{PreviewConfig, PreviewMode};
use crate::models::MediaItem;
use crate::render::{render_episode_info, render_item_info, EpisodePreview};
use crate::template::Templates;
use anicache::{write_atomic, CacheKey, CacheKind, CacheLayout, Fetcher};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Source de la fiche texte d'une entrée
#[derive(Debug, Clone)]
pub enum InfoSource {
    /// Fiche complète d'un média
    Item(Arc<MediaItem>),
    /// Fiche d'un épisode
    Episode { title: String, item: Arc<MediaItem> },
}

impl InfoSource {
    pub fn render(&self, templates: &Templates) -> String {
        match self {
            Self::Item(item) => render_item_info(item, &templates.info),
            Self::Episode { title, item } => {
                render_episode_info(title, item, &templates.episode_info)
            }
        }
    }
}

/// Travail de remplissage pour une entrée du menu
#[derive(Debug, Clone)]
pub struct PreviewJob {
    pub key: CacheKey,
    pub image_url: Option<String>,
    pub info: InfoSource,
}

impl PreviewJob {
    /// Entrée d'un média, identifiée par le titre affiché dans le menu
    pub fn for_item(identity: &str, item: Arc<MediaItem>) -> Self {
        Self {
            key: CacheKey::derive(identity),
            image_url: item.cover_url().map(str::to_string),
            info: InfoSource::Item(item),
        }
    }

    /// Entrée d'un épisode de `item`
    pub fn for_episode(episode: &str, item: Arc<MediaItem>) -> Self {
        let resolved = EpisodePreview::resolve(episode, &item);
        Self {
            key: CacheKey::derive(&resolved.identity),
            image_url: resolved.thumbnail,
            info: InfoSource::Episode {
                title: resolved.title,
                item,
            },
        }
    }
}

/// Bilan d'un remplissage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationReport {
    pub images_written: usize,
    /// Images déjà présentes, non retéléchargées
    pub images_skipped: usize,
    pub texts_written: usize,
    /// Fiches déjà présentes, conservées
    pub texts_skipped: usize,
    /// Téléchargements ou écritures en échec
    pub failures: usize,
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    ImageWritten,
    TextWritten,
    Failed,
}

impl PopulationReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::ImageWritten => self.images_written += 1,
            Outcome::TextWritten => self.texts_written += 1,
            Outcome::Failed => self.failures += 1,
        }
    }
}

/// Remplit le cache de prévisualisation avec des pools bornés
#[derive(Debug, Clone)]
pub struct CachePopulator {
    layout: CacheLayout,
    templates: Arc<Templates>,
    fetcher: Fetcher,
    mode: PreviewMode,
    force_text_refresh: bool,
    image_permits: Arc<Semaphore>,
    text_permits: Arc<Semaphore>,
}

impl CachePopulator {
    /// Crée un remplisseur avec `image_workers` téléchargements et
    /// `text_workers` écritures de fiches simultanés au plus
    pub fn new(
        layout: CacheLayout,
        templates: Arc<Templates>,
        config: &PreviewConfig,
        image_workers: usize,
        text_workers: usize,
    ) -> anicache::Result<Self> {
        Ok(Self {
            layout,
            templates,
            fetcher: Fetcher::new(config.fetch_timeout, config.max_image_bytes)?,
            mode: config.mode,
            force_text_refresh: config.force_text_refresh,
            image_permits: Arc::new(Semaphore::new(image_workers.max(1))),
            text_permits: Arc::new(Semaphore::new(text_workers.max(1))),
        })
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Exécute tous les travaux et attend leur fin
    ///
    /// Ne retourne jamais d'erreur : chaque échec est journalisé puis compté
    /// dans le rapport.
    pub async fn populate(&self, jobs: Vec<PreviewJob>) -> PopulationReport {
        let mut report = PopulationReport::default();
        let mut tasks = JoinSet::new();
        let total = jobs.len();

        for PreviewJob { key, image_url, info } in jobs {
            if self.mode.wants_images() {
                match image_url {
                    Some(_) if self.layout.contains(CacheKind::Image, &key) => {
                        report.images_skipped += 1;
                    }
                    Some(url) => {
                        let path = self.layout.image_path(&key);
                        let fetcher = self.fetcher.clone();
                        let permits = self.image_permits.clone();
                        tasks.spawn(async move {
                            let Ok(_permit) = permits.acquire_owned().await else {
                                return Outcome::Failed;
                            };
                            match fetcher.fetch_to(&url, &path).await {
                                Ok(size) => {
                                    debug!(url = %url, size, path = %path.display(), "Cached preview image");
                                    Outcome::ImageWritten
                                }
                                Err(e) => {
                                    error!("Failed to download image {}: {}", url, e);
                                    Outcome::Failed
                                }
                            }
                        });
                    }
                    None => debug!(%key, "No image for preview entry"),
                }
            }

            if self.mode.wants_text() {
                let path = self.layout.info_path(&key);
                if !self.force_text_refresh && path.exists() {
                    report.texts_skipped += 1;
                    continue;
                }

                let templates = self.templates.clone();
                let permits = self.text_permits.clone();
                tasks.spawn(async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return Outcome::Failed;
                    };
                    let target = path.clone();
                    let written = tokio::task::spawn_blocking(move || {
                        write_atomic(&target, info.render(&templates))
                    })
                    .await;

                    match written {
                        Ok(Ok(())) => Outcome::TextWritten,
                        Ok(Err(e)) => {
                            error!("Failed to write preview info {}: {}", path.display(), e);
                            Outcome::Failed
                        }
                        Err(e) => {
                            error!("Preview info task for {} failed: {}", path.display(), e);
                            Outcome::Failed
                        }
                    }
                });
            }
        }

        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    warn!("Preview cache task aborted: {}", e);
                    report.failures += 1;
                }
            }
        }

        info!(
            entries = total,
            images_written = report.images_written,
            images_skipped = report.images_skipped,
            texts_written = report.texts_written,
            texts_skipped = report.texts_skipped,
            failures = report.failures,
            "Preview cache populated"
        );
        report
    }

    /// Lance le remplissage sans l'attendre
    ///
    /// Utilise le runtime Tokio courant s'il existe, sinon un thread dédié
    /// avec son propre runtime. Le thread n'empêche pas le processus de se
    /// terminer : les entrées non écrites seront simplement absentes.
    pub fn spawn(self, jobs: Vec<PreviewJob>) {
        spawn_detached(async move {
            self.populate(jobs).await;
        });
    }
}

fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        handle.spawn(future);
        return;
    }

    let spawned = std::thread::Builder::new()
        .name("anifzf-preview-cache".to_string())
        .spawn(move || {
            match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(future),
                Err(e) => error!("Failed to start preview cache runtime: {}", e),
            }
        });

    if let Err(e) = spawned {
        error!("Failed to spawn preview cache thread: {}", e);
    }
}
