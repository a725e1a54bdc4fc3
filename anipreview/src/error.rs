//! Gestion des erreurs de la construction des prévisualisations

use std::path::PathBuf;
use thiserror::Error;

/// Type Result personnalisé pour anipreview
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Erreurs remontées à l'appelant
///
/// Seules les erreurs survenant avant le lancement du remplissage en
/// arrière-plan sont visibles ici. Les échecs des tâches de fond sont
/// journalisés et comptés dans le rapport de remplissage.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// Erreur du cache disque (création des répertoires, client HTTP)
    #[error("Cache error: {0}")]
    Cache(#[from] anicache::CacheError),

    /// Template personnalisé illisible
    #[error("Failed to read template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Valeur de configuration invalide
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}
