//! Gestion des erreurs du cache disque

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Type Result personnalisé pour anicache
pub type Result<T> = std::result::Result<T, CacheError>;

/// Erreurs possibles lors du remplissage du cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Erreur réseau (connexion, timeout, redirections, lecture du corps)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Le serveur a répondu avec un statut d'erreur
    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },

    /// Réponse plus grande que la limite du client
    #[error("Response from {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },

    /// Échec d'écriture ou de renommage d'un fichier du cache
    #[error("Failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Erreur d'entrée/sortie hors écriture atomique (création de répertoires...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tâche de fond interrompue (panic ou annulation du runtime)
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CacheError {
    /// Construit une erreur de persistance pour un chemin donné
    pub fn persistence(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Indique si l'erreur provient du réseau (transport, statut HTTP, taille)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::TooLarge { .. }
        )
    }
}
