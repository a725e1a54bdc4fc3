//! Arborescence du cache de prévisualisation

use crate::error::Result;
use crate::key::CacheKey;
use std::path::{Path, PathBuf};

/// Type d'entrée du cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// Couverture ou vignette téléchargée
    Image,
    /// Fiche texte déjà formatée
    Info,
}

impl CacheKind {
    /// Nom du sous-répertoire (ex: `"images"`, `"info"`)
    pub fn cache_type(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Info => "info",
        }
    }

    /// Extension des fichiers, les fiches texte n'en ont pas
    pub fn file_extension(&self) -> Option<&'static str> {
        match self {
            Self::Image => Some("png"),
            Self::Info => None,
        }
    }
}

/// Emplacement des entrées du cache sur disque
///
/// Format: `<cache_root>/previews/<images|info>/<key>[.png]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    previews: PathBuf,
}

impl CacheLayout {
    pub fn new(cache_root: impl AsRef<Path>) -> Self {
        Self {
            previews: cache_root.as_ref().join("previews"),
        }
    }

    /// Répertoire `previews` commun aux deux types d'entrées
    pub fn previews_dir(&self) -> &Path {
        &self.previews
    }

    pub fn dir(&self, kind: CacheKind) -> PathBuf {
        self.previews.join(kind.cache_type())
    }

    pub fn images_dir(&self) -> PathBuf {
        self.dir(CacheKind::Image)
    }

    pub fn info_dir(&self) -> PathBuf {
        self.dir(CacheKind::Info)
    }

    /// Construit le chemin complet d'une entrée
    pub fn file_path(&self, kind: CacheKind, key: &CacheKey) -> PathBuf {
        let name = match kind.file_extension() {
            Some(ext) => format!("{}.{}", key, ext),
            None => key.to_string(),
        };
        self.dir(kind).join(name)
    }

    pub fn image_path(&self, key: &CacheKey) -> PathBuf {
        self.file_path(CacheKind::Image, key)
    }

    pub fn info_path(&self, key: &CacheKey) -> PathBuf {
        self.file_path(CacheKind::Info, key)
    }

    /// Indique si l'entrée est présente sur disque
    pub fn contains(&self, kind: CacheKind, key: &CacheKey) -> bool {
        self.file_path(kind, key).exists()
    }

    /// Crée les répertoires `images` et `info` s'ils n'existent pas
    ///
    /// Les répertoires ne sont jamais supprimés par ce module.
    pub fn ensure_dirs(&self) -> Result<()> {
        for kind in [CacheKind::Image, CacheKind::Info] {
            let dir = self.dir(kind);
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
                tracing::debug!(directory = %dir.display(), "Created preview cache directory");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = CacheLayout::new("/cache");
        let key = CacheKey::derive("abc");

        assert_eq!(layout.images_dir(), PathBuf::from("/cache/previews/images"));
        assert_eq!(layout.info_dir(), PathBuf::from("/cache/previews/info"));
        assert_eq!(
            layout.image_path(&key),
            PathBuf::from(format!("/cache/previews/images/{}.png", key))
        );
        assert_eq!(
            layout.info_path(&key),
            PathBuf::from(format!("/cache/previews/info/{}", key))
        );
    }

    #[test]
    fn test_ensure_dirs_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CacheLayout::new(dir.path());

        layout.ensure_dirs().unwrap();
        layout.ensure_dirs().unwrap();

        assert!(layout.images_dir().is_dir());
        assert!(layout.info_dir().is_dir());
        assert!(!layout.contains(CacheKind::Image, &CacheKey::derive("x")));
    }
}
