//! Écriture atomique des fichiers du cache
//!
//! Les données sont écrites dans un fichier temporaire frère de la cible,
//! synchronisées sur disque, puis renommées sur la cible. Le renommage est le
//! seul point de validation : un lecteur voit soit l'ancien fichier complet,
//! soit le nouveau, jamais un fichier tronqué.

use crate::error::{CacheError, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Fichier en cours d'écriture atomique
///
/// Le contenu n'est visible à l'emplacement final qu'après [`AtomicFile::commit`].
/// Si l'objet est abandonné avant (erreur, panic, tâche interrompue), le
/// fichier temporaire est supprimé et la cible reste inchangée.
///
/// Le répertoire parent de la cible doit exister.
///
/// # Exemple
///
/// ```rust,no_run
/// use anicache::AtomicFile;
/// use std::io::Write;
///
/// let mut file = AtomicFile::create("/tmp/previews/info/abc")?;
/// file.write_all(b"Cowboy Bebop")?;
/// file.commit()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct AtomicFile {
    target: PathBuf,
    temp: NamedTempFile,
}

impl AtomicFile {
    /// Ouvre un fichier temporaire dans le répertoire de `path`
    ///
    /// Le temporaire doit être sur le même système de fichiers que la cible
    /// pour que le renommage soit atomique.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(".tmp")
            .tempfile_in(&parent)
            .map_err(|e| CacheError::persistence(&target, e))?;

        Ok(Self { target, temp })
    }

    /// Chemin final du fichier
    pub fn path(&self) -> &Path {
        &self.target
    }

    /// Valide l'écriture : flush, fsync puis renommage sur la cible
    pub fn commit(self) -> Result<()> {
        let Self { target, mut temp } = self;

        temp.flush()
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| CacheError::persistence(&target, e))?;

        temp.persist(&target)
            .map_err(|e| CacheError::persistence(&target, e.error))?;

        tracing::trace!(path = %target.display(), "Committed cache file");
        Ok(())
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

/// Écrit `contents` dans `path` de façon atomique
///
/// Fonctionne aussi bien pour les images (octets) que pour le texte.
pub fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let mut file = AtomicFile::create(path)?;
    if let Err(e) = file.write_all(contents.as_ref()) {
        return Err(CacheError::persistence(file.path(), e));
    }
    file.commit()
}
