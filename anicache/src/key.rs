use sha2::{Digest, Sha256};
use std::fmt;

/// Clé d'une entrée du cache
///
/// Empreinte SHA256 (64 caractères hexadécimaux en minuscules) de l'identité
/// logique d'une entrée : le titre affiché dans fzf, ou
/// `"{titre}_Episode_{n}"` pour un épisode. La clé sert directement de nom
/// de fichier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Dérive la clé associée à une identité
    ///
    /// Fonction pure et totale : la chaîne vide a aussi une clé.
    ///
    /// # Exemple
    ///
    /// ```
    /// use anicache::CacheKey;
    ///
    /// let key = CacheKey::derive("Cowboy Bebop");
    /// assert_eq!(key.as_str().len(), 64);
    /// assert_eq!(key, CacheKey::derive("Cowboy Bebop"));
    /// ```
    pub fn derive(identity: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
