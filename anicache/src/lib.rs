//! # anicache - Primitives de cache disque pour AniFzf
//!
//! Cette crate fournit les briques de base du cache de prévisualisation utilisé
//! par `anipreview` : dérivation des clés, écriture atomique des fichiers,
//! organisation des répertoires et téléchargement HTTP des images.
//!
//! ## Architecture
//!
//! ```text
//! anicache (générique)
//!     ├── key.rs       - Clé SHA256 dérivée d'une identité (titre, épisode...)
//!     ├── atomic.rs    - Écriture atomique (fichier temporaire + rename)
//!     ├── layout.rs    - Arborescence previews/images et previews/info
//!     └── download.rs  - Téléchargement HTTP borné en temps et en taille
//!
//! anipreview (spécialisé pour fzf)
//!     └── Utilise anicache + rendu des fiches + scripts de prévisualisation
//! ```
//!
//! ## Structure des fichiers
//!
//! ```text
//! <cache_root>/previews/
//! ├── images/
//! │   └── 9f86d081884c7d65...png     # Couverture ou vignette d'épisode
//! └── info/
//!     └── 9f86d081884c7d65...        # Fiche texte prête à afficher
//! ```
//!
//! Les clés identifient une entrée par son identité logique (le titre affiché
//! dans fzf) et non par son contenu : deux contenus pour la même identité
//! s'écrasent mutuellement.
//!
//! ## Exemple
//!
//! ```rust,no_run
//! use anicache::{CacheKey, CacheLayout, Fetcher, DEFAULT_MAX_IMAGE_BYTES};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anicache::Result<()> {
//!     let layout = CacheLayout::new("/tmp/anifzf");
//!     layout.ensure_dirs()?;
//!
//!     let key = CacheKey::derive("Cowboy Bebop");
//!     let fetcher = Fetcher::new(Duration::from_secs(20), DEFAULT_MAX_IMAGE_BYTES)?;
//!     let size = fetcher
//!         .fetch_to("https://example.com/cover.png", layout.image_path(&key))
//!         .await?;
//!     println!("{size} octets écrits");
//!     Ok(())
//! }
//! ```

pub mod atomic;
pub mod download;
pub mod error;
pub mod key;
pub mod layout;

pub use atomic::{write_atomic, AtomicFile};
pub use download::{Fetcher, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_IMAGE_BYTES};
pub use error::{CacheError, Result};
pub use key::CacheKey;
pub use layout::{CacheKind, CacheLayout};
