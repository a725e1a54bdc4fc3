//! Templates shell et substitution des `{PLACEHOLDER}`
//!
//! La substitution se fait en une seule passe sur le template d'origine : une
//! valeur insérée n'est jamais relue, même si elle contient elle-même un
//! motif `{NOM}`. Les motifs inconnus sont laissés tels quels (ils peuvent
//! appartenir au shell ou à fzf).

use crate::error::{PreviewError, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;

/// Script de prévisualisation passé à fzf
pub const PREVIEW_TEMPLATE: &str = include_str!("templates/preview.template.sh");
/// Fiche d'un média
pub const INFO_TEMPLATE: &str = include_str!("templates/info.template.sh");
/// Fiche d'un épisode
pub const EPISODE_INFO_TEMPLATE: &str = include_str!("templates/episode-info.template.sh");

const PREVIEW_FILE: &str = "preview.template.sh";
const INFO_FILE: &str = "info.template.sh";
const EPISODE_INFO_FILE: &str = "episode-info.template.sh";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([A-Z_]+)\}").expect("valid regex"));

/// Valeurs à substituer, indexées par nom de placeholder
pub type Placeholders = HashMap<&'static str, String>;

/// Remplace chaque `{NOM}` connu de `template` par sa valeur
pub fn substitute(template: &str, values: &Placeholders) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Noms des placeholders présents dans `template`, dans l'ordre d'apparition
pub fn placeholders_in(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        if !names.iter().any(|n| n == &caps[1]) {
            names.push(caps[1].to_string());
        }
    }
    names
}

/// Jeu de templates utilisé pour une construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub preview: String,
    pub info: String,
    pub episode_info: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            preview: PREVIEW_TEMPLATE.to_string(),
            info: INFO_TEMPLATE.to_string(),
            episode_info: EPISODE_INFO_TEMPLATE.to_string(),
        }
    }
}

impl Templates {
    /// Charge les templates, ceux présents dans `dir` remplaçant les intégrés
    ///
    /// Un fichier absent du répertoire n'est pas une erreur ; un fichier
    /// présent mais illisible en est une.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = dir else {
            return Ok(Self::default());
        };

        Ok(Self {
            preview: load_one(dir, PREVIEW_FILE, PREVIEW_TEMPLATE)?,
            info: load_one(dir, INFO_FILE, INFO_TEMPLATE)?,
            episode_info: load_one(dir, EPISODE_INFO_FILE, EPISODE_INFO_TEMPLATE)?,
        })
    }
}

fn load_one(dir: &Path, name: &str, embedded: &str) -> Result<String> {
    let path = dir.join(name);
    if !path.exists() {
        return Ok(embedded.to_string());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|source| PreviewError::Template { path: path.clone(), source })?;
    tracing::debug!(path = %path.display(), "Using custom template");
    Ok(content)
}
