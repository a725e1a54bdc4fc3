//! # AniFzf Configuration Module
//!
//! This module provides configuration management for AniFzf, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use aniconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let mode = config.get_preview_mode()?;
//! let cache_root = config.get_cache_root()?;
//!
//! // Update configuration values
//! config.set_preview_mode("text".to_string())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("anifzf.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load AniFzf configuration"));
}

const ENV_CONFIG_DIR: &str = "ANIFZF_CONFIG";
const ENV_PREFIX: &str = "ANIFZF_CONFIG__";

// Default values for configuration
const DEFAULT_PREVIEW_MODE: &str = "full";
const DEFAULT_IMAGE_RENDERER: &str = "chafa";
const DEFAULT_SHELL: &str = "bash";
const DEFAULT_HEADER_COLOR: &str = "215,0,95";
const DEFAULT_SEPARATOR_COLOR: &str = "208,208,208";
const DEFAULT_IMAGE_WORKERS: usize = 5;
const DEFAULT_TEXT_WORKERS: usize = 10;
const DEFAULT_EPISODE_WORKERS: usize = 5;
const DEFAULT_EPISODE_IMAGE_WORKERS: usize = 2;
const DEFAULT_FETCH_TIMEOUT_SECS: usize = 20;
const DEFAULT_MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;
const DEFAULT_FORCE_TEXT_REFRESH: bool = false;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = false;

/// Macro to generate getter/setter for usize values with default
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            match self.get_value($path) {
                Ok(Value::Number(n)) => Ok(n.as_u64().map(|v| v as usize).unwrap_or($default)),
                Ok(Value::String(s)) => Ok(s.trim().parse().unwrap_or($default)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, size: usize) -> Result<()> {
            let n = Number::from(size);
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for string values with default
///
/// Empty strings are treated as unset.
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<String> {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.trim().is_empty() => Ok(s),
                _ => Ok($default.to_string()),
            }
        }

        pub fn $setter(&self, value: String) -> Result<()> {
            self.set_value($path, Value::String(value))
        }
    };
}

/// Configuration manager for AniFzf
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
///
/// # Examples
///
/// ```no_run
/// use aniconfig::get_config;
///
/// let config = get_config();
/// let renderer = config.get_image_renderer()?;
/// println!("Image renderer: {}", renderer);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

// Implémentation manuelle de Clone
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.lock().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".anifzf").exists() {
            return ".anifzf".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".anifzf");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        ".anifzf".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `ANIFZF_CONFIG` environment variable
    /// 3. `.anifzf` in the current directory
    /// 4. `.anifzf` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for write permission.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    ///
    /// # Arguments
    ///
    /// * `directory` - The directory containing the config.yaml file, or empty to use defaults
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file=%path, "Loaded config file");
            data
        } else {
            info!(config_file=%path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Merger avec la config par défaut (clés en minuscules des deux côtés)
        let external_value = Self::lower_keys_value(serde_yaml::from_slice(&yaml_data)?);
        default_value = Self::lower_keys_value(default_value);
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = default_value;

        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    fn lock(&self) -> MutexGuard<'_, Value> {
        // Une valeur YAML reste cohérente même après un panic d'un autre thread
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Directory holding config.yaml
    pub fn directory(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&*self.lock())?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["general", "preview"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        new_map.insert(Value::String(s.to_lowercase()), Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Résout un chemin relatif ou absolu et crée le répertoire si nécessaire
    fn resolve_and_create_dir(&self, dir_path: &str) -> Result<String> {
        let path = Path::new(dir_path);

        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            // Chemin relatif : le résoudre par rapport à config_dir
            Path::new(&self.config_dir).join(path)
        };

        if !absolute_path.exists() {
            fs::create_dir_all(&absolute_path)?;
            info!(directory=%absolute_path.display(), "Created cache directory");
        }

        Ok(absolute_path.to_string_lossy().to_string())
    }

    /// Récupère un répertoire géré par la configuration
    ///
    /// Le répertoire peut être absolu ou relatif au répertoire de
    /// configuration. Il est créé s'il n'existe pas.
    ///
    /// # Arguments
    ///
    /// * `path` - Chemin dans l'arbre de configuration (ex: `&["cache", "directory"]`)
    /// * `default` - Répertoire par défaut si non configuré
    pub fn get_managed_dir(&self, path: &[&str], default: &str) -> Result<String> {
        let dir_path = match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => default.to_string(),
        };
        self.resolve_and_create_dir(&dir_path)
    }

    /// Définit un répertoire géré par la configuration
    pub fn set_managed_dir(&self, path: &[&str], directory: String) -> Result<()> {
        self.set_value(path, Value::String(directory))
    }

    /// Racine du cache de prévisualisation
    ///
    /// Utilise `cache.directory` s'il est renseigné, sinon le répertoire de
    /// cache de la plateforme (`~/.cache/anifzf` sous Linux), et à défaut
    /// `cache` dans le répertoire de configuration.
    pub fn get_cache_root(&self) -> Result<String> {
        let default = dirs::cache_dir()
            .map(|d| d.join("anifzf").to_string_lossy().to_string())
            .unwrap_or_else(|| "cache".to_string());
        self.get_managed_dir(&["cache", "directory"], &default)
    }

    pub fn set_cache_root(&self, directory: String) -> Result<()> {
        self.set_managed_dir(&["cache", "directory"], directory)
    }

    /// Répertoire optionnel de templates remplaçant ceux intégrés
    pub fn get_template_dir(&self) -> Result<Option<String>> {
        match self.get_value(&["fzf", "template_dir"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => {
                let path = Path::new(&s);
                if path.is_absolute() {
                    Ok(Some(s))
                } else {
                    Ok(Some(
                        Path::new(&self.config_dir).join(path).to_string_lossy().to_string(),
                    ))
                }
            }
            _ => Ok(None),
        }
    }

    /// Séparateur de chemin imposé, `None` pour celui de la plateforme
    pub fn get_path_separator(&self) -> Result<Option<String>> {
        match self.get_value(&["general", "path_separator"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    /// Fichier de log, `None` si la journalisation fichier est désactivée
    pub fn get_log_file(&self) -> Result<Option<String>> {
        match self.get_value(&["logger", "file"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    pub fn set_log_file(&self, file: String) -> Result<()> {
        self.set_value(&["logger", "file"], Value::String(file))
    }

    impl_string_config!(
        get_preview_mode,
        set_preview_mode,
        &["general", "preview"],
        DEFAULT_PREVIEW_MODE
    );

    impl_string_config!(
        get_image_renderer,
        set_image_renderer,
        &["general", "image_renderer"],
        DEFAULT_IMAGE_RENDERER
    );

    impl_string_config!(get_shell, set_shell, &["general", "shell"], DEFAULT_SHELL);

    impl_string_config!(
        get_header_color,
        set_header_color,
        &["fzf", "preview_header_color"],
        DEFAULT_HEADER_COLOR
    );

    impl_string_config!(
        get_separator_color,
        set_separator_color,
        &["fzf", "preview_separator_color"],
        DEFAULT_SEPARATOR_COLOR
    );

    impl_usize_config!(
        get_image_workers,
        set_image_workers,
        &["cache", "image_workers"],
        DEFAULT_IMAGE_WORKERS
    );

    impl_usize_config!(
        get_text_workers,
        set_text_workers,
        &["cache", "text_workers"],
        DEFAULT_TEXT_WORKERS
    );

    impl_usize_config!(
        get_episode_workers,
        set_episode_workers,
        &["cache", "episode_workers"],
        DEFAULT_EPISODE_WORKERS
    );

    impl_usize_config!(
        get_episode_image_workers,
        set_episode_image_workers,
        &["cache", "episode_image_workers"],
        DEFAULT_EPISODE_IMAGE_WORKERS
    );

    impl_usize_config!(
        get_fetch_timeout_secs,
        set_fetch_timeout_secs,
        &["cache", "fetch_timeout_secs"],
        DEFAULT_FETCH_TIMEOUT_SECS
    );

    impl_usize_config!(
        get_max_image_bytes,
        set_max_image_bytes,
        &["cache", "max_image_bytes"],
        DEFAULT_MAX_IMAGE_BYTES
    );

    impl_bool_config!(
        get_force_text_refresh,
        set_force_text_refresh,
        &["cache", "force_text_refresh"],
        DEFAULT_FORCE_TEXT_REFRESH
    );

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["logger", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );
}

/// Returns the global configuration instance
///
/// The configuration is lazily loaded on first access.
///
/// # Examples
///
/// ```no_run
/// use aniconfig::get_config;
///
/// let config = get_config();
/// let mode = config.get_preview_mode();
/// ```
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings, keys from external are merged into default
/// - For scalars and sequences, external values replace default values
/// - Null external values keep the default
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // Une valeur nulle (ou un fichier vide) conserve la valeur par défaut
        (_, Value::Null) => {}
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}
