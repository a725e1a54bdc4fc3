//! Initialisation de la journalisation
//!
//! Les logs ne partent jamais sur la sortie standard, qui porte le script
//! de prévisualisation : la console utilise stderr.

use aniconfig::Config;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{Registry, filter::LevelFilter, prelude::*};

/// Destinations demandées en ligne de commande
#[derive(Debug, Default, Clone)]
pub struct LoggingOptions {
    /// `--log` : console au niveau DEBUG
    pub console: bool,
    /// `--log-file` : fichier au niveau DEBUG
    pub file: Option<PathBuf>,
}

fn string_to_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_uppercase().as_str() {
        "OFF" => Some(LevelFilter::OFF),
        "CRITICAL" | "ERROR" => Some(LevelFilter::ERROR),
        "WARN" | "WARNING" => Some(LevelFilter::WARN),
        "INFO" => Some(LevelFilter::INFO),
        "DEBUG" => Some(LevelFilter::DEBUG),
        "TRACE" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

/// Niveau effectif : DEBUG si une option de la ligne de commande est
/// active, sinon `logger.min_level`
fn effective_level(config: &Config, options: &LoggingOptions) -> LevelFilter {
    if options.console || options.file.is_some() {
        return LevelFilter::DEBUG;
    }
    match config.get_log_min_level() {
        Ok(l) => string_to_level(&l).unwrap_or(LevelFilter::INFO),
        Err(_) => LevelFilter::INFO,
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Installe le subscriber global
///
/// Sans aucune destination configurée, les événements sont filtrés puis
/// ignorés.
pub fn init_logging(config: &Config, options: &LoggingOptions) -> Result<()> {
    let level = effective_level(config, options);

    let enable_console = options.console || config.get_log_enable_console().unwrap_or(false);
    let log_file = match &options.file {
        Some(file) => Some(file.clone()),
        None => config.get_log_file()?.map(PathBuf::from),
    };

    let console_layer = enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
    });

    let file_layer = match &log_file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    Registry::default()
        .with(level)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::debug!(%level, console = enable_console, file = ?log_file, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_level() {
        assert_eq!(string_to_level("info"), Some(LevelFilter::INFO));
        assert_eq!(string_to_level(" Warning "), Some(LevelFilter::WARN));
        assert_eq!(string_to_level("CRITICAL"), Some(LevelFilter::ERROR));
        assert_eq!(string_to_level("verbose"), None);
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("anifzf.log");

        open_log_file(&path).unwrap();

        assert!(path.exists());
    }
}
