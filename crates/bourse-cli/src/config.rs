//! Layered settings: `bourse.toml`, then `BOURSE_*` environment variables,
//! then command-line flags. Later layers win.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bourse_core::{CatalogShape, CatalogSource};
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::CliError;

const DEFAULT_CONFIG_FILE: &str = "bourse.toml";
const DEFAULT_CATALOG: &str = "assets/data/exchanges.json";
const DEFAULT_GICS: &str = "assets/data/gics.json";
const DEFAULT_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog: String,
    pub shape: CatalogShape,
    pub timeout_ms: u64,
    pub gics: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG.into(),
            shape: CatalogShape::Auto,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            gics: PathBuf::from(DEFAULT_GICS),
            log_level: DEFAULT_LOG_LEVEL.into(),
        }
    }
}

impl Settings {
    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource::parse(&self.catalog, self.shape)
    }
}

/// Keys accepted in `bourse.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    catalog: Option<String>,
    shape: Option<String>,
    timeout_ms: Option<u64>,
    gics: Option<PathBuf>,
    log_level: Option<String>,
}

pub fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let file = match &cli.config {
        Some(path) => Some(read_file_settings(path)?),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                Some(read_file_settings(path)?)
            } else {
                None
            }
        }
    };

    let mut settings = Settings::default();
    if let Some(file) = file {
        apply_file(&mut settings, file)?;
    }
    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    apply_cli(&mut settings, cli);
    Ok(settings)
}

fn read_file_settings(path: &Path) -> Result<FileSettings, CliError> {
    let config_error = |message: String| CliError::Config {
        path: path.display().to_string(),
        message,
    };

    let raw = fs::read_to_string(path).map_err(|error| config_error(error.to_string()))?;
    toml::from_str(&raw).map_err(|error| config_error(error.to_string()))
}

fn apply_file(settings: &mut Settings, file: FileSettings) -> Result<(), CliError> {
    if let Some(catalog) = file.catalog {
        settings.catalog = catalog;
    }
    if let Some(shape) = file.shape {
        settings.shape = CatalogShape::from_str(&shape)?;
    }
    if let Some(timeout_ms) = file.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    if let Some(gics) = file.gics {
        settings.gics = gics;
    }
    if let Some(log_level) = file.log_level {
        settings.log_level = log_level;
    }
    Ok(())
}

fn apply_env<F>(settings: &mut Settings, lookup: F) -> Result<(), CliError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(catalog) = lookup("BOURSE_CATALOG") {
        settings.catalog = catalog;
    }
    if let Some(shape) = lookup("BOURSE_SHAPE") {
        settings.shape = CatalogShape::from_str(&shape)?;
    }
    if let Some(timeout_ms) = lookup("BOURSE_TIMEOUT_MS") {
        settings.timeout_ms = timeout_ms.trim().parse().map_err(|_| CliError::Config {
            path: String::from("BOURSE_TIMEOUT_MS"),
            message: format!("expected a number of milliseconds, got '{timeout_ms}'"),
        })?;
    }
    if let Some(gics) = lookup("BOURSE_GICS") {
        settings.gics = PathBuf::from(gics);
    }
    if let Some(log_level) = lookup("BOURSE_LOG_LEVEL") {
        settings.log_level = log_level;
    }
    Ok(())
}

fn apply_cli(settings: &mut Settings, cli: &Cli) {
    if let Some(catalog) = &cli.catalog {
        settings.catalog = catalog.clone();
    }
    if let Some(shape) = cli.shape {
        settings.shape = shape;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    if let Some(gics) = &cli.gics {
        settings.gics = gics.clone();
    }
    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_bundled_catalog() {
        let settings = Settings::default();
        assert_eq!(settings.catalog, "assets/data/exchanges.json");
        assert_eq!(settings.shape, CatalogShape::Auto);
        assert_eq!(settings.timeout_ms, 3_000);
    }

    #[test]
    fn gics_defaults_to_bundled_taxonomy_and_can_be_overridden() {
        let mut settings = Settings::default();
        assert_eq!(settings.gics, PathBuf::from("assets/data/gics.json"));

        apply_env(&mut settings, env(&[("BOURSE_GICS", "/srv/gics.json")])).expect("apply env");
        assert_eq!(settings.gics, PathBuf::from("/srv/gics.json"));
    }

    #[test]
    fn file_then_env_then_cli() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "catalog = \"https://example.test/exchanges.json\"\nshape = \"grouped\"\ntimeout_ms = 900"
        )
        .expect("write config");

        let cli = Cli::try_parse_from([
            "bourse",
            "--config",
            file.path().to_str().expect("utf-8 path"),
            "--timeout-ms",
            "250",
            "countries",
        ])
        .expect("valid arguments");

        let mut settings = Settings::default();
        apply_file(&mut settings, read_file_settings(file.path()).expect("parse"))
            .expect("apply file");
        apply_env(&mut settings, env(&[("BOURSE_SHAPE", "flat")])).expect("apply env");
        apply_cli(&mut settings, &cli);

        assert_eq!(settings.catalog, "https://example.test/exchanges.json");
        assert_eq!(settings.shape, CatalogShape::Flat);
        assert_eq!(settings.timeout_ms, 250);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "catalgo = \"typo\"").expect("write config");

        let err = read_file_settings(file.path()).expect_err("must fail");
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn invalid_env_timeout_is_a_config_error() {
        let mut settings = Settings::default();
        let err = apply_env(&mut settings, env(&[("BOURSE_TIMEOUT_MS", "soon")]))
            .expect_err("must fail");
        assert!(matches!(err, CliError::Config { .. }));
    }
}
