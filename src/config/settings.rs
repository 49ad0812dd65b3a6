//! TOML-based configuration for relmeta.
//!
//! Supports a config file (relmeta.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [filter]
//! include_schemas = ["public", "sales"]
//! exclude_relations = ["public.audit_log"]
//! include_relations = ["public.rank_1_prt_girls"]
//! leaf_partition_data = true
//!
//! [catalog]
//! snapshot = "${BACKUP_DIR}/catalog.json"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::{FilterSet, RelationFilter, SchemaFilter};
use crate::metadata::{CatalogError, CatalogSnapshot};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Failed to load catalog snapshot: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Object selection.
    pub filter: FilterSettings,

    /// Catalog source.
    pub catalog: CatalogSettings,
}

/// Object filter configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterSettings {
    pub include_schemas: Vec<String>,
    pub exclude_schemas: Vec<String>,

    /// Fully-qualified relation names (`schema.name`).
    pub include_relations: Vec<String>,
    pub exclude_relations: Vec<String>,

    /// Select every leaf partition of a selected partitioned table.
    pub leaf_partition_data: bool,
}

/// Catalog source configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Path to a JSON catalog snapshot (supports ${ENV_VAR} expansion).
    pub snapshot: Option<String>,
}

impl CatalogSettings {
    /// Get the snapshot path with environment variables expanded.
    pub fn resolved_snapshot_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.snapshot
            .as_deref()
            .map(|path| expand_env_vars(path).map(PathBuf::from))
            .transpose()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse settings from TOML text and validate them.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `RELMETA_CONFIG`
    /// 2. `./relmeta.toml`
    /// 3. `~/.config/relmeta/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("RELMETA_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("relmeta.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("relmeta").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let filter = &self.filter;
        if let Some(schema) = filter
            .include_schemas
            .iter()
            .find(|s| filter.exclude_schemas.contains(s))
        {
            return Err(SettingsError::InvalidConfig(format!(
                "schema '{schema}' is both included and excluded"
            )));
        }

        let include = FilterSet::include(filter.include_relations.iter().cloned());
        if let Some(name) = filter
            .exclude_relations
            .iter()
            .find(|name| include.contains(name))
        {
            return Err(SettingsError::InvalidConfig(format!(
                "relation '{name}' is both included and excluded"
            )));
        }
        Ok(())
    }

    /// Build the relation filter described by `[filter]`.
    pub fn relation_filter(&self) -> RelationFilter {
        let filter = &self.filter;
        RelationFilter {
            schemas: SchemaFilter::new(
                filter.include_schemas.clone(),
                filter.exclude_schemas.clone(),
            ),
            include: FilterSet::include(filter.include_relations.iter().cloned()),
            exclude: FilterSet::exclude(filter.exclude_relations.iter().cloned()),
        }
    }

    /// Load the catalog snapshot named by `[catalog]`.
    pub fn open_snapshot(&self) -> Result<CatalogSnapshot, SettingsError> {
        let path = self.catalog.resolved_snapshot_path()?.ok_or_else(|| {
            SettingsError::InvalidConfig("no catalog snapshot configured".to_string())
        })?;
        let snapshot = CatalogSnapshot::from_file(&path)?;
        tracing::info!(
            path = %path.display(),
            objects = snapshot.objects().len(),
            "opened catalog snapshot"
        );
        Ok(snapshot)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR ends at the first non-alphanumeric, non-underscore char
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
