//! Configuration module for relmeta.
//!
//! Handles the config file, environment variables, and settings.

mod settings;

pub use settings::{expand_env_vars, CatalogSettings, FilterSettings, Settings, SettingsError};
