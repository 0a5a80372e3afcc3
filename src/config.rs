//! Analysis configuration: per-field specs, thresholds, and config-file loading.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Whether a column holds one category per row or a delimited category list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    MultiValued,
}

/// One analyzed field: the report name, the backing column, and its tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub column: String,
    pub kind: FieldKind,
    /// Overrides the z-score cutoff for this field. When unset, high-cardinality
    /// fields use the stricter default.
    #[serde(default)]
    pub z_threshold: Option<f64>,
    /// High-cardinality fields (country, cast) use the stricter z cutoff so only
    /// extreme categories surface.
    #[serde(default)]
    pub high_cardinality: bool,
    /// When set on a multi-valued field, the report includes a content-type split for
    /// the field's top categories.
    #[serde(default)]
    pub type_split: bool,
}

impl FieldSpec {
    fn scalar(name: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            kind: FieldKind::Scalar,
            z_threshold: None,
            high_cardinality: false,
            type_split: false,
        }
    }

    fn multi(name: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            kind: FieldKind::MultiValued,
            z_threshold: None,
            high_cardinality: false,
            type_split: false,
        }
    }
}

/// Analysis configuration with catalog-schema defaults. Every knob the engine reads
/// comes from here; nothing is ambient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Delimiter separating labels inside multi-valued columns.
    pub delimiter: char,
    /// Z-score cutoff for general fields.
    pub z_threshold: f64,
    /// Z-score cutoff for high-cardinality fields.
    pub z_threshold_high_cardinality: f64,
    /// Normality test sample cap. Larger count samples are truncated to the first
    /// `normality_cap` entries in table order; deterministic but not representative
    /// for very high-cardinality fields.
    pub normality_cap: usize,
    /// How many top categories to list per field (and to split by type).
    pub top_n: usize,
    /// The scalar column used for cross-field type splits.
    pub type_column: String,
    pub fields: Vec<FieldSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut country = FieldSpec::multi("country", "country");
        country.high_cardinality = true;
        country.type_split = true;
        let mut cast = FieldSpec::multi("cast", "cast");
        cast.high_cardinality = true;
        cast.type_split = true;

        Self {
            delimiter: ',',
            z_threshold: 2.0,
            z_threshold_high_cardinality: 2.5,
            normality_cap: 5000,
            top_n: 10,
            type_column: "type".to_string(),
            fields: vec![
                FieldSpec::scalar("type", "type"),
                FieldSpec::scalar("rating", "rating"),
                FieldSpec::multi("genre", "listed_in"),
                country,
                cast,
                FieldSpec::scalar("release_year", "release_year"),
                FieldSpec::scalar("year_added", "year_added"),
                FieldSpec::scalar("month_added", "month_added"),
            ],
        }
    }
}

impl AppConfig {
    /// The z cutoff in effect for a field: explicit override, else the
    /// high-cardinality default, else the general default.
    pub fn z_threshold_for(&self, field: &FieldSpec) -> f64 {
        field.z_threshold.unwrap_or(if field.high_cardinality {
            self.z_threshold_high_cardinality
        } else {
            self.z_threshold
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Locates and loads the config file. Defaults apply when no file exists.
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Loads `config.toml` from the config directory, or returns defaults when the
    /// file does not exist. A present-but-invalid file is an error, not a silent
    /// fallback.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.config_file();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let raw = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&raw)
            .wrap_err_with(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }
}

/// Loads configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&raw).wrap_err_with(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}
