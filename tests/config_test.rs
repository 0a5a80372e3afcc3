use color_eyre::Result;
use titlestat::config::{load_config_file, AppConfig, FieldKind};
use titlestat::ConfigManager;

#[test]
fn missing_config_file_falls_back_to_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let manager = ConfigManager::with_dir(dir.path().to_path_buf());
    let config = manager.load()?;
    assert_eq!(config.z_threshold, 2.0);
    assert_eq!(config.z_threshold_high_cardinality, 2.5);
    assert_eq!(config.normality_cap, 5000);
    assert_eq!(config.delimiter, ',');
    assert_eq!(config.fields.len(), 8);
    Ok(())
}

#[test]
fn config_file_overrides_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("config.toml"),
        r#"
z_threshold = 3.0
top_n = 5

[[fields]]
name = "genre"
column = "listed_in"
kind = "multi_valued"

[[fields]]
name = "rating"
column = "rating"
kind = "scalar"
z_threshold = 1.5
"#,
    )?;

    let manager = ConfigManager::with_dir(dir.path().to_path_buf());
    let config = manager.load()?;
    assert_eq!(config.z_threshold, 3.0);
    assert_eq!(config.top_n, 5);
    // unspecified keys keep their defaults
    assert_eq!(config.normality_cap, 5000);
    assert_eq!(config.fields.len(), 2);

    let genre = config.field("genre").unwrap();
    assert_eq!(genre.kind, FieldKind::MultiValued);
    assert_eq!(config.z_threshold_for(genre), 3.0);

    let rating = config.field("rating").unwrap();
    assert_eq!(rating.kind, FieldKind::Scalar);
    assert_eq!(config.z_threshold_for(rating), 1.5);
    Ok(())
}

#[test]
fn invalid_config_file_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("config.toml"), "z_threshold = \"high\"")?;
    let manager = ConfigManager::with_dir(dir.path().to_path_buf());
    assert!(manager.load().is_err());
    Ok(())
}

#[test]
fn explicit_config_path_loads_directly() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "top_n = 3\n")?;
    let config = load_config_file(&path)?;
    assert_eq!(config.top_n, 3);
    assert!(load_config_file(&dir.path().join("absent.toml")).is_err());
    Ok(())
}

#[test]
fn default_config_round_trips_through_toml() -> Result<()> {
    let config = AppConfig::default();
    let raw = toml::to_string_pretty(&config)?;
    let parsed: AppConfig = toml::from_str(&raw)?;
    assert_eq!(parsed.fields.len(), config.fields.len());
    assert_eq!(parsed.z_threshold, config.z_threshold);
    assert_eq!(parsed.type_column, config.type_column);
    Ok(())
}
