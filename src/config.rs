use henro_core::{DerivationRule, ImageUrlTemplate, RowMapping};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Credentials for the Firestore REST API.
///
/// The token is an already-issued OAuth2 access token, e.g. the output of
/// `gcloud auth print-access-token`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub access_token_file: Option<PathBuf>,
}

/// Firestore target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    pub project_id: Option<String>,
    pub database: String,
    pub collection: String,
    /// `host:port` of a local emulator; when set, credentials are not needed
    pub emulator_host: Option<String>,
    pub credentials: CredentialsConfig,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            database: "(default)".to_string(),
            collection: "temples".to_string(),
            emulator_host: None,
            credentials: CredentialsConfig::default(),
        }
    }
}

/// Storage bucket that holds the site images
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub base_url: String,
    pub bucket: Option<String>,
    pub folder: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: henro_core::rules::DEFAULT_BASE_URL.to_string(),
            bucket: None,
            folder: "temples".to_string(),
            token: None,
        }
    }
}

/// A column copied into each document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub source: String,
    pub target: String,
}

/// How a derived field is computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleConfig {
    Prefix { column: String, chars: usize },
    GeoPoint { latitude: String, longitude: String },
    ImageUrl { column: String, filename: String },
}

/// A derived document field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedField {
    pub field: String,
    #[serde(flatten)]
    pub rule: RuleConfig,
}

/// Column-to-field mapping. Defaults to the Shikoku pilgrimage dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    pub key_column: String,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub derived: Vec<DerivedField>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        let column = |source: &str, target: &str| ColumnConfig {
            source: source.to_string(),
            target: target.to_string(),
        };
        let image = |field: &str, filename: &str| DerivedField {
            field: field.to_string(),
            rule: RuleConfig::ImageUrl {
                column: "お遍路の番号".to_string(),
                filename: filename.to_string(),
            },
        };

        Self {
            key_column: "お遍路の番号".to_string(),
            columns: vec![
                column("住所", "address"),
                column("徒歩距離(m)", "distance"),
                column("お遍路の番号", "id"),
                column("名前", "name"),
            ],
            derived: vec![
                DerivedField {
                    field: "prefecture".to_string(),
                    rule: RuleConfig::Prefix {
                        column: "住所".to_string(),
                        chars: 3,
                    },
                },
                DerivedField {
                    field: "geoPoint".to_string(),
                    rule: RuleConfig::GeoPoint {
                        latitude: "緯度(北緯)".to_string(),
                        longitude: "経度(東経)".to_string(),
                    },
                },
                image("images", "1.jpg"),
                image("stamp_images", "stamp.jpg"),
            ],
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Delimited text file with one row per site
    pub input_path: ConfigValue<PathBuf>,
    /// Field delimiter of the input file
    pub delimiter: String,
    /// Firestore target
    pub firestore: FirestoreConfig,
    /// Image storage
    pub storage: StorageConfig,
    /// Column-to-field mapping
    pub mapping: MappingConfig,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    input_path: Option<PathBuf>,
    delimiter: Option<String>,
    firestore: Option<FirestoreConfig>,
    storage: Option<StorageConfig>,
    mapping: Option<MappingConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut input_path = ConfigValue::new(
            PathBuf::from("temple_info_update.csv"),
            ConfigSource::Default,
        );
        let mut delimiter = ",".to_string();
        let mut firestore = FirestoreConfig::default();
        let mut storage = StorageConfig::default();
        let mut mapping = MappingConfig::default();
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(input) = file_config.input_path {
                // Resolve relative paths against config file's directory
                let resolved = if input.is_relative() {
                    path.parent().map(|p| p.join(&input)).unwrap_or(input)
                } else {
                    input
                };
                input_path = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(d) = file_config.delimiter {
                delimiter = d;
            }
            if let Some(f) = file_config.firestore {
                firestore = f;
            }
            if let Some(s) = file_config.storage {
                storage = s;
            }
            if let Some(m) = file_config.mapping {
                mapping = m;
            }
        }

        // Apply environment variable overrides
        if let Ok(input) = std::env::var("HENRO_INPUT_PATH") {
            input_path = ConfigValue::new(PathBuf::from(input), ConfigSource::Environment);
        }
        if let Ok(project) = std::env::var("HENRO_PROJECT_ID") {
            firestore.project_id = Some(project);
        }
        if let Ok(collection) = std::env::var("HENRO_COLLECTION") {
            firestore.collection = collection;
        }
        if let Ok(host) = std::env::var("FIRESTORE_EMULATOR_HOST") {
            firestore.emulator_host = Some(host);
        }
        if let Ok(token) = std::env::var("HENRO_ACCESS_TOKEN") {
            firestore.credentials.access_token = Some(token);
        }
        if let Ok(token_file) = std::env::var("HENRO_ACCESS_TOKEN_FILE") {
            firestore.credentials.access_token_file = Some(PathBuf::from(token_file));
        }
        if let Ok(bucket) = std::env::var("HENRO_BUCKET") {
            storage.bucket = Some(bucket);
        }
        if let Ok(token) = std::env::var("HENRO_STORAGE_TOKEN") {
            storage.token = Some(token);
        }

        Ok(Self {
            input_path,
            delimiter,
            firestore,
            storage,
            mapping,
            config_file,
        })
    }

    /// The delimiter as a single byte.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        let bytes = self.delimiter.as_bytes();
        if bytes.len() == 1 {
            Ok(bytes[0])
        } else {
            Err(ConfigError::InvalidDelimiter(self.delimiter.clone()))
        }
    }

    /// Builds the row mapping, including image URL rules for the configured bucket.
    pub fn row_mapping(&self) -> Result<RowMapping, ConfigError> {
        let mut mapping = RowMapping::new(&self.mapping.key_column);

        for column in &self.mapping.columns {
            mapping = mapping.with_column(&column.source, &column.target);
        }

        for derived in &self.mapping.derived {
            let rule = match &derived.rule {
                RuleConfig::Prefix { column, chars } => {
                    DerivationRule::prefix(&derived.field, column, *chars)
                }
                RuleConfig::GeoPoint {
                    latitude,
                    longitude,
                } => DerivationRule::geo_point(&derived.field, latitude, longitude),
                RuleConfig::ImageUrl { column, filename } => DerivationRule::image_urls(
                    &derived.field,
                    column,
                    self.image_template()?,
                    filename,
                ),
            };
            mapping = mapping.with_rule(rule);
        }

        Ok(mapping)
    }

    fn image_template(&self) -> Result<ImageUrlTemplate, ConfigError> {
        let bucket = self
            .storage
            .bucket
            .as_ref()
            .ok_or(ConfigError::Missing("storage.bucket"))?;

        let mut template = ImageUrlTemplate::new(bucket)
            .with_base_url(&self.storage.base_url)
            .with_folder(&self.storage.folder);
        if let Some(token) = &self.storage.token {
            template = template.with_token(token);
        }
        Ok(template)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/henro/
    /// - macOS: ~/Library/Application Support/henro/
    /// - Windows: %APPDATA%/henro/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("henro")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidDelimiter(String),
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidDelimiter(d) => {
                write!(f, "Delimiter must be a single byte, got '{}'", d)
            }
            ConfigError::Missing(key) => {
                write!(f, "'{}' is not configured", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e),
            ConfigError::InvalidDelimiter(_) | ConfigError::Missing(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(
            config.input_path.value,
            PathBuf::from("temple_info_update.csv")
        );
        assert_eq!(config.input_path.source, ConfigSource::Default);
        assert_eq!(config.delimiter, ",");
        assert_eq!(config.firestore.collection, "temples");
        assert_eq!(config.firestore.database, "(default)");
        assert_eq!(config.mapping, MappingConfig::default());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "input_path: /data/temples.csv").unwrap();
        writeln!(file, "firestore:").unwrap();
        writeln!(file, "  project_id: virtual-pilgrimage-dev").unwrap();
        writeln!(file, "storage:").unwrap();
        writeln!(file, "  bucket: virtual-pilgrimage-dev.appspot.com").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.input_path.value, PathBuf::from("/data/temples.csv"));
        assert_eq!(config.input_path.source, ConfigSource::File);
        assert_eq!(
            config.firestore.project_id.as_deref(),
            Some("virtual-pilgrimage-dev")
        );
        // Unspecified nested fields keep their defaults
        assert_eq!(config.firestore.collection, "temples");
        assert_eq!(config.storage.folder, "temples");
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_input_path_resolves_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "input_path: data/temples.csv\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(
            config.input_path.value,
            temp_dir.path().join("data/temples.csv")
        );
    }

    #[test]
    fn test_custom_mapping_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            r#"
mapping:
  key_column: number
  columns:
    - source: title
      target: name
  derived:
    - field: region
      prefix:
        column: address
        chars: 2
    - field: location
      geo_point:
        latitude: lat
        longitude: lng
"#,
        )
        .unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.mapping.key_column, "number");
        assert_eq!(config.mapping.columns.len(), 1);
        assert_eq!(
            config.mapping.derived[0].rule,
            RuleConfig::Prefix {
                column: "address".to_string(),
                chars: 2
            }
        );

        let mapping = config.row_mapping().unwrap();
        assert_eq!(mapping.rules.len(), 2);
        assert_eq!(mapping.rules[1].field(), "location");
        assert_eq!(mapping.rules[1].inputs(), &["lat".to_string(), "lng".to_string()]);
    }

    #[test]
    fn test_image_rules_need_a_bucket() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "storage:\n  folder: temples\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        let err = config.row_mapping().unwrap_err();
        assert!(err.to_string().contains("storage.bucket"));
    }

    #[test]
    fn test_default_mapping_with_bucket() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "storage:\n  bucket: bucket\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        let mapping = config.row_mapping().unwrap();
        assert_eq!(mapping.key_column, "お遍路の番号");
        assert_eq!(mapping.columns.len(), 4);
        let fields: Vec<&str> = mapping.rules.iter().map(|r| r.field()).collect();
        assert_eq!(
            fields,
            vec!["prefecture", "geoPoint", "images", "stamp_images"]
        );
    }

    #[test]
    fn test_delimiter_byte() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "delimiter: \"\\t\"\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.delimiter_byte().unwrap(), b'\t');

        let mut config = config;
        config.delimiter = "::".to_string();
        assert!(matches!(
            config.delimiter_byte(),
            Err(ConfigError::InvalidDelimiter(_))
        ));
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "firestore:\n  credentials:\n    access_token: secret-a\nstorage:\n  token: secret-b\n",
        )
        .unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.firestore.credentials.access_token.is_some());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-a"));
        assert!(!json.contains("secret-b"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "input_path: /from/file.csv\n").unwrap();

        std::env::set_var("HENRO_INPUT_PATH", "/from/env.csv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.input_path.value, PathBuf::from("/from/env.csv"));
        assert_eq!(config.input_path.source, ConfigSource::Environment);

        std::env::remove_var("HENRO_INPUT_PATH");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
