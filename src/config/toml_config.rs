use crate::domain::dataset::FieldNames;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DATASET_PATH: &str = "world-administrative-boundaries.geojson";
pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "country-map-generator";
pub const DEFAULT_TILE_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_FILE_STEM: &str = "map_preview";

/// Settings for the map generator, read from TOML. Every field has a default,
/// so an empty file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub dataset: DatasetConfig,
    pub geocoder: GeocoderConfig,
    pub tiles: TilesConfig,
    pub network: NetworkConfig,
    pub output: OutputConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub name_field: String,
    pub continent_field: String,
    pub coastline_path: Option<PathBuf>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        let fields = FieldNames::default();
        Self {
            path: PathBuf::from(DEFAULT_DATASET_PATH),
            name_field: fields.name,
            continent_field: fields.continent,
            coastline_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TilesConfig {
    pub enabled: bool,
    pub url_template: String,
    pub max_tiles: usize,
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url_template: DEFAULT_TILE_TEMPLATE.to_string(),
            max_tiles: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub request_timeout_seconds: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactNaming {
    /// One shared file, overwritten by every render.
    #[default]
    Fixed,
    /// One file per session id.
    PerSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub file_stem: String,
    pub naming: ArtifactNaming,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: std::env::temp_dir(),
            file_stem: DEFAULT_FILE_STEM.to_string(),
            naming: ArtifactNaming::Fixed,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub font_path: Option<PathBuf>,
}

impl MapConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MapError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TILE_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MapError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn field_names(&self) -> FieldNames {
        FieldNames {
            name: self.dataset.name_field.clone(),
            continent: self.dataset.continent_field.clone(),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        let dataset_path = self.dataset.path.to_string_lossy().to_string();
        validation::validate_path("dataset.path", &dataset_path)?;
        validation::validate_file_extensions("dataset.path", &[dataset_path], &["geojson", "json"])?;
        validation::validate_non_empty_string("dataset.name_field", &self.dataset.name_field)?;
        validation::validate_non_empty_string(
            "dataset.continent_field",
            &self.dataset.continent_field,
        )?;
        if let Some(coastline) = &self.dataset.coastline_path {
            let coastline = coastline.to_string_lossy().to_string();
            validation::validate_path("dataset.coastline_path", &coastline)?;
            validation::validate_file_extensions(
                "dataset.coastline_path",
                &[coastline],
                &["geojson", "json"],
            )?;
        }

        validation::validate_url("geocoder.endpoint", &self.geocoder.endpoint)?;
        validation::validate_non_empty_string("geocoder.user_agent", &self.geocoder.user_agent)?;

        if self.tiles.enabled {
            validation::validate_tile_template("tiles.url_template", &self.tiles.url_template)?;
        }
        validation::validate_positive_number("tiles.max_tiles", self.tiles.max_tiles, 1)?;

        validation::validate_range(
            "network.request_timeout_seconds",
            self.network.request_timeout_seconds,
            1,
            600,
        )?;

        validation::validate_path(
            "output.directory",
            &self.output.directory.to_string_lossy(),
        )?;
        validation::validate_non_empty_string("output.file_stem", &self.output.file_stem)?;
        if self
            .output
            .file_stem
            .contains(|c: char| std::path::is_separator(c))
        {
            return Err(MapError::InvalidConfigValueError {
                field: "output.file_stem".to_string(),
                value: self.output.file_stem.clone(),
                reason: "File stem must not contain path separators".to_string(),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for MapConfig {
    fn dataset_path(&self) -> &Path {
        &self.dataset.path
    }

    fn geocoder_endpoint(&self) -> &str {
        &self.geocoder.endpoint
    }

    fn user_agent(&self) -> &str {
        &self.geocoder.user_agent
    }

    fn tiles_enabled(&self) -> bool {
        self.tiles.enabled
    }

    fn tile_url_template(&self) -> &str {
        &self.tiles.url_template
    }

    fn max_tiles(&self) -> usize {
        self.tiles.max_tiles
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.request_timeout_seconds)
    }

    fn output_dir(&self) -> &Path {
        &self.output.directory
    }

    fn artifact_name(&self, session: Option<&str>) -> String {
        match (self.output.naming, session) {
            (ArtifactNaming::PerSession, Some(session)) if !session.is_empty() => {
                let session: String = session
                    .chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                            c
                        } else {
                            '_'
                        }
                    })
                    .collect();
                format!("{}-{}.png", self.output.file_stem, session)
            }
            _ => format!("{}.png", self.output.file_stem),
        }
    }
}

impl Validate for MapConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
