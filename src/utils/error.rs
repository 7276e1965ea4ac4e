use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Country '{name}' not found in boundary dataset")]
    CountryNotFound { name: String },

    #[error("Place '{query}' not found")]
    PlaceNotFound { query: String },

    #[error("Basemap unavailable: {message}")]
    BasemapUnavailable { message: String },

    #[error("Map rendering failed: {message}")]
    RenderFailure { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("GeoJSON error: {0}")]
    GeoJsonError(#[from] geojson::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Boundary dataset error: {message}")]
    DatasetError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Lookup,
    Network,
    Rendering,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Shown to the user whenever a map could not be produced.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Unable to generate map. Check inputs or try another place.";

impl MapError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        MapError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn render_failure(message: impl Into<String>) -> Self {
        MapError::RenderFailure {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::InvalidInput { .. } => ErrorCategory::Input,
            MapError::CountryNotFound { .. } | MapError::PlaceNotFound { .. } => {
                ErrorCategory::Lookup
            }
            MapError::BasemapUnavailable { .. } | MapError::ApiError(_) => ErrorCategory::Network,
            MapError::RenderFailure { .. } | MapError::ImageError(_) => ErrorCategory::Rendering,
            MapError::ConfigError { .. }
            | MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            MapError::IoError(_)
            | MapError::GeoJsonError(_)
            | MapError::SerializationError(_)
            | MapError::DatasetError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MapError::BasemapUnavailable { .. } => ErrorSeverity::Low,
            MapError::ApiError(_) => ErrorSeverity::Medium,
            MapError::InvalidInput { .. }
            | MapError::CountryNotFound { .. }
            | MapError::PlaceNotFound { .. }
            | MapError::RenderFailure { .. }
            | MapError::ImageError(_) => ErrorSeverity::High,
            _ => ErrorSeverity::Critical,
        }
    }

    /// Basemap failures degrade the map; everything else aborts the request.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MapError::BasemapUnavailable { .. })
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            MapError::InvalidInput { .. } => {
                "Select a country or type a place name before generating".to_string()
            }
            MapError::CountryNotFound { .. } => {
                "Pick a name from the country list (names are case-sensitive)".to_string()
            }
            MapError::PlaceNotFound { .. } => {
                "Try a more specific place name, e.g. 'Quito, Ecuador'".to_string()
            }
            MapError::BasemapUnavailable { .. } => {
                "The map was drawn without background tiles; check network access".to_string()
            }
            MapError::ApiError(_) => {
                "Check network connectivity and the geocoder/tile endpoints".to_string()
            }
            MapError::RenderFailure { .. } | MapError::ImageError(_) => {
                "Retry with a smaller area or a different place".to_string()
            }
            MapError::IoError(_) => "Check that the output directory is writable".to_string(),
            MapError::GeoJsonError(_) | MapError::DatasetError { .. } => {
                "Check that the boundary dataset is a valid GeoJSON FeatureCollection".to_string()
            }
            MapError::SerializationError(_) => {
                "The geocoding service returned an unexpected response".to_string()
            }
            MapError::ConfigError { .. }
            | MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command-line flags".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Lookup => {
                format!("{} ({})", GENERIC_FAILURE_MESSAGE, self)
            }
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
