use crate::utils::error::{MapError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// Tile templates carry `{z}/{x}/{y}` placeholders, which `Url` would
/// percent-encode; validate a filled-in sample instead.
pub fn validate_tile_template(field_name: &str, template: &str) -> Result<()> {
    for placeholder in ["{z}", "{x}", "{y}"] {
        if !template.contains(placeholder) {
            return Err(MapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: template.to_string(),
                reason: format!("Template is missing the {} placeholder", placeholder),
            });
        }
    }
    let sample = template
        .replace("{z}", "0")
        .replace("{x}", "0")
        .replace("{y}", "0");
    validate_url(field_name, &sample)
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension.to_ascii_lowercase().as_str()) {
                return Err(MapError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(MapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("geocoder.endpoint", "https://nominatim.openstreetmap.org").is_ok());
        assert!(validate_url("geocoder.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_url("geocoder.endpoint", "").is_err());
        assert!(validate_url("geocoder.endpoint", "invalid-url").is_err());
        assert!(validate_url("geocoder.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_tile_template() {
        assert!(validate_tile_template(
            "tiles.url_template",
            "https://tile.openstreetmap.org/{z}/{x}/{y}.png"
        )
        .is_ok());
        assert!(validate_tile_template("tiles.url_template", "https://example.com/{z}/{x}.png")
            .is_err());
        assert!(validate_tile_template("tiles.url_template", "file:///{z}/{x}/{y}.png").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["world.geojson".to_string(), "coast.JSON".to_string()];
        assert!(validate_file_extensions("dataset.path", &files, &["geojson", "json"]).is_ok());

        let invalid_files = vec!["world.shp".to_string()];
        assert!(
            validate_file_extensions("dataset.path", &invalid_files, &["geojson", "json"]).is_err()
        );
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("network.request_timeout_seconds", 30, 1, 600).is_ok());
        assert!(validate_range("network.request_timeout_seconds", 0, 1, 600).is_err());
        assert!(validate_range("network.request_timeout_seconds", 601, 1, 600).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("geocoder.user_agent", "map-tool").is_ok());
        assert!(validate_non_empty_string("geocoder.user_agent", "   ").is_err());
    }
}
