use crate::config::toml_config::MapConfig;
use crate::domain::model::{InsetPosition, MapParameters, DEFAULT_TITLE};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "study-area-map")]
#[command(about = "Render a study area map for a country or a searched place")]
pub struct CliConfig {
    /// Country name, exactly as listed by --list-countries
    #[arg(long)]
    pub country: Option<String>,

    /// Free-text city/place to geocode (takes precedence over --country)
    #[arg(long)]
    pub place: Option<String>,

    /// Inset map position: "upper right" or "bottom right"
    #[arg(long, default_value = "upper right", value_parser = parse_inset)]
    pub inset: InsetPosition,

    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the boundary dataset path
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Override the output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Session id; with per-session naming each session gets its own file
    #[arg(long)]
    pub session: Option<String>,

    /// Draw without background tiles
    #[arg(long)]
    pub no_basemap: bool,

    /// Print the available country names and exit
    #[arg(long)]
    pub list_countries: bool,

    /// Start an interactive session reading commands from stdin
    #[arg(short, long)]
    pub interactive: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

fn parse_inset(value: &str) -> std::result::Result<InsetPosition, String> {
    value.parse::<InsetPosition>().map_err(|e| e.to_string())
}

impl CliConfig {
    /// File settings (or defaults) with command-line overrides applied.
    pub fn load_map_config(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_file(path)?,
            None => MapConfig::default(),
        };

        if let Some(dataset) = &self.dataset {
            config.dataset.path = dataset.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output.directory = output_dir.clone();
        }
        if self.no_basemap {
            config.tiles.enabled = false;
        }

        Ok(config)
    }

    pub fn map_parameters(&self) -> MapParameters {
        MapParameters {
            country: self.country.clone(),
            place: self.place.clone(),
            inset: self.inset,
            title: self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = CliConfig::parse_from(["study-area-map", "--country", "Ecuador"]);
        let params = cli.map_parameters();
        assert_eq!(params.country.as_deref(), Some("Ecuador"));
        assert_eq!(params.inset, InsetPosition::UpperRight);
        assert_eq!(params.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_inset_is_normalized() {
        let cli = CliConfig::parse_from(["study-area-map", "--inset", "lower-right"]);
        assert_eq!(cli.inset, InsetPosition::BottomRight);
    }

    #[test]
    fn test_unknown_inset_is_rejected() {
        let err = CliConfig::try_parse_from(["study-area-map", "--inset", "upper left"])
            .unwrap_err()
            .to_string();
        assert!(err.contains("Unsupported inset position"), "{}", err);
    }

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let cli = CliConfig::parse_from([
            "study-area-map",
            "--dataset",
            "custom.geojson",
            "--output-dir",
            "/tmp/out",
            "--no-basemap",
        ]);
        let config = cli.load_map_config().unwrap();
        assert_eq!(config.dataset.path, PathBuf::from("custom.geojson"));
        assert_eq!(config.output.directory, PathBuf::from("/tmp/out"));
        assert!(!config.tiles.enabled);
    }
}
