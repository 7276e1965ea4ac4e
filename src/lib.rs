pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HttpTileSource, LocalStorage, NominatimGeocoder};
pub use app::{MapSession, Outcome};
pub use config::MapConfig;
pub use core::{GeometryResolver, MapEngine};
pub use domain::dataset::{BoundaryDataset, CoastlineLayer};
pub use domain::model::{InsetPosition, MapParameters};
pub use render::MapRenderer;
pub use utils::error::{MapError, Result};
