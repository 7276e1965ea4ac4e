pub mod engine;
pub mod resolver;

pub use crate::domain::ports::{ConfigProvider, Geocoder, Storage, TileSource};
pub use crate::utils::error::Result;
pub use engine::MapEngine;
pub use resolver::GeometryResolver;
