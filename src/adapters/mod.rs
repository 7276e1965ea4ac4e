// Adapters layer: concrete implementations of the domain ports for
// external systems (geocoding service, tile server, local filesystem).

pub mod geocoder;
pub mod http;
pub mod storage;
pub mod tiles;

pub use geocoder::NominatimGeocoder;
pub use storage::LocalStorage;
pub use tiles::HttpTileSource;
