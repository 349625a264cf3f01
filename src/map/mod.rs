pub mod geocode;
pub mod tiles;

pub use tiles::TileLayer;
