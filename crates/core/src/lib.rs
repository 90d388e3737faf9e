pub mod analysis;
pub mod config;
pub mod entity;
pub mod error;
pub mod geo;
pub mod nearest;
pub mod scenario;
pub mod schedule;
pub mod store;

pub use analysis::{
    EmbeddingMeta, EmbeddingResult, HeatmapCell, HeatmapFeature, SearchHit, SimulationStats,
};
pub use config::Config;
pub use entity::*;
pub use error::*;
pub use geo::{distance_km, GeoPoint, EARTH_RADIUS_KM};
pub use nearest::find_nearest;
pub use scenario::*;
pub use schedule::*;
pub use store::{EntityStore, EntityView, StoreStats};
