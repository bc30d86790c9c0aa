//! Loading, cleaning, geographic enrichment and aggregation of the Spain
//! wildfires dataset.
//!
//! The flow is: read the fires CSV and the provinces GeoJSON, prepare the
//! table (column selection, intent flag, type coercion, burned-area alias),
//! resolve province names through the boundary file, then derive the grouped
//! views the map and charts consume. [`dataset::Wildfires`] ties it together.
pub mod aggregates;
pub mod cleaning;
pub mod dataset;
pub mod error;
pub mod geo;
pub mod loader;
pub mod output;
pub mod types;
pub mod util;
