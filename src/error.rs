use thiserror::Error;

/// Errors that can occur while loading, cleaning or aggregating wildfire data.
#[derive(Debug, Error)]
pub enum DataError {
    /// A hard aggregation precondition was unmet. Lists every missing column.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    /// The rows handed to the GeoJSON enricher did not serialize to objects.
    #[error("enrichment rows must serialize to JSON objects")]
    NotAnObject,

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provinces file is not a valid GeoJSON feature collection.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}
