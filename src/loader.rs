// Readers for the two inputs: the fires CSV and the provinces GeoJSON.
use std::fs;
use std::path::Path;

use geojson::{FeatureCollection, GeoJson};
use log::info;

use crate::error::DataError;
use crate::types::{ColumnSet, RawRow, RawTable, SOURCE_COLUMNS};

/// What happened while reading the CSV, for console diagnostics.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
}

/// Read the `;`-delimited fires CSV into a raw string table.
///
/// Recognized columns are matched by exact header name; anything else in the
/// file is ignored. Rows the CSV parser cannot make sense of are skipped and
/// counted, never fatal.
pub fn read_wildfires_csv(path: &Path) -> Result<(RawTable, LoadReport), DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)?;

    let headers = rdr.headers()?.clone();
    let mut columns = ColumnSet::new();
    for name in SOURCE_COLUMNS {
        if headers.iter().any(|h| h == name) {
            columns.insert(name);
        }
    }

    let mut rows: Vec<RawRow> = Vec::new();
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        match result {
            Ok(r) => rows.push(r),
            Err(_) => parse_errors += 1,
        }
    }
    info!(
        "read {} rows from {} ({} unreadable)",
        rows.len(),
        path.display(),
        parse_errors
    );
    Ok((RawTable { columns, rows }, LoadReport { total_rows, parse_errors }))
}

/// Read the provinces boundary file. Geometries are carried through opaque;
/// only the per-feature property bags are ever inspected downstream.
pub fn read_provinces_geojson(path: &Path) -> Result<FeatureCollection, DataError> {
    let text = fs::read_to_string(path)?;
    let geojson: GeoJson = text.parse()?;
    let collection = FeatureCollection::try_from(geojson)?;
    info!(
        "read {} boundary features from {}",
        collection.features.len(),
        path.display()
    );
    Ok(collection)
}
